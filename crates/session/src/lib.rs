//! Stateful edit-session protocol over an ordered relay.
//!
//! A target owns the text; producers edit it through asynchronous calls.
//!
//! * [`EditLink`] spawns the relay with an [`EditHost`] as its consumer.
//! * The target claims the attachment with an [`AuthToken`] and hands the
//!   token to the producer, which opens an [`EditClient`].
//! * The producer creates a [`Session`] and asks it for an
//!   [`EditConnection`] to the field the target bound through [`HostHandle`].
//!
//! Every connection is stamped with the bind generation. Binding another
//! field, revoking the session, closing the connection or a read timeout
//! makes it fail from then on; nothing crosses the boundary as an error.

mod call;
mod client;
mod config;
mod error;
mod field;
mod handle;
mod host;
mod link;
mod listener;
mod protocol;
mod rope_field;
mod session;

use std::sync::Arc;

use edlink_relay::Relay;
use link::LinkShared;
use tokio::sync::broadcast;

pub use call::{CallTarget, EditCall, ReadQuery, ReadReply, WriteOp};
pub use client::{EditClient, EditConnection, Session};
pub use config::{EditConfig, EdlinkConfig};
pub use edlink_relay::{AuthToken, Generation, OverflowPolicy, RelayError, RelayEvent, ShutdownMode, ShutdownReport};
pub use error::{ConfigError, Result};
pub use field::{FieldInfo, TextField};
pub use handle::HostHandle;
pub use host::EditHost;
pub use listener::{BroadcastListener, HostEvent, HostListener, NoOpListener};
pub use protocol::SelectionUpdate;
pub use rope_field::{FieldEffect, RopeField};
pub use session::{ConnectionId, SessionId, SessionShared, SessionState};

/// One edit link: a relay, its consumer and the handles that feed it.
pub struct EditLink {
	relay: Relay<EditCall>,
	link: Arc<LinkShared>,
}

impl EditLink {
	/// Spawns the host consumer. Works inside or outside a Tokio runtime.
	///
	/// # Panics
	///
	/// Panics if `config.relay.capacity` is zero; [`EdlinkConfig::validate`] rejects that.
	pub fn spawn<L: HostListener>(config: &EdlinkConfig, listener: L) -> Self {
		let host = EditHost::new(config.edit.clone(), listener);
		let relay = Relay::spawn("edit", &config.relay, host);
		let link = Arc::new(LinkShared::new(relay.owner_port(), config.edit.read_timeout()));
		Self { relay, link }
	}

	/// Claims the attachment. Only the first token is kept; later calls return false.
	pub fn attach_token(&self, token: AuthToken) -> bool {
		self.relay.attach_token(token)
	}

	/// Opens a producer client for the caller presenting `token`.
	pub fn client(&self, token: &AuthToken) -> std::result::Result<EditClient, RelayError> {
		self.relay.port(token)?;
		Ok(EditClient::new(Arc::clone(&self.link)))
	}

	/// Target-side handle.
	pub fn host(&self) -> HostHandle {
		HostHandle::new(Arc::clone(&self.link))
	}

	/// Overflow, fault and teardown reports from the relay.
	pub fn subscribe_relay(&self) -> broadcast::Receiver<RelayEvent> {
		self.relay.subscribe()
	}

	/// False once the link was torn down or its consumer faulted.
	pub fn is_valid(&self) -> bool {
		self.relay.attachment().is_valid()
	}

	/// Tears the link down; every handle fails afterwards.
	pub async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		self.relay.shutdown(mode).await
	}
}
