use std::sync::Arc;

use async_trait::async_trait;

use crate::attachment::Attachment;
use crate::message::{Message, RelayCall};

/// Unrecoverable handler failure. Returning one terminates the relay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {reason}")]
pub struct HandlerFault {
	kind: &'static str,
	reason: String,
}

impl HandlerFault {
	/// Creates a fault for the given call kind.
	pub fn new(kind: &'static str, reason: impl Into<String>) -> Self {
		Self {
			kind,
			reason: reason.into(),
		}
	}

	/// Call kind that faulted.
	pub fn kind(&self) -> &'static str {
		self.kind
	}

	/// Fault description.
	pub fn reason(&self) -> &str {
		&self.reason
	}
}

/// Read-only view of the relay handed to the handler.
#[derive(Debug, Clone)]
pub struct RelayContext {
	name: Arc<str>,
	attachment: Arc<Attachment>,
}

impl RelayContext {
	pub(crate) fn new(name: Arc<str>, attachment: Arc<Attachment>) -> Self {
		Self { name, attachment }
	}

	/// Relay name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The attachment this relay serves.
	pub fn attachment(&self) -> &Arc<Attachment> {
		&self.attachment
	}
}

/// The single consumer of a relay.
///
/// `apply` is never invoked concurrently with itself: the relay awaits each
/// call before dequeuing the next, so implementations own their state
/// outright and need no locking.
#[async_trait]
pub trait RelayHandler: Send + 'static {
	/// Call type this handler consumes.
	type Call: RelayCall;

	/// Runs once before the first call is applied.
	async fn on_start(&mut self, _ctx: &RelayContext) -> Result<(), HandlerFault> {
		Ok(())
	}

	/// Applies one call.
	async fn apply(&mut self, message: Message<Self::Call>, ctx: &RelayContext) -> Result<(), HandlerFault>;

	/// Runs once after the consumer loop exits without panicking.
	async fn on_stop(&mut self, _ctx: &RelayContext) {}
}
