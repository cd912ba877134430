use std::sync::Arc;

use edlink_relay::Generation;

use crate::call::EditCall;
use crate::field::{FieldInfo, TextField};
use crate::link::LinkShared;
use crate::session::{SessionId, SessionState};

/// Target-side handle: binds fields and drives session lifecycle.
///
/// Every method enqueues and returns immediately. Results only report
/// whether the call was accepted by the relay.
#[derive(Clone)]
pub struct HostHandle {
	link: Arc<LinkShared>,
}

impl HostHandle {
	pub(crate) fn new(link: Arc<LinkShared>) -> Self {
		Self { link }
	}

	/// Binds a newly focused field.
	///
	/// Bumps the generation first, so every connection to the previous field
	/// fails from this point on. Returns the new generation if the bind was queued.
	pub fn bind_field(&self, field: impl TextField, info: FieldInfo) -> Option<Generation> {
		let field: Box<dyn TextField> = Box::new(field);
		self.link
			.rebind(true, move |generation| EditCall::BindField { generation, field, info })
			.inspect_err(|err| tracing::debug!(error = %err, "edit.bind_failed"))
			.ok()
	}

	/// Drops the bound field. All connections fail until the next bind.
	pub fn unbind_field(&self) -> bool {
		self.link
			.rebind(false, |generation| EditCall::UnbindField { generation })
			.inspect_err(|err| tracing::debug!(error = %err, "edit.unbind_failed"))
			.is_ok()
	}

	/// Current bind generation.
	pub fn generation(&self) -> Generation {
		self.link.port.attachment().generation()
	}

	/// Delivers an interrupt to the listener, in order with other calls.
	pub fn interrupt(&self) -> bool {
		self.link.port.send(EditCall::Interrupt).is_ok()
	}

	/// Toggles `Active ⇄ Disabled`. A no-op returning false for revoked or unknown sessions.
	///
	/// The change is visible to producers once the host applies it.
	pub fn set_session_enabled(&self, session: SessionId, enabled: bool) -> bool {
		let Some(shared) = self.link.sessions.get(session) else {
			return false;
		};
		if shared.state() == SessionState::Revoked {
			return false;
		}
		self.link.port.send(EditCall::SetSessionEnabled { session, enabled }).is_ok()
	}

	/// Revokes a session. Takes effect for producers immediately and is terminal.
	pub fn revoke_session(&self, session: SessionId) -> bool {
		let Some(shared) = self.link.sessions.remove(session) else {
			return false;
		};
		if !shared.revoke() {
			return false;
		}
		tracing::debug!(session = %session, "session.revoke");
		// Revocation already holds; the call only tells the listener.
		let _ = self.link.port.send(EditCall::RevokeSession { session });
		true
	}
}
