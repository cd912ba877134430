use async_trait::async_trait;
use edlink_primitives::ExtractFlags;
use edlink_relay::{Generation, HandlerFault, Message, RelayContext, RelayHandler};

use crate::call::{CallTarget, EditCall, ReadQuery};
use crate::config::EditConfig;
use crate::field::{FieldInfo, TextField};
use crate::listener::HostListener;
use crate::protocol::{EditState, Update};
use crate::session::{SessionId, SessionTable};

struct Binding {
	generation: Generation,
	field: Box<dyn TextField>,
	state: EditState,
	/// Connection whose batch, composing region or monitor is open.
	owner: Option<CallTarget>,
}

impl Binding {
	/// Closes whatever another connection left open before `target` touches the state.
	fn claim<L: HostListener>(&mut self, target: CallTarget, listener: &mut L) {
		let Some(owner) = self.owner else {
			return;
		};
		if owner.connection == target.connection || self.state.is_idle() {
			return;
		}
		tracing::debug!(
			generation = %self.generation,
			from = %owner.connection,
			to = %target.connection,
			"edit.handover"
		);
		self.release(listener);
	}

	fn settle(&mut self, target: CallTarget) {
		self.owner = (!self.state.is_idle()).then_some(target);
	}

	fn release<L: HostListener>(&mut self, listener: &mut L) {
		let updates = self.state.close(self.field.as_ref());
		self.owner = None;
		publish(listener, self.generation, updates);
	}
}

/// Consumer side of the edit link.
///
/// Owns the bound field, the per-connection edit state and the session
/// table. The relay hands it one call at a time, so nothing here is locked.
pub struct EditHost<L: HostListener> {
	listener: L,
	sessions: SessionTable,
	binding: Option<Binding>,
	config: EditConfig,
}

impl<L: HostListener> EditHost<L> {
	pub fn new(config: EditConfig, listener: L) -> Self {
		Self {
			listener,
			sessions: SessionTable::default(),
			binding: None,
			config,
		}
	}

	/// Resolves `target` to the current binding, rejecting stale or inactive callers.
	fn resolve<'a>(
		sessions: &SessionTable,
		binding: &'a mut Option<Binding>,
		target: CallTarget,
		kind: &'static str,
	) -> Option<&'a mut Binding> {
		if !sessions.is_active(target.session) {
			tracing::debug!(session = %target.session, kind, "edit.inactive_session");
			return None;
		}
		match binding.as_mut() {
			Some(binding) if binding.generation == target.generation => Some(binding),
			current => {
				tracing::debug!(
					session = %target.session,
					generation = %target.generation,
					current = ?current.map(|binding| binding.generation),
					kind,
					"edit.stale_generation"
				);
				None
			}
		}
	}

	fn bind(&mut self, generation: Generation, field: Box<dyn TextField>, info: FieldInfo) {
		self.unbind();
		let state = EditState::new(&info, field.as_ref(), self.config.max_extract_chars);
		tracing::debug!(generation = %generation, selection = %state.selection(), "edit.bind");
		self.binding = Some(Binding {
			generation,
			field,
			state,
			owner: None,
		});
		self.listener.on_field_bound(generation, &info);
	}

	fn unbind(&mut self) {
		let Some(mut old) = self.binding.take() else {
			return;
		};
		let updates = old.state.close(old.field.as_ref());
		publish(&mut self.listener, old.generation, updates);
		tracing::debug!(generation = %old.generation, "edit.unbind");
		self.listener.on_field_unbound(old.generation);
	}

	/// Closes the binding's open state if `session` owns it.
	fn release_session(&mut self, session: SessionId) {
		let Some(binding) = self.binding.as_mut() else {
			return;
		};
		let Some(owner) = binding.owner.filter(|owner| owner.session == session) else {
			return;
		};
		tracing::debug!(session = %session, connection = %owner.connection, generation = %binding.generation, "edit.release_revoked");
		binding.release(&mut self.listener);
	}
}

#[async_trait]
impl<L: HostListener> RelayHandler for EditHost<L> {
	type Call = EditCall;

	async fn apply(&mut self, message: Message<EditCall>, _ctx: &RelayContext) -> Result<(), HandlerFault> {
		let kind = message.kind();
		match message.call {
			EditCall::CreateSession { shared } => {
				let session = shared.id();
				self.sessions.insert(shared);
				tracing::debug!(session = %session, "session.ready");
				self.listener.on_session_ready(session);
			}
			EditCall::SetSessionEnabled { session, enabled } => {
				let applied = self.sessions.get(session).is_some_and(|shared| shared.set_enabled(enabled));
				tracing::debug!(session = %session, enabled, applied, "session.set_enabled");
			}
			EditCall::RevokeSession { session } => {
				if let Some(shared) = self.sessions.remove(session) {
					shared.revoke();
					self.release_session(session);
					tracing::debug!(session = %session, "session.revoked");
					self.listener.on_revoked(session);
				}
			}
			EditCall::BindField { generation, field, info } => self.bind(generation, field, info),
			EditCall::UnbindField { generation } => {
				tracing::trace!(generation = %generation, "edit.unbind_requested");
				self.unbind();
			}
			EditCall::Interrupt => self.listener.on_interrupt(),
			EditCall::Read { target, query, reply } => {
				let Some(binding) = Self::resolve(&self.sessions, &mut self.binding, target, kind) else {
					return Ok(());
				};
				let monitors = matches!(&query, ReadQuery::ExtractedText(options) if options.flags.contains(ExtractFlags::MONITOR));
				if monitors {
					binding.claim(target, &mut self.listener);
				}
				let answer = binding.state.read(binding.field.as_ref(), query);
				if monitors {
					binding.settle(target);
				}
				// The reader may have timed out already.
				let _ = reply.send(answer);
			}
			EditCall::Write { target, op } => {
				let Some(binding) = Self::resolve(&self.sessions, &mut self.binding, target, kind) else {
					return Ok(());
				};
				binding.claim(target, &mut self.listener);
				if !binding.state.write(binding.field.as_mut(), op) {
					tracing::trace!(kind, "edit.write_ignored");
				}
				let updates = binding.state.take_updates(binding.field.as_ref());
				binding.settle(target);
				publish(&mut self.listener, binding.generation, updates);
			}
			EditCall::Close { target } => {
				let Some(binding) = Self::resolve(&self.sessions, &mut self.binding, target, kind) else {
					return Ok(());
				};
				if binding.owner.is_none_or(|owner| owner.connection != target.connection) {
					tracing::debug!(connection = %target.connection, generation = %binding.generation, "edit.close_not_owner");
					return Ok(());
				}
				tracing::debug!(connection = %target.connection, generation = %binding.generation, "edit.close");
				binding.release(&mut self.listener);
			}
		}
		Ok(())
	}

	async fn on_stop(&mut self, _ctx: &RelayContext) {
		self.unbind();
	}
}

fn publish<L: HostListener>(listener: &mut L, generation: Generation, updates: Vec<Update>) {
	for update in updates {
		match update {
			Update::Selection(update) => listener.on_selection_changed(generation, update),
			Update::Extracted { token, text } => listener.on_extracted_text_changed(generation, token, &text),
		}
	}
}
