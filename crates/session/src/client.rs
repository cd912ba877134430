//! Producer-side handles.
//!
//! Writes enqueue and return at once; `false` only ever means the handle or
//! its attachment is no longer usable. Reads wait for the host up to the
//! configured deadline and return `None` (or `0`) on any failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use edlink_primitives::{
	CompletionInfo, ContextMenuAction, CorrectionInfo, EditorAction, ExtractFlags, ExtractOptions, ExtractedText, ExtractedTextRequest,
	KeyEvent, MetaState, PrivateCommand, StyledText, SurroundingText, TextFlags,
};
use edlink_relay::Generation;
use tokio::sync::oneshot;

use crate::call::{CallTarget, EditCall, ReadQuery, ReadReply, WriteOp};
use crate::link::LinkShared;
use crate::session::{ConnectionId, SessionId, SessionShared, SessionState};

/// Authenticated producer entry point.
#[derive(Clone)]
pub struct EditClient {
	link: Arc<LinkShared>,
}

impl EditClient {
	pub(crate) fn new(link: Arc<LinkShared>) -> Self {
		Self { link }
	}

	/// Creates a new session, active immediately.
	///
	/// An attachment has at most one live session: the previous one, if
	/// any, is revoked. Returns `None` if the relay no longer accepts calls.
	pub fn create_session(&self) -> Option<Session> {
		let (shared, replaced) = self.link.sessions.create();
		if let Some(old) = replaced
			&& old.revoke()
		{
			tracing::debug!(session = %old.id(), replaced_by = %shared.id(), "session.replaced");
			let _ = self.link.port.send(EditCall::RevokeSession { session: old.id() });
		}

		match self.link.port.send(EditCall::CreateSession { shared: Arc::clone(&shared) }) {
			Ok(_) => {
				tracing::debug!(session = %shared.id(), "session.create");
				Some(Session {
					link: Arc::clone(&self.link),
					shared,
				})
			}
			Err(err) => {
				tracing::debug!(session = %shared.id(), error = %err, "session.create_failed");
				shared.revoke();
				self.link.sessions.remove(shared.id());
				None
			}
		}
	}
}

/// Producer-held session handle.
#[derive(Clone)]
pub struct Session {
	link: Arc<LinkShared>,
	shared: Arc<SessionShared>,
}

impl Session {
	pub fn id(&self) -> SessionId {
		self.shared.id()
	}

	pub fn state(&self) -> SessionState {
		self.shared.state()
	}

	/// Opens a connection to the currently bound field.
	///
	/// Returns `None` if the session is not active or no field is bound.
	pub fn connection(&self) -> Option<EditConnection> {
		if !self.shared.is_active() {
			return None;
		}
		let generation = self.link.stamp()?;
		if !self.link.is_current(generation) {
			return None;
		}
		let id = self.link.next_connection_id();
		tracing::trace!(session = %self.shared.id(), connection = %id, generation = %generation, "edit.connect");
		Some(EditConnection {
			inner: Arc::new(ConnectionInner {
				link: Arc::clone(&self.link),
				session: Arc::clone(&self.shared),
				id,
				generation,
				valid: AtomicBool::new(true),
				batch_depth: AtomicU32::new(0),
			}),
		})
	}
}

struct ConnectionInner {
	link: Arc<LinkShared>,
	session: Arc<SessionShared>,
	id: ConnectionId,
	generation: Generation,
	valid: AtomicBool,
	batch_depth: AtomicU32,
}

impl ConnectionInner {
	fn target(&self) -> CallTarget {
		CallTarget {
			session: self.session.id(),
			connection: self.id,
			generation: self.generation,
		}
	}

	/// Invalidates the handle and asks the host to drop the batches, composing
	/// region and monitor it still holds. Only the first call does anything.
	fn release(&self, reason: &'static str) -> bool {
		if !self.valid.swap(false, Ordering::AcqRel) {
			return false;
		}
		self.batch_depth.store(0, Ordering::Release);
		let sent = self.link.port.send(EditCall::Close { target: self.target() }).is_ok();
		tracing::debug!(connection = %self.id, generation = %self.generation, reason, sent, "edit.release");
		sent
	}
}

impl Drop for ConnectionInner {
	fn drop(&mut self) {
		self.release("dropped");
	}
}

/// Live editing handle bound to one field generation.
///
/// Clones share validity: once any clone is invalidated, by timeout, close
/// or rebind, all of them fail. Dropping the last clone closes the connection.
#[derive(Clone)]
pub struct EditConnection {
	inner: Arc<ConnectionInner>,
}

impl EditConnection {
	/// Generation this handle was stamped with.
	pub fn generation(&self) -> Generation {
		self.inner.generation
	}

	pub fn session(&self) -> SessionId {
		self.inner.session.id()
	}

	pub fn id(&self) -> ConnectionId {
		self.inner.id
	}

	/// True while calls through this handle can succeed.
	pub fn is_valid(&self) -> bool {
		self.inner.valid.load(Ordering::Acquire) && self.inner.session.is_active() && self.inner.link.is_current(self.inner.generation)
	}

	/// Invalidates this handle and its clones. Terminal.
	///
	/// Anything the handle left open on the host is closed as well.
	pub fn invalidate(&self) {
		self.inner.release("invalidated");
	}

	fn write(&self, op: WriteOp) -> bool {
		let kind = op.kind();
		if !self.is_valid() {
			tracing::trace!(kind, generation = %self.inner.generation, "edit.write_rejected");
			return false;
		}
		match self.inner.link.port.send(EditCall::Write { target: self.inner.target(), op }) {
			Ok(seq) => {
				tracing::trace!(kind, seq, "edit.write");
				true
			}
			Err(err) => {
				tracing::debug!(kind, error = %err, "edit.write_failed");
				false
			}
		}
	}

	async fn read(&self, query: ReadQuery) -> Option<ReadReply> {
		let kind = query.kind();
		if !self.is_valid() {
			tracing::trace!(kind, generation = %self.inner.generation, "edit.read_rejected");
			return None;
		}
		let (reply, rx) = oneshot::channel();
		if let Err(err) = self.inner.link.port.send(EditCall::Read {
			target: self.inner.target(),
			query,
			reply,
		}) {
			tracing::debug!(kind, error = %err, "edit.read_failed");
			return None;
		}

		let timeout = self.inner.link.read_timeout;
		match tokio::time::timeout(timeout, rx).await {
			// The handle may have gone stale while the read was in flight.
			Ok(Ok(answer)) if self.is_valid() => Some(answer),
			Ok(Ok(_)) => {
				tracing::debug!(kind, generation = %self.inner.generation, "edit.read_stale");
				None
			}
			Ok(Err(_)) => {
				tracing::debug!(kind, generation = %self.inner.generation, "edit.read_dropped");
				None
			}
			Err(_) => {
				tracing::warn!(
					kind,
					session = %self.inner.session.id(),
					generation = %self.inner.generation,
					timeout_ms = timeout.as_millis() as u64,
					"edit.read_timeout"
				);
				self.inner.release("read_timeout");
				None
			}
		}
	}

	async fn read_text(&self, query: ReadQuery) -> Option<StyledText> {
		match self.read(query).await? {
			ReadReply::Text(text) => text,
			_ => None,
		}
	}

	/// Up to `n` characters before the selection start.
	pub async fn text_before_cursor(&self, n: usize, flags: TextFlags) -> Option<StyledText> {
		self.read_text(ReadQuery::TextBeforeCursor { n, flags }).await
	}

	/// Up to `n` characters after the selection end.
	pub async fn text_after_cursor(&self, n: usize, flags: TextFlags) -> Option<StyledText> {
		self.read_text(ReadQuery::TextAfterCursor { n, flags }).await
	}

	/// Selected text; `None` when the selection is empty.
	pub async fn selected_text(&self, flags: TextFlags) -> Option<StyledText> {
		self.read_text(ReadQuery::SelectedText { flags }).await
	}

	/// Caps mode at the cursor; `0` on any failure.
	pub async fn cursor_caps_mode(&self, req_modes: u32) -> u32 {
		match self.read(ReadQuery::CursorCapsMode { req_modes }).await {
			Some(ReadReply::CapsMode(mode)) => mode,
			_ => 0,
		}
	}

	/// Text snapshot. With [`ExtractFlags::MONITOR`] the host keeps publishing
	/// updates for `request.token` until the connection closes.
	pub async fn extracted_text(&self, request: ExtractedTextRequest, flags: ExtractFlags) -> Option<ExtractedText> {
		match self.read(ReadQuery::ExtractedText(ExtractOptions { request, flags })).await? {
			ReadReply::Extracted(text) => text,
			_ => None,
		}
	}

	/// Text window around the selection.
	pub async fn surrounding_text(&self, before: usize, after: usize, flags: TextFlags) -> Option<SurroundingText> {
		match self.read(ReadQuery::SurroundingText { before, after, flags }).await? {
			ReadReply::Surrounding(text) => text,
			_ => None,
		}
	}

	pub fn begin_batch_edit(&self) -> bool {
		let accepted = self.write(WriteOp::BeginBatchEdit);
		if accepted {
			self.inner.batch_depth.fetch_add(1, Ordering::AcqRel);
		}
		accepted
	}

	/// Closes one batch level. Returns false, sending nothing, when no batch is open.
	pub fn end_batch_edit(&self) -> bool {
		if !self.is_valid() {
			return false;
		}
		let opened = self
			.inner
			.batch_depth
			.fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| depth.checked_sub(1))
			.is_ok();
		if !opened {
			tracing::debug!(generation = %self.inner.generation, "edit.unbalanced_end_batch");
			return false;
		}
		self.write(WriteOp::EndBatchEdit)
	}

	pub fn commit_text(&self, text: impl Into<String>, new_cursor_position: i32) -> bool {
		self.write(WriteOp::CommitText {
			text: text.into(),
			new_cursor_position,
		})
	}

	pub fn set_composing_text(&self, text: impl Into<String>, new_cursor_position: i32) -> bool {
		self.write(WriteOp::SetComposingText {
			text: text.into(),
			new_cursor_position,
		})
	}

	pub fn set_composing_region(&self, start: usize, end: usize) -> bool {
		self.write(WriteOp::SetComposingRegion { start, end })
	}

	pub fn finish_composing_text(&self) -> bool {
		self.write(WriteOp::FinishComposingText)
	}

	/// Deletes around the selection, never touching the composing text.
	pub fn delete_surrounding_text(&self, before: usize, after: usize) -> bool {
		self.write(WriteOp::DeleteSurroundingText { before, after })
	}

	/// Out-of-range selections are accepted and ignored by the host.
	pub fn set_selection(&self, start: usize, end: usize) -> bool {
		self.write(WriteOp::SetSelection { start, end })
	}

	pub fn commit_completion(&self, completion: CompletionInfo) -> bool {
		self.write(WriteOp::CommitCompletion(completion))
	}

	pub fn commit_correction(&self, correction: CorrectionInfo) -> bool {
		self.write(WriteOp::CommitCorrection(correction))
	}

	pub fn perform_editor_action(&self, action: EditorAction) -> bool {
		self.write(WriteOp::PerformEditorAction(action))
	}

	pub fn perform_context_menu_action(&self, action: ContextMenuAction) -> bool {
		self.write(WriteOp::PerformContextMenuAction(action))
	}

	pub fn send_key_event(&self, event: KeyEvent) -> bool {
		self.write(WriteOp::SendKeyEvent(event))
	}

	pub fn clear_meta_key_states(&self, states: MetaState) -> bool {
		self.write(WriteOp::ClearMetaKeyStates(states))
	}

	pub fn report_fullscreen_mode(&self, enabled: bool) -> bool {
		self.write(WriteOp::ReportFullscreenMode(enabled))
	}

	/// Sends an opaque command. Acceptance is the only acknowledgment.
	pub fn perform_private_command(&self, command: PrivateCommand) -> bool {
		self.write(WriteOp::PerformPrivateCommand(command))
	}

	/// Finishes composing, collapses open batches and invalidates this handle.
	pub fn close(&self) -> bool {
		if !self.is_valid() {
			return false;
		}
		self.inner.release("closed")
	}
}
