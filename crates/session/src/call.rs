//! Calls carried by the edit relay.

use std::fmt;

use edlink_primitives::{
	CompletionInfo, ContextMenuAction, CorrectionInfo, EditorAction, ExtractOptions, ExtractedText, KeyEvent, MetaState, PrivateCommand,
	StyledText, SurroundingText, TextFlags,
};
use edlink_relay::{Generation, RelayCall};
use tokio::sync::oneshot;

use crate::field::{FieldInfo, TextField};
use crate::session::{ConnectionId, SessionId, SessionShared};

/// Connection, session and bind generation a protocol call was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTarget {
	pub session: SessionId,
	pub connection: ConnectionId,
	pub generation: Generation,
}

/// Bounded-time read operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadQuery {
	TextBeforeCursor { n: usize, flags: TextFlags },
	TextAfterCursor { n: usize, flags: TextFlags },
	SelectedText { flags: TextFlags },
	CursorCapsMode { req_modes: u32 },
	ExtractedText(ExtractOptions),
	SurroundingText { before: usize, after: usize, flags: TextFlags },
}

impl ReadQuery {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::TextBeforeCursor { .. } => "text_before_cursor",
			Self::TextAfterCursor { .. } => "text_after_cursor",
			Self::SelectedText { .. } => "selected_text",
			Self::CursorCapsMode { .. } => "cursor_caps_mode",
			Self::ExtractedText(_) => "extracted_text",
			Self::SurroundingText { .. } => "surrounding_text",
		}
	}
}

/// Reply to a [`ReadQuery`], one variant per result shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadReply {
	Text(Option<StyledText>),
	CapsMode(u32),
	Extracted(Option<ExtractedText>),
	Surrounding(Option<SurroundingText>),
}

/// Best-effort write operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
	BeginBatchEdit,
	EndBatchEdit,
	CommitText { text: String, new_cursor_position: i32 },
	SetComposingText { text: String, new_cursor_position: i32 },
	SetComposingRegion { start: usize, end: usize },
	FinishComposingText,
	DeleteSurroundingText { before: usize, after: usize },
	SetSelection { start: usize, end: usize },
	CommitCompletion(CompletionInfo),
	CommitCorrection(CorrectionInfo),
	PerformEditorAction(EditorAction),
	PerformContextMenuAction(ContextMenuAction),
	SendKeyEvent(KeyEvent),
	ClearMetaKeyStates(MetaState),
	ReportFullscreenMode(bool),
	PerformPrivateCommand(PrivateCommand),
}

impl WriteOp {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::BeginBatchEdit => "begin_batch_edit",
			Self::EndBatchEdit => "end_batch_edit",
			Self::CommitText { .. } => "commit_text",
			Self::SetComposingText { .. } => "set_composing_text",
			Self::SetComposingRegion { .. } => "set_composing_region",
			Self::FinishComposingText => "finish_composing_text",
			Self::DeleteSurroundingText { .. } => "delete_surrounding_text",
			Self::SetSelection { .. } => "set_selection",
			Self::CommitCompletion(_) => "commit_completion",
			Self::CommitCorrection(_) => "commit_correction",
			Self::PerformEditorAction(_) => "perform_editor_action",
			Self::PerformContextMenuAction(_) => "perform_context_menu_action",
			Self::SendKeyEvent(_) => "send_key_event",
			Self::ClearMetaKeyStates(_) => "clear_meta_key_states",
			Self::ReportFullscreenMode(_) => "report_fullscreen_mode",
			Self::PerformPrivateCommand(_) => "perform_private_command",
		}
	}
}

/// Every call the edit host consumes.
pub enum EditCall {
	/// Registers a session created by a producer.
	CreateSession { shared: std::sync::Arc<SessionShared> },
	SetSessionEnabled { session: SessionId, enabled: bool },
	RevokeSession { session: SessionId },
	/// Binds a new focused field at `generation`.
	BindField {
		generation: Generation,
		field: Box<dyn TextField>,
		info: FieldInfo,
	},
	/// Drops the bound field; `generation` is the bump that unbound it.
	UnbindField { generation: Generation },
	Interrupt,
	Read {
		target: CallTarget,
		query: ReadQuery,
		reply: oneshot::Sender<ReadReply>,
	},
	Write { target: CallTarget, op: WriteOp },
	/// Finishes composing, collapses batches and clears monitors held by
	/// `target.connection`. Sent on close, invalidation, read timeout and drop.
	Close { target: CallTarget },
}

impl RelayCall for EditCall {
	fn kind(&self) -> &'static str {
		match self {
			Self::CreateSession { .. } => "create_session",
			Self::SetSessionEnabled { .. } => "set_session_enabled",
			Self::RevokeSession { .. } => "revoke_session",
			Self::BindField { .. } => "bind_field",
			Self::UnbindField { .. } => "unbind_field",
			Self::Interrupt => "interrupt",
			Self::Read { query, .. } => query.kind(),
			Self::Write { op, .. } => op.kind(),
			Self::Close { .. } => "close_connection",
		}
	}
}

impl fmt::Debug for EditCall {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::BindField { generation, info, .. } => f
				.debug_struct("BindField")
				.field("generation", generation)
				.field("info", info)
				.finish_non_exhaustive(),
			Self::Read { target, query, .. } => f.debug_struct("Read").field("target", target).field("query", query).finish_non_exhaustive(),
			Self::Write { target, op } => f.debug_struct("Write").field("target", target).field("op", op).finish(),
			other => f.write_str(other.kind()),
		}
	}
}
