use edlink_primitives::{
	CharIdx, CompletionInfo, CorrectionInfo, EditorAction, KeyEvent, MetaState, PrivateCommand, StyledText, TextFlags, TextRange,
};

/// The authoritative text buffer a connection edits.
///
/// Implemented by the target side and only ever touched from the relay
/// consumer, so implementations need no internal synchronization. Every
/// range handed to these methods is already clamped to `len_chars()`.
///
/// Only the buffer accessors are required. The remaining hooks default to
/// "not handled"; their return values are informational, the protocol
/// reports a write as accepted either way.
pub trait TextField: Send + 'static {
	/// Buffer length in characters.
	fn len_chars(&self) -> usize;

	/// Returns the text in `range`, with style spans when `flags` asks for them.
	fn slice(&self, range: TextRange, flags: TextFlags) -> StyledText;

	/// Replaces `range` with `text`.
	fn replace(&mut self, range: TextRange, text: &str);

	/// Opaque caps-mode value for the position `offset`.
	fn cursor_caps_mode(&self, _offset: CharIdx, _req_modes: u32) -> u32 {
		0
	}

	/// Current clipboard text.
	fn clipboard(&self) -> Option<String> {
		None
	}

	/// Stores `text` on the clipboard.
	fn set_clipboard(&mut self, _text: String) {}

	fn perform_editor_action(&mut self, _action: EditorAction) -> bool {
		false
	}

	/// Handles a field-defined context menu item.
	fn perform_context_menu_action(&mut self, _id: u32) -> bool {
		false
	}

	fn send_key_event(&mut self, _event: KeyEvent) -> bool {
		false
	}

	fn clear_meta_key_states(&mut self, _states: MetaState) -> bool {
		false
	}

	fn report_fullscreen_mode(&mut self, _enabled: bool) {}

	fn perform_private_command(&mut self, _command: &PrivateCommand) -> bool {
		false
	}

	fn commit_completion(&mut self, _completion: &CompletionInfo) -> bool {
		false
	}

	fn commit_correction(&mut self, _correction: &CorrectionInfo) -> bool {
		false
	}
}

/// Static description of a bound field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldInfo {
	/// Opaque input type bits.
	pub input_type: u32,
	/// Preferred editor action.
	pub action: Option<EditorAction>,
	/// Selection at bind time.
	pub initial_selection: TextRange,
	/// Whether the field holds a single line.
	pub single_line: bool,
	/// Optional user-facing label.
	pub label: Option<String>,
}

impl FieldInfo {
	/// Info for a multi-line field with the cursor at `cursor`.
	pub fn with_cursor(cursor: CharIdx) -> Self {
		Self {
			initial_selection: TextRange::point(cursor),
			..Self::default()
		}
	}
}
