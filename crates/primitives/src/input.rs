//! Opaque action and event payloads forwarded to the field.

use std::collections::BTreeMap;

use crate::flags::MetaState;

/// Key event direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
	/// Key pressed.
	Down,
	/// Key released.
	Up,
}

/// A synthetic key event sent by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
	/// Press or release.
	pub action: KeyAction,
	/// Platform key code, opaque to the link.
	pub code: u32,
	/// Meta state active for this event.
	pub meta: MetaState,
	/// Auto-repeat count.
	pub repeat: u32,
}

impl KeyEvent {
	/// Creates a key-down event with no meta state.
	pub const fn down(code: u32) -> Self {
		Self {
			action: KeyAction::Down,
			code,
			meta: MetaState::empty(),
			repeat: 0,
		}
	}

	/// Creates a key-up event with no meta state.
	pub const fn up(code: u32) -> Self {
		Self {
			action: KeyAction::Up,
			code,
			meta: MetaState::empty(),
			repeat: 0,
		}
	}
}

/// Editor action requested by the producer (the field's "enter" semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
	Unspecified,
	None,
	Go,
	Search,
	Send,
	Next,
	Done,
	Previous,
	/// Field-defined action code.
	Custom(u32),
}

/// Context menu action applied to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextMenuAction {
	/// Select the whole buffer.
	SelectAll,
	/// Move the selection to the clipboard.
	Cut,
	/// Copy the selection to the clipboard.
	Copy,
	/// Replace the selection with the clipboard content.
	Paste,
	/// Field-defined menu item id.
	Other(u32),
}

/// A completion chosen by the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionInfo {
	/// Field-assigned completion id.
	pub id: i64,
	/// Position of the completion in the field's list.
	pub position: u32,
	/// Completion text.
	pub text: String,
	/// Optional display label.
	pub label: Option<String>,
}

/// An auto-correction performed by the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionInfo {
	/// Offset of the corrected word.
	pub offset: usize,
	/// Text before correction.
	pub old_text: String,
	/// Text after correction.
	pub new_text: String,
}

/// A producer-defined command with an opaque key-value payload.
///
/// Names are expected to be namespaced (`com.example.command`) to avoid collisions
/// between unrelated producers; the link only checks the convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateCommand {
	/// Fully-qualified command name.
	pub name: String,
	/// Opaque payload.
	pub data: BTreeMap<String, String>,
}

impl PrivateCommand {
	/// Creates a command with an empty payload.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			data: BTreeMap::new(),
		}
	}

	/// Adds one payload entry.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.data.insert(key.into(), value.into());
		self
	}

	/// Returns true if the name follows the `namespace.command` convention.
	pub fn is_namespaced(&self) -> bool {
		match self.name.rsplit_once('.') {
			Some((namespace, command)) => !namespace.is_empty() && !command.is_empty(),
			None => false,
		}
	}
}
