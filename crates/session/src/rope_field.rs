use std::sync::Arc;

use edlink_primitives::{
	CharIdx, CompletionInfo, CorrectionInfo, EditorAction, KeyEvent, MetaState, PrivateCommand, StyleSpan, StyledText, TextFlags, TextRange,
};
use parking_lot::Mutex;
use ropey::Rope;

use crate::field::TextField;

/// Side effects a [`RopeField`] recorded instead of acting on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEffect {
	EditorAction(EditorAction),
	ContextMenu(u32),
	Key(KeyEvent),
	ClearMeta(MetaState),
	Fullscreen(bool),
	PrivateCommand(PrivateCommand),
	Completion(CompletionInfo),
	Correction(CorrectionInfo),
}

#[derive(Debug, Default)]
struct Inner {
	rope: Rope,
	spans: Vec<StyleSpan>,
	clipboard: Option<String>,
	caps_mode: u32,
	effects: Vec<FieldEffect>,
}

/// In-memory [`TextField`] over a rope.
///
/// Clones share the same buffer, so a caller can keep one clone to inspect
/// the text while the host owns the other.
#[derive(Debug, Clone, Default)]
pub struct RopeField {
	inner: Arc<Mutex<Inner>>,
}

impl RopeField {
	pub fn new(text: &str) -> Self {
		Self {
			inner: Arc::new(Mutex::new(Inner {
				rope: Rope::from_str(text),
				..Inner::default()
			})),
		}
	}

	/// Sets the value returned for every caps-mode query.
	#[must_use]
	pub fn with_caps_mode(self, caps_mode: u32) -> Self {
		self.inner.lock().caps_mode = caps_mode;
		self
	}

	/// Full buffer content.
	pub fn text(&self) -> String {
		self.inner.lock().rope.to_string()
	}

	/// Tags `range` with an opaque style; the span follows later edits.
	pub fn add_style(&self, range: TextRange, style: impl Into<String>) {
		let mut inner = self.inner.lock();
		let range = range.clamp(inner.rope.len_chars());
		inner.spans.push(StyleSpan { range, style: style.into() });
	}

	/// Current style spans, in buffer coordinates.
	pub fn styles(&self) -> Vec<StyleSpan> {
		self.inner.lock().spans.clone()
	}

	pub fn clipboard_text(&self) -> Option<String> {
		self.inner.lock().clipboard.clone()
	}

	pub fn set_clipboard_text(&self, text: impl Into<String>) {
		self.inner.lock().clipboard = Some(text.into());
	}

	/// Effects recorded so far, oldest first.
	pub fn effects(&self) -> Vec<FieldEffect> {
		self.inner.lock().effects.clone()
	}

	fn record(&self, effect: FieldEffect) -> bool {
		self.inner.lock().effects.push(effect);
		true
	}
}

impl TextField for RopeField {
	fn len_chars(&self) -> usize {
		self.inner.lock().rope.len_chars()
	}

	fn slice(&self, range: TextRange, flags: TextFlags) -> StyledText {
		let inner = self.inner.lock();
		let range = range.clamp(inner.rope.len_chars());
		let text = inner.rope.slice(range.start..range.end).to_string();
		let spans = if flags.contains(TextFlags::WITH_STYLES) {
			inner
				.spans
				.iter()
				.filter(|span| span.range.start < range.end && span.range.end > range.start)
				.map(|span| StyleSpan {
					range: TextRange::new(span.range.start.max(range.start), span.range.end.min(range.end)).relative_to(range.start),
					style: span.style.clone(),
				})
				.collect()
		} else {
			Vec::new()
		};
		StyledText { text, spans }
	}

	fn replace(&mut self, range: TextRange, text: &str) {
		let mut inner = self.inner.lock();
		let range = range.clamp(inner.rope.len_chars());
		inner.rope.remove(range.start..range.end);
		inner.rope.insert(range.start, text);

		let inserted = text.chars().count();
		inner.spans.retain_mut(|span| {
			span.range = span.range.map_through(range, inserted);
			!span.range.is_empty()
		});
	}

	fn cursor_caps_mode(&self, _offset: CharIdx, req_modes: u32) -> u32 {
		self.inner.lock().caps_mode & req_modes
	}

	fn clipboard(&self) -> Option<String> {
		self.clipboard_text()
	}

	fn set_clipboard(&mut self, text: String) {
		self.inner.lock().clipboard = Some(text);
	}

	fn perform_editor_action(&mut self, action: EditorAction) -> bool {
		self.record(FieldEffect::EditorAction(action))
	}

	fn perform_context_menu_action(&mut self, id: u32) -> bool {
		self.record(FieldEffect::ContextMenu(id))
	}

	fn send_key_event(&mut self, event: KeyEvent) -> bool {
		self.record(FieldEffect::Key(event))
	}

	fn clear_meta_key_states(&mut self, states: MetaState) -> bool {
		self.record(FieldEffect::ClearMeta(states))
	}

	fn report_fullscreen_mode(&mut self, enabled: bool) {
		self.record(FieldEffect::Fullscreen(enabled));
	}

	fn perform_private_command(&mut self, command: &PrivateCommand) -> bool {
		self.record(FieldEffect::PrivateCommand(command.clone()))
	}

	fn commit_completion(&mut self, completion: &CompletionInfo) -> bool {
		self.record(FieldEffect::Completion(completion.clone()))
	}

	fn commit_correction(&mut self, correction: &CorrectionInfo) -> bool {
		self.record(FieldEffect::Correction(correction.clone()))
	}
}
