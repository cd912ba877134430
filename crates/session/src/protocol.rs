//! Per-connection edit state and the cursor/text protocol applied to it.
//!
//! Owned by the relay consumer; every method runs on the single writer.

use edlink_primitives::{
	ContextMenuAction, ExtractFlags, ExtractOptions, ExtractedText, ExtractedTextFlags, ExtractedTextRequest, SurroundingText, TextFlags,
	TextRange, place_cursor,
};

use crate::call::{ReadQuery, ReadReply, WriteOp};
use crate::field::{FieldInfo, TextField};

/// Selection report published when the selection or composing region changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionUpdate {
	/// Selection last reported.
	pub old_selection: TextRange,
	pub new_selection: TextRange,
	/// Composing region after the change.
	pub composing: Option<TextRange>,
}

/// Notification produced once no batch edit is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Update {
	Selection(SelectionUpdate),
	Extracted { token: i32, text: ExtractedText },
}

#[derive(Debug)]
pub(crate) struct EditState {
	selection: TextRange,
	composing: Option<TextRange>,
	batch_depth: u32,
	text_changed: bool,
	reported_selection: TextRange,
	reported_composing: Option<TextRange>,
	monitor: Option<ExtractedTextRequest>,
	single_line: bool,
	max_extract_chars: usize,
}

impl EditState {
	pub(crate) fn new(info: &FieldInfo, field: &dyn TextField, max_extract_chars: usize) -> Self {
		let selection = info.initial_selection.clamp(field.len_chars());
		Self {
			selection,
			composing: None,
			batch_depth: 0,
			text_changed: false,
			reported_selection: selection,
			reported_composing: None,
			monitor: None,
			single_line: info.single_line,
			max_extract_chars,
		}
	}

	pub(crate) fn selection(&self) -> TextRange {
		self.selection
	}

	pub(crate) fn composing(&self) -> Option<TextRange> {
		self.composing
	}

	pub(crate) fn batch_depth(&self) -> u32 {
		self.batch_depth
	}

	/// Applies one write. Returns false only for an unbalanced `EndBatchEdit`.
	pub(crate) fn write(&mut self, field: &mut dyn TextField, op: WriteOp) -> bool {
		self.clamp_to(field.len_chars());
		match op {
			WriteOp::BeginBatchEdit => {
				self.batch_depth = self.batch_depth.saturating_add(1);
			}
			WriteOp::EndBatchEdit => {
				if self.batch_depth == 0 {
					tracing::debug!("edit.unbalanced_end_batch");
					return false;
				}
				self.batch_depth -= 1;
			}
			WriteOp::CommitText { text, new_cursor_position } => self.insert(field, &text, new_cursor_position, false),
			WriteOp::SetComposingText { text, new_cursor_position } => self.insert(field, &text, new_cursor_position, true),
			WriteOp::SetComposingRegion { start, end } => {
				let region = TextRange::new(start, end).clamp(field.len_chars());
				self.composing = (!region.is_empty()).then_some(region);
			}
			WriteOp::FinishComposingText => self.composing = None,
			WriteOp::DeleteSurroundingText { before, after } => self.delete_surrounding(field, before, after),
			WriteOp::SetSelection { start, end } => {
				let len = field.len_chars();
				if start > len || end > len {
					tracing::trace!(start, end, len, "edit.selection_out_of_bounds");
				} else {
					self.selection = TextRange::new(start, end);
				}
			}
			WriteOp::PerformContextMenuAction(action) => self.context_menu(field, action),
			WriteOp::CommitCompletion(completion) => forwarded("commit_completion", field.commit_completion(&completion)),
			WriteOp::CommitCorrection(correction) => forwarded("commit_correction", field.commit_correction(&correction)),
			WriteOp::PerformEditorAction(action) => forwarded("perform_editor_action", field.perform_editor_action(action)),
			WriteOp::SendKeyEvent(event) => forwarded("send_key_event", field.send_key_event(event)),
			WriteOp::ClearMetaKeyStates(states) => forwarded("clear_meta_key_states", field.clear_meta_key_states(states)),
			WriteOp::ReportFullscreenMode(enabled) => field.report_fullscreen_mode(enabled),
			WriteOp::PerformPrivateCommand(command) => {
				if !command.is_namespaced() {
					tracing::debug!(name = %command.name, "edit.private_command_not_namespaced");
				}
				forwarded("perform_private_command", field.perform_private_command(&command));
			}
		}
		true
	}

	/// Answers one read.
	pub(crate) fn read(&mut self, field: &dyn TextField, query: ReadQuery) -> ReadReply {
		let len = field.len_chars();
		self.clamp_to(len);
		let selection = self.selection;
		match query {
			ReadQuery::TextBeforeCursor { n, flags } => {
				let range = TextRange::new(selection.start.saturating_sub(n), selection.start);
				ReadReply::Text(Some(field.slice(range, flags)))
			}
			ReadQuery::TextAfterCursor { n, flags } => {
				let range = TextRange::new(selection.end, selection.end.saturating_add(n).min(len));
				ReadReply::Text(Some(field.slice(range, flags)))
			}
			ReadQuery::SelectedText { flags } => ReadReply::Text((!selection.is_empty()).then(|| field.slice(selection, flags))),
			ReadQuery::CursorCapsMode { req_modes } => ReadReply::CapsMode(field.cursor_caps_mode(selection.start, req_modes)),
			ReadQuery::ExtractedText(ExtractOptions { request, flags }) => {
				if flags.contains(ExtractFlags::MONITOR) {
					self.monitor = Some(request);
				}
				ReadReply::Extracted(Some(self.extract(field, request)))
			}
			ReadQuery::SurroundingText { before, after, flags } => {
				let window = TextRange::new(selection.start.saturating_sub(before), selection.end.saturating_add(after).min(len));
				ReadReply::Surrounding(Some(SurroundingText {
					text: field.slice(window, flags),
					selection: selection.relative_to(window.start),
					offset: window.start,
				}))
			}
		}
	}

	/// True when no batch, composing region or monitor is open.
	pub(crate) fn is_idle(&self) -> bool {
		self.batch_depth == 0 && self.composing.is_none() && self.monitor.is_none()
	}

	/// Finishes composing, collapses open batches and stops monitoring.
	///
	/// Returns the notifications the collapse released.
	pub(crate) fn close(&mut self, field: &dyn TextField) -> Vec<Update> {
		self.composing = None;
		self.batch_depth = 0;
		let updates = self.take_updates(field);
		self.monitor = None;
		updates
	}

	/// Drains pending notifications. Yields nothing while a batch edit is open.
	pub(crate) fn take_updates(&mut self, field: &dyn TextField) -> Vec<Update> {
		if self.batch_depth > 0 {
			return Vec::new();
		}
		let mut updates = Vec::new();
		let moved = self.selection != self.reported_selection || self.composing != self.reported_composing;
		if moved {
			updates.push(Update::Selection(SelectionUpdate {
				old_selection: self.reported_selection,
				new_selection: self.selection,
				composing: self.composing,
			}));
			self.reported_selection = self.selection;
			self.reported_composing = self.composing;
		}
		if let Some(request) = self.monitor
			&& (moved || self.text_changed)
		{
			updates.push(Update::Extracted {
				token: request.token,
				text: self.extract(field, request),
			});
		}
		self.text_changed = false;
		updates
	}

	fn clamp_to(&mut self, len: usize) {
		self.selection = self.selection.clamp(len);
		self.composing = self.composing.map(|region| region.clamp(len)).filter(|region| !region.is_empty());
	}

	/// Replaces the composing region, or the selection without one, then places the cursor.
	fn insert(&mut self, field: &mut dyn TextField, text: &str, new_cursor_position: i32, composing: bool) {
		let target = self.composing.unwrap_or(self.selection);
		field.replace(target, text);
		self.text_changed = true;

		let inserted = text.chars().count();
		self.composing = (composing && inserted > 0).then(|| TextRange::new(target.start, target.start + inserted));
		let cursor = place_cursor(target.start, inserted, new_cursor_position, field.len_chars());
		self.selection = TextRange::point(cursor);
	}

	fn delete_surrounding(&mut self, field: &mut dyn TextField, before: usize, after: usize) {
		// The selection and any composing text are never deleted.
		let kept = self.composing.map_or(self.selection, |region| region.union(self.selection));
		let len = field.len_chars();
		let tail = TextRange::new(kept.end, kept.end.saturating_add(after).min(len));
		let head = TextRange::new(kept.start.saturating_sub(before), kept.start);

		// Tail first so the head offsets stay valid.
		for span in [tail, head] {
			if !span.is_empty() {
				self.splice(field, span, "");
			}
		}
	}

	fn context_menu(&mut self, field: &mut dyn TextField, action: ContextMenuAction) {
		let selection = self.selection;
		match action {
			ContextMenuAction::SelectAll => self.selection = TextRange::new(0, field.len_chars()),
			ContextMenuAction::Copy | ContextMenuAction::Cut if selection.is_empty() => {}
			ContextMenuAction::Copy => {
				let copied = field.slice(selection, TextFlags::empty()).text;
				field.set_clipboard(copied);
			}
			ContextMenuAction::Cut => {
				let cut = field.slice(selection, TextFlags::empty()).text;
				field.set_clipboard(cut);
				self.splice(field, selection, "");
				self.selection = TextRange::point(selection.start);
			}
			ContextMenuAction::Paste => {
				let Some(text) = field.clipboard() else {
					return;
				};
				let inserted = self.splice(field, selection, &text);
				self.selection = TextRange::point(selection.start + inserted);
			}
			ContextMenuAction::Other(id) => forwarded("perform_context_menu_action", field.perform_context_menu_action(id)),
		}
	}

	/// Replaces `range` and maps selection and composing region through the edit.
	fn splice(&mut self, field: &mut dyn TextField, range: TextRange, text: &str) -> usize {
		field.replace(range, text);
		let inserted = text.chars().count();
		self.selection = self.selection.map_through(range, inserted);
		self.composing = self
			.composing
			.map(|region| region.map_through(range, inserted))
			.filter(|region| !region.is_empty());
		self.text_changed = true;
		inserted
	}

	fn extract(&self, field: &dyn TextField, request: ExtractedTextRequest) -> ExtractedText {
		let len = field.len_chars();
		let limit = [request.hint_max_chars, self.max_extract_chars].into_iter().filter(|&n| n > 0).min();
		let window = match limit {
			Some(limit) if limit < len => {
				let start = self.selection.start.saturating_sub(limit / 2).min(len - limit);
				TextRange::new(start, start + limit)
			}
			_ => TextRange::new(0, len),
		};

		let mut flags = ExtractedTextFlags::empty();
		flags.set(ExtractedTextFlags::SELECTING, !self.selection.is_empty());
		flags.set(ExtractedTextFlags::SINGLE_LINE, self.single_line);
		ExtractedText {
			text: field.slice(window, TextFlags::empty()).text,
			start_offset: window.start,
			partial: None,
			selection: self.selection.relative_to(window.start),
			flags,
		}
	}
}

fn forwarded(kind: &'static str, handled: bool) {
	tracing::trace!(kind, handled, "edit.forwarded");
}
