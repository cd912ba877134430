//! Text payloads returned by read calls.

use crate::flags::{ExtractFlags, ExtractedTextFlags};
use crate::range::{CharIdx, TextRange};

/// One style span over a piece of returned text.
///
/// The style tag is opaque to the link; fields define their own vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSpan {
	/// Span range, relative to the start of the returned text.
	pub range: TextRange,
	/// Opaque style tag.
	pub style: String,
}

/// Text returned by a read, with style spans when they were requested.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledText {
	/// Plain text content.
	pub text: String,
	/// Style spans, empty unless requested with [`crate::TextFlags::WITH_STYLES`].
	pub spans: Vec<StyleSpan>,
}

impl StyledText {
	/// Creates unstyled text.
	pub fn plain(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			spans: Vec::new(),
		}
	}

	/// Returns the plain text.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Returns the length in characters.
	pub fn char_len(&self) -> usize {
		self.text.chars().count()
	}
}

impl From<&str> for StyledText {
	fn from(text: &str) -> Self {
		Self::plain(text)
	}
}

/// Text window around the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurroundingText {
	/// Window content.
	pub text: StyledText,
	/// Selection, relative to the window start.
	pub selection: TextRange,
	/// Absolute offset of the window start in the field.
	pub offset: CharIdx,
}

/// Request parameters for an extracted text snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractedTextRequest {
	/// Caller-chosen token echoed back in monitor updates.
	pub token: i32,
	/// Hint for the maximum number of lines, `0` for no hint.
	pub hint_max_lines: usize,
	/// Hint for the maximum number of characters, `0` for no hint.
	pub hint_max_chars: usize,
}

/// Snapshot of a field's text and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
	/// Extracted content.
	pub text: String,
	/// Absolute offset of `text` in the field.
	pub start_offset: CharIdx,
	/// Changed span for partial updates, relative to `start_offset`; `None` for a full snapshot.
	pub partial: Option<TextRange>,
	/// Selection, relative to `start_offset`.
	pub selection: TextRange,
	/// Snapshot properties.
	pub flags: ExtractedTextFlags,
}

/// Extraction options attached to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
	/// Request parameters.
	pub request: ExtractedTextRequest,
	/// Extraction flags.
	pub flags: ExtractFlags,
}
