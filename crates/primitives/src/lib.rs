//! Value types for the edit link: ranges, cursor placement, text payloads and opaque actions.
//!
//! Everything here is plain data. Values cross the relay by move and are
//! never shared with the live state owned by the consumer.

/// Cursor placement rule for text insertion.
pub mod cursor;
/// Flag sets carried by protocol calls.
pub mod flags;
/// Key events, editor actions and private commands.
pub mod input;
/// Half-open character ranges.
pub mod range;
/// Read payloads.
pub mod text;

pub use cursor::place_cursor;
pub use flags::{ExtractFlags, ExtractedTextFlags, MetaState, TextFlags};
pub use input::{CompletionInfo, ContextMenuAction, CorrectionInfo, EditorAction, KeyAction, KeyEvent, PrivateCommand};
pub use range::{Bias, CharIdx, CharLen, TextRange, map_pos};
pub use text::{ExtractOptions, ExtractedText, ExtractedTextRequest, StyleSpan, StyledText, SurroundingText};
