//! Cursor placement shared by every text-insertion call.

use crate::range::{CharIdx, CharLen};

/// Resolves the cursor offset after inserting `inserted` characters at `insertion_start`.
///
/// `new_cursor_position` is relative to the inserted text:
/// * `> 0`: relative to the end of the insertion, `1` meaning right after it.
/// * `<= 0`: relative to the start of the insertion, `0` meaning right before it.
///
/// The cursor can therefore never land strictly inside the inserted text.
/// The result is clamped to `[0, buffer_len]`.
pub fn place_cursor(insertion_start: CharIdx, inserted: CharLen, new_cursor_position: i32, buffer_len: CharLen) -> CharIdx {
	let start = insertion_start as i64;
	let position = i64::from(new_cursor_position);
	let target = if position > 0 { start + inserted as i64 + (position - 1) } else { start + position };
	target.clamp(0, buffer_len as i64) as CharIdx
}
