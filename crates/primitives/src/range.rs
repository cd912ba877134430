/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for edlink. Both sides of a link
/// agree on it, so offsets carried across the relay never need re-encoding.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
pub type CharLen = usize;

/// Bias determines how positions at edit boundaries are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before text inserted at the same location.
	Left,
	/// Position moves after text inserted at the same location.
	Right,
}

/// A half-open text range `[start, end)` with `start <= end`.
///
/// Selections and composing regions are both stored as `TextRange` values.
/// The invariant is enforced at construction: [`TextRange::new`] orders its
/// endpoints, so a backward pair from a producer collapses into the same
/// forward range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
	/// Inclusive start offset.
	pub start: CharIdx,
	/// Exclusive end offset.
	pub end: CharIdx,
}

impl TextRange {
	/// Creates a range from two offsets in either order.
	pub fn new(a: CharIdx, b: CharIdx) -> Self {
		Self {
			start: a.min(b),
			end: a.max(b),
		}
	}

	/// Creates a zero-width range (cursor) at the given position.
	pub const fn point(pos: CharIdx) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns the length of the range in characters.
	#[inline]
	pub const fn len(&self) -> CharLen {
		self.end - self.start
	}

	/// Returns true for a zero-width range.
	#[inline]
	pub const fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `pos` lies in `[start, end)`.
	#[inline]
	pub const fn contains(&self, pos: CharIdx) -> bool {
		self.start <= pos && pos < self.end
	}

	/// Clamps both endpoints to `[0, len]`.
	#[must_use]
	pub fn clamp(self, len: CharLen) -> Self {
		Self::new(self.start.min(len), self.end.min(len))
	}

	/// Returns the smallest range covering both `self` and `other`.
	#[must_use]
	pub fn union(self, other: Self) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Returns this range shifted so that `origin` becomes offset zero.
	///
	/// Offsets before `origin` saturate at zero.
	#[must_use]
	pub fn relative_to(self, origin: CharIdx) -> Self {
		Self {
			start: self.start.saturating_sub(origin),
			end: self.end.saturating_sub(origin),
		}
	}

	/// Maps this range through the replacement of `edited` by `inserted` characters.
	///
	/// The start maps with [`Bias::Left`] and the end with [`Bias::Right`]:
	/// a range adjacent to a replaced span keeps its extent, and a pure
	/// insertion at one of its endpoints extends it.
	#[must_use]
	pub fn map_through(self, edited: TextRange, inserted: CharLen) -> Self {
		let start = map_pos(self.start, edited, inserted, Bias::Left);
		let end = map_pos(self.end, edited, inserted, Bias::Right);
		Self::new(start, end)
	}
}

impl From<std::ops::Range<CharIdx>> for TextRange {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl std::fmt::Display for TextRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {})", self.start, self.end)
	}
}

/// Maps one position through the replacement of `edited` by `inserted` characters.
///
/// Positions strictly inside the replaced span collapse onto its start
/// ([`Bias::Left`]) or onto the end of the inserted text ([`Bias::Right`]).
/// Bias also decides which side of a pure insertion a position lands on.
pub fn map_pos(pos: CharIdx, edited: TextRange, inserted: CharLen, bias: Bias) -> CharIdx {
	if edited.is_empty() {
		return match (pos.cmp(&edited.start), bias) {
			(std::cmp::Ordering::Less, _) | (std::cmp::Ordering::Equal, Bias::Left) => pos,
			_ => pos + inserted,
		};
	}
	if pos <= edited.start {
		return pos;
	}
	if pos >= edited.end {
		return pos - edited.len() + inserted;
	}
	match bias {
		Bias::Left => edited.start,
		Bias::Right => edited.start + inserted,
	}
}
