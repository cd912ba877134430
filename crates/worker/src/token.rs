use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Binding generation stamped on every handle.
///
/// Generation `0` means "never bound"; no handle is ever current at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
	/// The generation before the first bind.
	pub const UNBOUND: Self = Self(0);

	/// Wraps a raw generation value.
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	/// Returns the raw value.
	pub const fn get(self) -> u64 {
		self.0
	}

	/// Returns true for any generation produced by a bind.
	pub const fn is_bound(self) -> bool {
		self.0 != 0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "g{}", self.0)
	}
}

/// Monotonic, shareable generation counter.
///
/// Clones observe the same counter. Reads are lock-free so producers on any
/// thread can check a stamp without touching the consumer.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	current: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a clock at [`Generation::UNBOUND`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current generation.
	pub fn current(&self) -> Generation {
		Generation(self.current.load(Ordering::Acquire))
	}

	/// Bumps the clock and returns the new generation.
	pub fn advance(&self) -> Generation {
		Generation(self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}

	/// Returns true if `generation` is bound and still the latest.
	pub fn is_current(&self, generation: Generation) -> bool {
		generation.is_bound() && self.current() == generation
	}
}
