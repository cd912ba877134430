//! Flag sets carried by protocol calls.

bitflags::bitflags! {
	/// Options for text reads.
	///
	/// Plain output is the default when no flag is set.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct TextFlags: u32 {
		/// Return style spans along with the text.
		const WITH_STYLES = 1 << 0;
	}
}

bitflags::bitflags! {
	/// Options for an extracted text request.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ExtractFlags: u32 {
		/// Keep pushing extracted text after every change until the connection closes.
		const MONITOR = 1 << 0;
	}
}

bitflags::bitflags! {
	/// Properties of an extracted text snapshot.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ExtractedTextFlags: u32 {
		/// The field is single line.
		const SINGLE_LINE = 1 << 0;
		/// The selection is non-empty.
		const SELECTING = 1 << 1;
	}
}

bitflags::bitflags! {
	/// Meta key latch state attached to key events.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct MetaState: u32 {
		/// Shift is active.
		const SHIFT = 1 << 0;
		/// Alt is active.
		const ALT = 1 << 1;
		/// Symbol modifier is active.
		const SYM = 1 << 2;
		/// Function modifier is active.
		const FUNCTION = 1 << 3;
		/// Ctrl is active.
		const CTRL = 1 << 12;
		/// Meta is active.
		const META = 1 << 16;
		/// Caps lock is latched.
		const CAPS_LOCK = 1 << 20;
	}
}
