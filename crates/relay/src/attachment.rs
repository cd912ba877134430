use std::sync::atomic::{AtomicBool, Ordering};

use edlink_worker::{Generation, GenerationClock};

use crate::error::{RelayError, Result};
use crate::gate::{AuthToken, TokenGate};

/// Binding between one producer and the target it controls.
///
/// Holds the one-shot token, the bind generation and the validity flag.
/// Everything is readable from any thread without going through the relay.
#[derive(Debug)]
pub struct Attachment {
	gate: TokenGate,
	clock: GenerationClock,
	valid: AtomicBool,
}

impl Default for Attachment {
	fn default() -> Self {
		Self::new()
	}
}

impl Attachment {
	/// Creates a valid, unclaimed, unbound attachment.
	pub fn new() -> Self {
		Self {
			gate: TokenGate::new(),
			clock: GenerationClock::new(),
			valid: AtomicBool::new(true),
		}
	}

	/// Claims the attachment for `token`. Later claims are ignored and return false.
	pub fn attach_token(&self, token: AuthToken) -> bool {
		let claimed = self.gate.attach(token);
		if !claimed {
			tracing::warn!(token = ?token, "relay.attach_rejected");
		}
		claimed
	}

	/// Checks that the attachment is live and `token` is the claimed token.
	pub fn authenticate(&self, token: &AuthToken) -> Result<()> {
		if !self.is_valid() {
			return Err(RelayError::Detached);
		}
		if !self.gate.authenticate(token) {
			return Err(RelayError::Unauthenticated);
		}
		Ok(())
	}

	/// Returns true once a token has been claimed.
	pub fn is_claimed(&self) -> bool {
		self.gate.is_claimed()
	}

	/// Current bind generation.
	pub fn generation(&self) -> Generation {
		self.clock.current()
	}

	/// Bumps the generation, invalidating every handle stamped earlier.
	pub fn advance_generation(&self) -> Generation {
		self.clock.advance()
	}

	/// Returns true if `generation` is the current bind.
	pub fn is_current(&self, generation: Generation) -> bool {
		self.clock.is_current(generation)
	}

	/// Returns false after teardown or a consumer fault.
	pub fn is_valid(&self) -> bool {
		self.valid.load(Ordering::Acquire)
	}

	/// Marks the attachment invalid. Returns true if this call flipped it.
	pub fn invalidate(&self) -> bool {
		self.valid.swap(false, Ordering::AcqRel)
	}
}
