use std::fmt;
use std::sync::OnceLock;

use uuid::Uuid;

/// Opaque authentication token presented by a producer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthToken(Uuid);

impl AuthToken {
	/// Generates a fresh random token.
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}

	/// Wraps an existing identifier.
	pub const fn from_uuid(id: Uuid) -> Self {
		Self(id)
	}
}

impl fmt::Debug for AuthToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Only a prefix is printed so tokens do not leak into logs.
		let simple = self.0.simple().to_string();
		write!(f, "AuthToken({}..)", &simple[..8])
	}
}

/// One-shot token slot: the first token stored wins for the attachment's lifetime.
#[derive(Debug, Default)]
pub struct TokenGate {
	slot: OnceLock<AuthToken>,
}

impl TokenGate {
	/// Creates an unclaimed gate.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `token` if the gate is unclaimed.
	///
	/// Returns false, leaving the gate untouched, if a token was already stored.
	pub fn attach(&self, token: AuthToken) -> bool {
		self.slot.set(token).is_ok()
	}

	/// Returns true if `token` is the claimed token.
	pub fn authenticate(&self, token: &AuthToken) -> bool {
		self.slot.get() == Some(token)
	}

	/// Returns true once a token has been stored.
	pub fn is_claimed(&self) -> bool {
		self.slot.get().is_some()
	}
}
