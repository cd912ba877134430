//! Session lifecycle.
//!
//! ```text
//! Created ──▶ Active ⇄ Disabled
//!               │         │
//!               └────┬────┘
//!                    ▼
//!                 Revoked (terminal)
//! ```
//!
//! The state lives in one atomic shared by the producer handle and the
//! consumer's table, so a revoke is visible to producers as soon as it is issued.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use parking_lot::Mutex;

/// Identifier of one created session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "s{}", self.0)
	}
}

/// Identifier of one producer connection, unique within a link.
///
/// Clones of an [`crate::EditConnection`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
	pub(crate) const fn new(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ConnectionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "c{}", self.0)
	}
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
	Created = 0,
	Active = 1,
	Disabled = 2,
	Revoked = 3,
}

impl SessionState {
	const fn from_u8(raw: u8) -> Self {
		match raw {
			0 => Self::Created,
			1 => Self::Active,
			2 => Self::Disabled,
			_ => Self::Revoked,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Created => "created",
			Self::Active => "active",
			Self::Disabled => "disabled",
			Self::Revoked => "revoked",
		}
	}
}

/// Session state shared between the producer handle and the consumer.
#[derive(Debug)]
pub struct SessionShared {
	id: SessionId,
	state: AtomicU8,
}

impl SessionShared {
	pub(crate) fn new(id: SessionId) -> Self {
		Self {
			id,
			state: AtomicU8::new(SessionState::Created as u8),
		}
	}

	pub fn id(&self) -> SessionId {
		self.id
	}

	pub fn state(&self) -> SessionState {
		SessionState::from_u8(self.state.load(Ordering::Acquire))
	}

	/// True while protocol calls may run against the session.
	pub fn is_active(&self) -> bool {
		self.state() == SessionState::Active
	}

	/// `Created → Active`. Returns false from any other state.
	pub(crate) fn activate(&self) -> bool {
		self.transition(|state| (state == SessionState::Created).then_some(SessionState::Active))
	}

	/// `Active ⇄ Disabled`. A no-op returning false once revoked or not yet active.
	pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
		self.transition(|state| match state {
			SessionState::Active | SessionState::Disabled if enabled => Some(SessionState::Active),
			SessionState::Active | SessionState::Disabled => Some(SessionState::Disabled),
			SessionState::Created | SessionState::Revoked => None,
		})
	}

	/// Any state → `Revoked`. Returns true if this call revoked it.
	pub(crate) fn revoke(&self) -> bool {
		self.transition(|state| (state != SessionState::Revoked).then_some(SessionState::Revoked))
	}

	fn transition(&self, next: impl Fn(SessionState) -> Option<SessionState>) -> bool {
		self.state
			.fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| next(SessionState::from_u8(raw)).map(|s| s as u8))
			.is_ok()
	}
}

/// Producer-visible registry holding the attachment's live session.
///
/// An attachment owns at most one live session; creating a new one revokes
/// the previous one.
#[derive(Debug, Default)]
pub(crate) struct SessionDirectory {
	next_id: AtomicU64,
	current: Mutex<Option<Arc<SessionShared>>>,
}

impl SessionDirectory {
	/// Allocates an active session and installs it, returning the one it replaced.
	pub(crate) fn create(&self) -> (Arc<SessionShared>, Option<Arc<SessionShared>>) {
		let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1));
		let shared = Arc::new(SessionShared::new(id));
		shared.activate();
		let replaced = self.current.lock().replace(Arc::clone(&shared));
		(shared, replaced)
	}

	/// Looks up the live session by id.
	pub(crate) fn get(&self, id: SessionId) -> Option<Arc<SessionShared>> {
		self.current.lock().as_ref().filter(|shared| shared.id() == id).cloned()
	}

	/// Removes the live session if it has this id.
	pub(crate) fn remove(&self, id: SessionId) -> Option<Arc<SessionShared>> {
		let mut current = self.current.lock();
		if current.as_ref().is_some_and(|shared| shared.id() == id) { current.take() } else { None }
	}
}

/// Consumer-owned view of registered sessions.
#[derive(Debug, Default)]
pub(crate) struct SessionTable {
	sessions: HashMap<SessionId, Arc<SessionShared>>,
}

impl SessionTable {
	pub(crate) fn insert(&mut self, shared: Arc<SessionShared>) {
		self.sessions.insert(shared.id(), shared);
	}

	pub(crate) fn remove(&mut self, id: SessionId) -> Option<Arc<SessionShared>> {
		self.sessions.remove(&id)
	}

	pub(crate) fn get(&self, id: SessionId) -> Option<&Arc<SessionShared>> {
		self.sessions.get(&id)
	}

	/// True if `id` is registered and active.
	pub(crate) fn is_active(&self, id: SessionId) -> bool {
		self.sessions.get(&id).is_some_and(|shared| shared.is_active())
	}
}
