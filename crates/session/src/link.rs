use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use edlink_relay::{Generation, RelayError, RelayPort};
use parking_lot::Mutex;

use crate::call::EditCall;
use crate::session::{ConnectionId, SessionDirectory};

/// State shared by every producer and target handle of one link.
pub(crate) struct LinkShared {
	pub(crate) port: RelayPort<EditCall>,
	pub(crate) sessions: SessionDirectory,
	pub(crate) read_timeout: Duration,
	/// Whether a field is bound. Held across generation bumps so a handle
	/// stamped with a new generation always enqueues after the bind that created it.
	bound: Mutex<bool>,
	next_connection: AtomicU64,
}

impl LinkShared {
	pub(crate) fn new(port: RelayPort<EditCall>, read_timeout: Duration) -> Self {
		Self {
			port,
			sessions: SessionDirectory::default(),
			read_timeout,
			bound: Mutex::new(false),
			next_connection: AtomicU64::new(0),
		}
	}

	/// Bumps the generation and enqueues the call built for it.
	///
	/// `bound` says whether a field is attached once the call applies.
	pub(crate) fn rebind(&self, bound: bool, call: impl FnOnce(Generation) -> EditCall) -> Result<Generation, RelayError> {
		let mut current = self.bound.lock();
		let generation = self.port.attachment().advance_generation();
		// Handles from before the bump are stale either way.
		*current = false;
		self.port.send(call(generation))?;
		*current = bound;
		Ok(generation)
	}

	/// Generation a new connection should be stamped with, if a field is bound.
	pub(crate) fn stamp(&self) -> Option<Generation> {
		let bound = self.bound.lock();
		bound.then(|| self.port.attachment().generation())
	}

	pub(crate) fn next_connection_id(&self) -> ConnectionId {
		ConnectionId::new(self.next_connection.fetch_add(1, Ordering::Relaxed).wrapping_add(1))
	}

	pub(crate) fn is_current(&self, generation: Generation) -> bool {
		self.port.is_open() && self.port.attachment().is_current(generation)
	}
}
