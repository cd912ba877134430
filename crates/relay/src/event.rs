use edlink_worker::OverflowPolicy;

/// Exit classification for the consumer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConsumerExitKind {
	/// The queue was closed and fully drained.
	Drained,
	/// The relay was cancelled.
	Cancelled,
	/// `on_start` returned a fault.
	StartupFailed,
	/// `apply` returned a fault.
	HandlerFailed,
	/// The handler panicked.
	Panicked,
}

/// Exit summary for the consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerExit {
	kind: ConsumerExitKind,
	message: Option<String>,
}

impl ConsumerExit {
	pub(crate) fn new(kind: ConsumerExitKind, message: Option<String>) -> Self {
		Self { kind, message }
	}

	pub(crate) const fn drained() -> Self {
		Self {
			kind: ConsumerExitKind::Drained,
			message: None,
		}
	}

	pub(crate) const fn cancelled() -> Self {
		Self {
			kind: ConsumerExitKind::Cancelled,
			message: None,
		}
	}

	pub fn kind(&self) -> ConsumerExitKind {
		self.kind
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}

	/// Returns true for exits that terminate the attachment.
	pub fn is_failure(&self) -> bool {
		matches!(
			self.kind,
			ConsumerExitKind::StartupFailed | ConsumerExitKind::HandlerFailed | ConsumerExitKind::Panicked
		)
	}
}

/// Upward report from a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
	/// A call was dropped because the queue was full.
	Overflow {
		/// Policy that chose the victim.
		policy: OverflowPolicy,
		/// Sequence of the evicted call, `None` when the incoming call was rejected.
		evicted: Option<u64>,
		/// Drops since the relay started.
		total_drops: u64,
	},
	/// The consumer failed; the attachment is now invalid.
	Faulted {
		/// How the consumer exited.
		exit: ConsumerExit,
	},
	/// The relay was shut down.
	TornDown {
		/// Calls still queued at teardown and discarded.
		dropped: usize,
	},
}
