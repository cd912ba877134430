//! Shared handlers for relay integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use edlink_relay::{HandlerFault, Message, RelayCall, RelayContext, RelayHandler};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// A test call tagged with its producer and per-producer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
	Tick { producer: usize, idx: usize },
	Fail,
	Panic,
}

impl RelayCall for Call {
	fn kind(&self) -> &'static str {
		match self {
			Self::Tick { .. } => "tick",
			Self::Fail => "fail",
			Self::Panic => "panic",
		}
	}
}

/// What the recording handler observed.
#[derive(Default)]
pub struct Observed {
	pub applied: Mutex<Vec<(u64, Call)>>,
	pub in_flight: AtomicUsize,
	pub max_in_flight: AtomicUsize,
	pub stopped: AtomicUsize,
}

impl Observed {
	pub fn applied(&self) -> Vec<(u64, Call)> {
		self.applied.lock().clone()
	}
}

/// Records every applied call; optionally waits for a permit before each one.
pub struct Recorder {
	pub observed: Arc<Observed>,
	pub gate: Option<Arc<Semaphore>>,
}

impl Recorder {
	pub fn new() -> (Self, Arc<Observed>) {
		let observed = Arc::new(Observed::default());
		(
			Self {
				observed: Arc::clone(&observed),
				gate: None,
			},
			observed,
		)
	}

	/// A recorder that applies one call per permit added to the returned semaphore.
	pub fn gated() -> (Self, Arc<Observed>, Arc<Semaphore>) {
		let (mut recorder, observed) = Self::new();
		let gate = Arc::new(Semaphore::new(0));
		recorder.gate = Some(Arc::clone(&gate));
		(recorder, observed, gate)
	}
}

#[async_trait]
impl RelayHandler for Recorder {
	type Call = Call;

	async fn apply(&mut self, message: Message<Call>, _ctx: &RelayContext) -> Result<(), HandlerFault> {
		let now = self.observed.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.observed.max_in_flight.fetch_max(now, Ordering::SeqCst);

		if let Some(gate) = &self.gate
			&& let Ok(permit) = gate.acquire().await
		{
			permit.forget();
		}
		// Give any overlapping invocation a chance to show up.
		tokio::task::yield_now().await;

		self.observed.in_flight.fetch_sub(1, Ordering::SeqCst);
		match message.call {
			Call::Fail => return Err(HandlerFault::new(message.kind(), "requested failure")),
			Call::Panic => panic!("handler panic at seq {}", message.sequence),
			Call::Tick { .. } => {}
		}
		self.observed.applied.lock().push((message.sequence, message.call));
		Ok(())
	}

	async fn on_stop(&mut self, _ctx: &RelayContext) {
		self.observed.stopped.fetch_add(1, Ordering::SeqCst);
	}
}

/// Polls `cond` until it holds or a second passes.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
	for _ in 0..200 {
		if cond() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	cond()
}
