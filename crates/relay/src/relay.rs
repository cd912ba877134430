use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use edlink_worker::{Mailbox, MailboxSendOutcome, MailboxSender, OverflowPolicy};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::attachment::Attachment;
use crate::consumer::{ConsumerParts, spawn_supervised};
use crate::error::{RelayError, Result};
use crate::event::{ConsumerExit, RelayEvent};
use crate::gate::AuthToken;
use crate::handler::{RelayContext, RelayHandler};
use crate::join_ctrl::JoinCtrl;
use crate::message::RelayCall;

const OVERFLOW_WARN_EVERY: u64 = 1024;

/// Relay sizing and overflow behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
	/// Maximum number of queued calls.
	pub capacity: usize,
	/// What to drop when the queue is full.
	pub overflow: OverflowPolicy,
	/// Broadcast capacity for [`RelayEvent`]s.
	pub event_buffer: usize,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			capacity: 1024,
			overflow: OverflowPolicy::DropNewest,
			event_buffer: 128,
		}
	}
}

/// How [`Relay::shutdown`] treats calls still queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
	/// Discard the queue and cancel the consumer.
	Immediate,
	/// Let the consumer drain the queue, cancelling after `timeout`.
	Graceful { timeout: Duration },
}

/// Outcome of [`Relay::shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownReport {
	completed: bool,
	dropped: usize,
	last_exit: Option<ConsumerExit>,
}

impl ShutdownReport {
	/// True if the consumer finished before shutdown returned.
	pub fn completed(&self) -> bool {
		self.completed
	}

	/// Calls discarded without being applied.
	pub fn dropped(&self) -> usize {
		self.dropped
	}

	pub fn last_exit(&self) -> Option<&ConsumerExit> {
		self.last_exit.as_ref()
	}
}

struct Ingress<C> {
	name: Arc<str>,
	attachment: Arc<Attachment>,
	tx: MailboxSender<C>,
	events: broadcast::Sender<RelayEvent>,
	drops: AtomicU64,
}

impl<C: RelayCall> Ingress<C> {
	fn push(&self, call: C) -> Result<u64> {
		if !self.attachment.is_valid() {
			return Err(RelayError::Detached);
		}
		let kind = call.kind();
		match self.tx.send(call) {
			Ok(MailboxSendOutcome::Enqueued(seq)) => {
				tracing::trace!(relay = %self.name, seq, kind, "relay.enqueue");
				Ok(seq)
			}
			Ok(MailboxSendOutcome::DroppedNewest) => {
				self.record_overflow(kind, None);
				Err(RelayError::Overflow {
					capacity: self.tx.capacity(),
				})
			}
			Ok(MailboxSendOutcome::ReplacedOldest { seq, evicted }) => {
				self.record_overflow(kind, Some(evicted));
				Ok(seq)
			}
			Err(_) => Err(RelayError::Detached),
		}
	}

	fn record_overflow(&self, kind: &'static str, evicted: Option<u64>) {
		let total_drops = self.drops.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
		let policy = self.tx.policy();
		if total_drops == 1 || total_drops.is_multiple_of(OVERFLOW_WARN_EVERY) {
			tracing::warn!(
				relay = %self.name,
				kind,
				policy = policy.as_str(),
				evicted = ?evicted,
				total_drops,
				"relay.overflow"
			);
		}
		let _ = self.events.send(RelayEvent::Overflow {
			policy,
			evicted,
			total_drops,
		});
	}
}

/// Producer-side entry point into a relay, bound to an authenticated caller.
pub struct RelayPort<C> {
	ingress: Arc<Ingress<C>>,
}

impl<C> Clone for RelayPort<C> {
	fn clone(&self) -> Self {
		Self {
			ingress: Arc::clone(&self.ingress),
		}
	}
}

impl<C: RelayCall> RelayPort<C> {
	/// Enqueues one call and returns its sequence.
	///
	/// Never waits. Fails fast once the attachment is invalid.
	pub fn send(&self, call: C) -> Result<u64> {
		self.ingress.push(call)
	}

	/// The attachment this port feeds.
	pub fn attachment(&self) -> &Arc<Attachment> {
		&self.ingress.attachment
	}

	/// Returns true while calls can still be accepted.
	pub fn is_open(&self) -> bool {
		self.ingress.attachment.is_valid() && !self.ingress.tx.is_closed()
	}
}

/// Ordered, single-consumer relay for one attachment.
///
/// Any number of threads may enqueue through [`RelayPort`]s. One consumer
/// task applies the calls in enqueue order, one at a time. Dropping the relay
/// cancels the consumer and discards the queue.
pub struct Relay<C: RelayCall> {
	ingress: Arc<Ingress<C>>,
	cancel: CancellationToken,
	join: JoinCtrl,
	last_exit: Arc<Mutex<Option<ConsumerExit>>>,
	torn_down: AtomicBool,
}

impl<C: RelayCall> Relay<C> {
	/// Creates a fresh attachment and spawns the consumer running `handler`.
	///
	/// Works from inside or outside a Tokio runtime.
	///
	/// # Panics
	///
	/// Panics if `config.capacity` is zero.
	pub fn spawn<H>(name: impl Into<String>, config: &RelayConfig, handler: H) -> Self
	where
		H: RelayHandler<Call = C>,
	{
		let name: Arc<str> = Arc::from(name.into());
		let attachment = Arc::new(Attachment::new());
		let mailbox = Mailbox::new(config.capacity, config.overflow);
		let tx = mailbox.sender();
		let (events, _) = broadcast::channel(config.event_buffer.max(1));
		let cancel = CancellationToken::new();
		let last_exit = Arc::new(Mutex::new(None));

		let supervisor = spawn_supervised(
			handler,
			ConsumerParts {
				ctx: RelayContext::new(Arc::clone(&name), Arc::clone(&attachment)),
				rx: mailbox.into_receiver(),
				tx: tx.clone(),
				events: events.clone(),
				cancel: cancel.clone(),
				last_exit: Arc::clone(&last_exit),
			},
		);
		tracing::debug!(relay = %name, capacity = config.capacity, policy = config.overflow.as_str(), "relay.spawn");

		Self {
			ingress: Arc::new(Ingress {
				name,
				attachment,
				tx,
				events,
				drops: AtomicU64::new(0),
			}),
			cancel,
			join: JoinCtrl::new(supervisor),
			last_exit,
			torn_down: AtomicBool::new(false),
		}
	}

	/// Relay name.
	pub fn name(&self) -> &str {
		&self.ingress.name
	}

	/// The attachment this relay serves.
	pub fn attachment(&self) -> &Arc<Attachment> {
		&self.ingress.attachment
	}

	/// Claims the attachment. See [`Attachment::attach_token`].
	pub fn attach_token(&self, token: AuthToken) -> bool {
		self.ingress.attachment.attach_token(token)
	}

	/// Returns a port for a caller presenting `token`.
	pub fn port(&self, token: &AuthToken) -> Result<RelayPort<C>> {
		self.ingress.attachment.authenticate(token)?;
		Ok(self.owner_port())
	}

	/// Returns a port for the target side, which owns the attachment and needs no token.
	pub fn owner_port(&self) -> RelayPort<C> {
		RelayPort {
			ingress: Arc::clone(&self.ingress),
		}
	}

	/// Enqueues one call from the target side.
	pub fn enqueue(&self, call: C) -> Result<u64> {
		self.ingress.push(call)
	}

	/// Subscribes to overflow, fault and teardown reports.
	pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
		self.ingress.events.subscribe()
	}

	/// Current queue depth.
	pub fn queued(&self) -> usize {
		self.ingress.tx.len()
	}

	/// Total calls dropped on overflow.
	pub fn overflow_drops(&self) -> u64 {
		self.ingress.drops.load(Ordering::Relaxed)
	}

	/// How the consumer exited, once it has.
	pub fn last_exit(&self) -> Option<ConsumerExit> {
		self.last_exit.lock().clone()
	}

	/// Tears the relay down.
	///
	/// The attachment is invalidated first, so every later enqueue fails fast
	/// whatever the mode. Calling this twice is harmless.
	pub async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		self.ingress.attachment.invalidate();
		let (completed, dropped) = match mode {
			ShutdownMode::Immediate => {
				let dropped = self.ingress.tx.close_and_clear();
				self.cancel.cancel();
				self.join.join_forever().await;
				(true, dropped)
			}
			ShutdownMode::Graceful { timeout } => {
				self.ingress.tx.close();
				let completed = self.join.join_with_timeout(timeout).await;
				let dropped = if completed {
					0
				} else {
					tracing::warn!(relay = %self.ingress.name, "relay.shutdown_timeout");
					let dropped = self.ingress.tx.close_and_clear();
					self.cancel.cancel();
					dropped
				};
				(completed, dropped)
			}
		};

		if !self.torn_down.swap(true, Ordering::AcqRel) {
			tracing::debug!(relay = %self.ingress.name, dropped, "relay.torn_down");
			let _ = self.ingress.events.send(RelayEvent::TornDown { dropped });
		}
		ShutdownReport {
			completed,
			dropped,
			last_exit: self.last_exit(),
		}
	}
}

impl<C: RelayCall> Drop for Relay<C> {
	fn drop(&mut self) {
		self.ingress.attachment.invalidate();
		self.ingress.tx.close_and_clear();
		self.cancel.cancel();
	}
}
