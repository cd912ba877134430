use std::collections::VecDeque;
use std::pin::pin;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

/// Overflow policy for a bounded mailbox.
///
/// Neither policy blocks the producer. Both preserve enqueue order for
/// everything that stays in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
	/// Reject the incoming message when full.
	#[default]
	DropNewest,
	/// Evict the oldest queued message to make room.
	DropOldest,
}

impl OverflowPolicy {
	/// Stable name used in logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::DropNewest => "drop_newest",
			Self::DropOldest => "drop_oldest",
		}
	}
}

/// A queued item stamped with its enqueue sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequenced<T> {
	/// Monotonic sequence assigned under the queue lock.
	pub seq: u64,
	/// The queued item.
	pub item: T,
}

/// Outcome from enqueueing a mailbox message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSendOutcome {
	/// Message was enqueued with this sequence.
	Enqueued(u64),
	/// Message was dropped because the queue was full under [`OverflowPolicy::DropNewest`].
	DroppedNewest,
	/// Message was enqueued with `seq` after evicting the message stamped `evicted`.
	ReplacedOldest {
		/// Sequence of the accepted message.
		seq: u64,
		/// Sequence of the evicted message.
		evicted: u64,
	},
}

/// Mailbox send error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MailboxSendError {
	/// Mailbox is closed.
	#[error("mailbox closed")]
	Closed,
}

struct MailboxState<T> {
	queue: VecDeque<Sequenced<T>>,
	next_seq: u64,
	closed: bool,
}

struct MailboxInner<T> {
	capacity: usize,
	policy: OverflowPolicy,
	state: Mutex<MailboxState<T>>,
	notify_recv: Notify,
}

/// Multi-producer mailbox sender.
///
/// Sending never waits: the queue lock is a short synchronous critical
/// section, so any thread can enqueue whether or not it runs inside a
/// Tokio runtime.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Single-consumer mailbox receiver.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Bounded, sequenced mailbox feeding exactly one receiver.
pub struct Mailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Mailbox<T> {
	/// Creates a bounded mailbox.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		Self {
			inner: Arc::new(MailboxInner {
				capacity,
				policy,
				state: Mutex::new(MailboxState {
					queue: VecDeque::with_capacity(capacity.min(1024)),
					next_seq: 1,
					closed: false,
				}),
				notify_recv: Notify::new(),
			}),
		}
	}

	/// Returns a sender handle.
	pub fn sender(&self) -> MailboxSender<T> {
		MailboxSender {
			inner: Arc::clone(&self.inner),
		}
	}

	/// Consumes the mailbox and returns its only receiver.
	pub fn into_receiver(self) -> MailboxReceiver<T> {
		MailboxReceiver { inner: self.inner }
	}

	/// Returns mailbox policy.
	pub fn policy(&self) -> OverflowPolicy {
		self.inner.policy
	}
}

impl<T> MailboxSender<T> {
	/// Enqueues one message honoring the overflow policy.
	pub fn send(&self, msg: T) -> Result<MailboxSendOutcome, MailboxSendError> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(MailboxSendError::Closed);
		}

		let outcome = if state.queue.len() < self.inner.capacity {
			let seq = push(&mut state, msg);
			MailboxSendOutcome::Enqueued(seq)
		} else {
			match self.inner.policy {
				OverflowPolicy::DropNewest => return Ok(MailboxSendOutcome::DroppedNewest),
				OverflowPolicy::DropOldest => {
					// Capacity is non-zero, so a full queue always has a head.
					let evicted = state.queue.pop_front().map_or(0, |head| head.seq);
					let seq = push(&mut state, msg);
					MailboxSendOutcome::ReplacedOldest { seq, evicted }
				}
			}
		};
		drop(state);
		self.inner.notify_recv.notify_one();
		Ok(outcome)
	}

	/// Closes the mailbox. The receiver drains queued items, then returns `None`.
	pub fn close(&self) {
		self.inner.state.lock().closed = true;
		self.inner.notify_recv.notify_waiters();
	}

	/// Closes the mailbox and discards everything still queued.
	///
	/// Returns the number of discarded messages.
	pub fn close_and_clear(&self) -> usize {
		let dropped = {
			let mut state = self.inner.state.lock();
			state.closed = true;
			std::mem::take(&mut state.queue)
		};
		self.inner.notify_recv.notify_waiters();
		// Items are dropped outside the lock; their destructors may wake other tasks.
		dropped.len()
	}

	/// Returns true once the mailbox is closed.
	pub fn is_closed(&self) -> bool {
		self.inner.state.lock().closed
	}

	/// Returns current queue length.
	pub fn len(&self) -> usize {
		self.inner.state.lock().queue.len()
	}

	/// Returns true if nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns queue capacity.
	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	/// Returns the overflow policy.
	pub fn policy(&self) -> OverflowPolicy {
		self.inner.policy
	}
}

impl<T> MailboxReceiver<T> {
	/// Receives the next message in sequence order.
	///
	/// Returns `None` once the mailbox is closed and drained.
	pub async fn recv(&self) -> Option<Sequenced<T>> {
		loop {
			// Register interest before inspecting the queue so a `close()`
			// between the check and the await cannot be missed.
			let mut notified = pin!(self.inner.notify_recv.notified());
			notified.as_mut().enable();

			{
				let mut state = self.inner.state.lock();
				if let Some(msg) = state.queue.pop_front() {
					return Some(msg);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}

	/// Receives one message without waiting.
	pub fn try_recv(&self) -> Option<Sequenced<T>> {
		self.inner.state.lock().queue.pop_front()
	}

	/// Returns current queue length.
	pub fn len(&self) -> usize {
		self.inner.state.lock().queue.len()
	}

	/// Returns true if nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn push<T>(state: &mut MailboxState<T>, item: T) -> u64 {
	let seq = state.next_seq;
	state.next_seq = state.next_seq.wrapping_add(1);
	state.queue.push_back(Sequenced { seq, item });
	seq
}
