use std::sync::Arc;

use edlink_worker::{MailboxReceiver, MailboxSender, TaskClass, join_error_panic_message};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::event::{ConsumerExit, ConsumerExitKind, RelayEvent};
use crate::handler::{RelayContext, RelayHandler};
use crate::message::{Message, RelayCall};

/// Everything the supervisor needs besides the handler.
pub(crate) struct ConsumerParts<C> {
	pub(crate) ctx: RelayContext,
	pub(crate) rx: MailboxReceiver<C>,
	pub(crate) tx: MailboxSender<C>,
	pub(crate) events: broadcast::Sender<RelayEvent>,
	pub(crate) cancel: CancellationToken,
	pub(crate) last_exit: Arc<Mutex<Option<ConsumerExit>>>,
}

/// Spawns the supervisor, which runs the consumer as a child task and
/// classifies how it ended.
///
/// A failed consumer is never restarted: the attachment is invalidated, the
/// queue is discarded and [`RelayEvent::Faulted`] is published.
pub(crate) fn spawn_supervised<H>(handler: H, parts: ConsumerParts<H::Call>) -> JoinHandle<()>
where
	H: RelayHandler,
{
	let ConsumerParts {
		ctx,
		rx,
		tx,
		events,
		cancel,
		last_exit,
	} = parts;

	edlink_worker::spawn(TaskClass::Supervisor, async move {
		let child = edlink_worker::spawn(TaskClass::Consumer, run_consumer(handler, rx, ctx.clone(), cancel.child_token()));
		let exit = match child.await {
			Ok(exit) => exit,
			Err(err) if err.is_cancelled() => ConsumerExit::cancelled(),
			Err(err) => ConsumerExit::new(ConsumerExitKind::Panicked, join_error_panic_message(err)),
		};
		*last_exit.lock() = Some(exit.clone());

		tracing::debug!(relay = %ctx.name(), kind = ?exit.kind(), message = ?exit.message(), "relay.consumer.exit");

		if exit.is_failure() {
			ctx.attachment().invalidate();
			let dropped = tx.close_and_clear();
			tracing::error!(
				relay = %ctx.name(),
				kind = ?exit.kind(),
				message = ?exit.message(),
				dropped,
				"relay.consumer.fault"
			);
			let _ = events.send(RelayEvent::Faulted { exit });
		}
	})
}

async fn run_consumer<H>(mut handler: H, rx: MailboxReceiver<H::Call>, ctx: RelayContext, cancel: CancellationToken) -> ConsumerExit
where
	H: RelayHandler,
{
	let started = tokio::select! {
		biased;
		_ = cancel.cancelled() => return ConsumerExit::cancelled(),
		res = handler.on_start(&ctx) => res,
	};
	if let Err(fault) = started {
		return ConsumerExit::new(ConsumerExitKind::StartupFailed, Some(fault.to_string()));
	}

	let exit = loop {
		let next = tokio::select! {
			biased;
			_ = cancel.cancelled() => break ConsumerExit::cancelled(),
			next = rx.recv() => next,
		};
		let Some(queued) = next else {
			break ConsumerExit::drained();
		};

		let message = Message {
			sequence: queued.seq,
			call: queued.item,
		};
		let kind = message.call.kind();
		tracing::trace!(relay = %ctx.name(), seq = message.sequence, kind, "relay.apply");

		let applied = tokio::select! {
			biased;
			_ = cancel.cancelled() => break ConsumerExit::cancelled(),
			res = handler.apply(message, &ctx) => res,
		};
		if let Err(fault) = applied {
			break ConsumerExit::new(ConsumerExitKind::HandlerFailed, Some(fault.to_string()));
		}
	};

	handler.on_stop(&ctx).await;
	exit
}
