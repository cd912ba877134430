use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Shared join over the supervisor task.
///
/// The first caller takes the handle and awaits it; concurrent callers wait
/// for the done signal. A caller that times out puts the handle back so the
/// next caller can resume the join.
pub(crate) struct JoinCtrl {
	handle: Mutex<Option<JoinHandle<()>>>,
	done: watch::Sender<bool>,
}

impl JoinCtrl {
	pub(crate) fn new(handle: JoinHandle<()>) -> Self {
		let (done, _) = watch::channel(false);
		Self {
			handle: Mutex::new(Some(handle)),
			done,
		}
	}

	/// Joins the supervisor task, waiting as long as it takes.
	pub(crate) async fn join_forever(&self) {
		self.join(None).await;
	}

	/// Joins with a deadline. Returns `true` if completed, `false` if timed out.
	pub(crate) async fn join_with_timeout(&self, timeout: Duration) -> bool {
		self.join(Some(Instant::now() + timeout)).await
	}

	async fn join(&self, deadline: Option<Instant>) -> bool {
		let mut done_rx = self.done.subscribe();
		loop {
			if *done_rx.borrow_and_update() {
				return true;
			}

			let taken = self.handle.lock().take();
			if let Some(mut handle) = taken {
				let finished = match deadline {
					None => {
						let _ = (&mut handle).await;
						true
					}
					Some(deadline) => tokio::time::timeout_at(deadline, &mut handle).await.is_ok(),
				};
				if finished {
					self.done.send_replace(true);
					return true;
				}
				*self.handle.lock() = Some(handle);
				// Wake followers so one of them can take over the join.
				self.done.send_modify(|_| {});
				return false;
			}

			// Another caller is joining. The sender lives in `self`, so `changed` only
			// resolves on a signal.
			match deadline {
				None => {
					let _ = done_rx.changed().await;
				}
				Some(deadline) => {
					if tokio::time::timeout_at(deadline, done_rx.changed()).await.is_err() {
						return false;
					}
				}
			}
		}
	}
}
