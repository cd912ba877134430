use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

const FALLBACK_THREAD_NAME: &str = "edlink-relay-fallback";

/// Runtime for relays spawned from threads that are not inside one.
///
/// A producer process may not run Tokio at all, yet every relay still needs a
/// consumer and a supervisor task. Both only await the mailbox and their
/// handler, so the runtime enables timers and nothing else.
fn fallback_runtime() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		Builder::new_multi_thread()
			.enable_time()
			.worker_threads(2)
			.thread_name(FALLBACK_THREAD_NAME)
			.build()
			.expect("failed to build edlink relay fallback runtime")
	})
}

/// Returns the ambient runtime handle, or the fallback runtime's handle off-runtime.
pub fn runtime_handle() -> Handle {
	Handle::try_current().unwrap_or_else(|_| fallback_runtime().handle().clone())
}

/// Spawns an async task tagged with its execution class.
///
/// Tasks land on the caller's runtime when there is one, so a relay created
/// inside an application shares its executor.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let (handle, fallback) = match Handle::try_current() {
		Ok(handle) => (handle, false),
		Err(_) => (fallback_runtime().handle().clone(), true),
	};
	tracing::trace!(task_class = class.as_str(), fallback, "worker.spawn");
	handle.spawn(fut)
}
