use tokio::task::JoinError;

/// Extracts the panic message from a join error, if the task panicked.
///
/// Returns `None` for cancelled tasks and for panics whose payload is not a string.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_owned());
	}
	payload.downcast_ref::<String>().cloned()
}
