/// Errors returned by relay ingress operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
	/// The caller's token does not match the one claimed for the attachment.
	#[error("caller is not authenticated for this attachment")]
	Unauthenticated,
	/// The attachment was invalidated by teardown or a consumer fault.
	#[error("attachment is no longer valid")]
	Detached,
	/// The queue was full and the call was rejected.
	#[error("relay queue full (capacity {capacity})")]
	Overflow {
		/// Configured queue depth.
		capacity: usize,
	},
}

/// Result alias for relay operations.
pub type Result<T, E = RelayError> = std::result::Result<T, E>;
