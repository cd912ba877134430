/// A call that can travel through the relay.
pub trait RelayCall: Send + 'static {
	/// Call type tag used in logs and fault reports.
	fn kind(&self) -> &'static str;
}

/// One relayed call with the sequence assigned at enqueue time.
#[derive(Debug)]
pub struct Message<C> {
	/// Monotonic enqueue sequence. Delivery order equals sequence order.
	pub sequence: u64,
	/// The call payload.
	pub call: C,
}

impl<C: RelayCall> Message<C> {
	/// Call type tag.
	pub fn kind(&self) -> &'static str {
		self.call.kind()
	}
}
