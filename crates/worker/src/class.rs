/// Execution classes for tasks spawned by the link, used as a tracing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The single task that applies relayed calls in order.
	Consumer,
	/// The task that owns a consumer, classifies its exit and reports faults.
	Supervisor,
}

impl TaskClass {
	/// Stable name used in logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Consumer => "consumer",
			Self::Supervisor => "supervisor",
		}
	}
}
