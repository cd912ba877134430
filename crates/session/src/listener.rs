use edlink_primitives::ExtractedText;
use edlink_relay::Generation;
use tokio::sync::broadcast;

use crate::field::FieldInfo;
use crate::protocol::SelectionUpdate;
use crate::session::SessionId;

/// Lifecycle and state notifications from the edit host.
///
/// Every callback runs on the relay consumer, in the same order as the
/// calls that caused it. Implementations must not block.
pub trait HostListener: Send + 'static {
	/// A producer created a session and it is ready for calls.
	fn on_session_ready(&mut self, _session: SessionId) {}

	/// A session was revoked. No further calls against it succeed.
	fn on_revoked(&mut self, _session: SessionId) {}

	/// The target asked the producer to abandon whatever it is doing.
	fn on_interrupt(&mut self) {}

	fn on_field_bound(&mut self, _generation: Generation, _info: &FieldInfo) {}

	fn on_field_unbound(&mut self, _generation: Generation) {}

	/// Selection or composing region changed; coalesced across batch edits.
	fn on_selection_changed(&mut self, _generation: Generation, _update: SelectionUpdate) {}

	/// A monitored extracted text request has a new snapshot.
	fn on_extracted_text_changed(&mut self, _generation: Generation, _token: i32, _text: &ExtractedText) {}
}

/// Listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpListener;

impl HostListener for NoOpListener {}

/// Host notification as a value, for [`BroadcastListener`] subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
	SessionReady(SessionId),
	Revoked(SessionId),
	Interrupted,
	FieldBound { generation: Generation, info: FieldInfo },
	FieldUnbound { generation: Generation },
	SelectionChanged { generation: Generation, update: SelectionUpdate },
	ExtractedTextChanged { generation: Generation, token: i32, text: ExtractedText },
}

/// Listener that republishes every notification on a broadcast channel.
///
/// Lagging subscribers lose events; the host never waits for them.
#[derive(Debug, Clone)]
pub struct BroadcastListener {
	tx: broadcast::Sender<HostEvent>,
}

impl BroadcastListener {
	pub fn new(capacity: usize) -> Self {
		let (tx, _) = broadcast::channel(capacity.max(1));
		Self { tx }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
		self.tx.subscribe()
	}

	fn emit(&self, event: HostEvent) {
		let _ = self.tx.send(event);
	}
}

impl HostListener for BroadcastListener {
	fn on_session_ready(&mut self, session: SessionId) {
		self.emit(HostEvent::SessionReady(session));
	}

	fn on_revoked(&mut self, session: SessionId) {
		self.emit(HostEvent::Revoked(session));
	}

	fn on_interrupt(&mut self) {
		self.emit(HostEvent::Interrupted);
	}

	fn on_field_bound(&mut self, generation: Generation, info: &FieldInfo) {
		self.emit(HostEvent::FieldBound {
			generation,
			info: info.clone(),
		});
	}

	fn on_field_unbound(&mut self, generation: Generation) {
		self.emit(HostEvent::FieldUnbound { generation });
	}

	fn on_selection_changed(&mut self, generation: Generation, update: SelectionUpdate) {
		self.emit(HostEvent::SelectionChanged { generation, update });
	}

	fn on_extracted_text_changed(&mut self, generation: Generation, token: i32, text: &ExtractedText) {
		self.emit(HostEvent::ExtractedTextChanged {
			generation,
			token,
			text: text.clone(),
		});
	}
}
