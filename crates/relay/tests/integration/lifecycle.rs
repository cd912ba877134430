use std::sync::atomic::Ordering;
use std::time::Duration;

use edlink_relay::{ConsumerExitKind, Relay, RelayConfig, RelayError, RelayEvent, ShutdownMode};
use pretty_assertions::assert_eq;

use crate::common::{Call, Recorder, eventually};

fn tick(idx: usize) -> Call {
	Call::Tick { producer: 0, idx }
}

#[tokio::test]
async fn immediate_shutdown_discards_queue_and_fails_fast() {
	let (recorder, observed, _gate) = Recorder::gated();
	let relay = Relay::spawn("teardown", &RelayConfig::default(), recorder);
	let mut events = relay.subscribe();
	let port = relay.owner_port();

	port.send(tick(0)).unwrap();
	assert!(eventually(|| relay.queued() == 0).await);
	for idx in 1..=5 {
		port.send(tick(idx)).unwrap();
	}

	let report = relay.shutdown(ShutdownMode::Immediate).await;
	assert!(report.completed());
	assert_eq!(report.dropped(), 5);
	assert_eq!(report.last_exit().map(|exit| exit.kind()), Some(ConsumerExitKind::Cancelled));
	assert_eq!(events.recv().await.unwrap(), RelayEvent::TornDown { dropped: 5 });

	assert!(!relay.attachment().is_valid());
	assert!(!port.is_open());
	assert_eq!(port.send(tick(6)), Err(RelayError::Detached));
	assert!(observed.applied().is_empty());
}

#[tokio::test]
async fn graceful_shutdown_drains_then_reports_once() {
	let (recorder, observed) = Recorder::new();
	let relay = Relay::spawn("drain", &RelayConfig::default(), recorder);
	let mut events = relay.subscribe();
	for idx in 0..50 {
		relay.enqueue(tick(idx)).unwrap();
	}

	let report = relay.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(5) }).await;
	assert!(report.completed());
	assert_eq!(report.last_exit().map(|exit| exit.kind()), Some(ConsumerExitKind::Drained));
	assert_eq!(observed.applied().len(), 50);
	assert_eq!(observed.stopped.load(Ordering::SeqCst), 1);

	let again = relay.shutdown(ShutdownMode::Immediate).await;
	assert_eq!(again.dropped(), 0);
	assert_eq!(events.recv().await.unwrap(), RelayEvent::TornDown { dropped: 0 });
	assert!(events.try_recv().is_err(), "teardown is reported once");
}

#[tokio::test]
async fn graceful_shutdown_times_out_on_stalled_consumer() {
	let (recorder, _observed, _gate) = Recorder::gated();
	let relay = Relay::spawn("stalled", &RelayConfig::default(), recorder);
	relay.enqueue(tick(0)).unwrap();
	assert!(eventually(|| relay.queued() == 0).await);
	relay.enqueue(tick(1)).unwrap();

	let report = relay.shutdown(ShutdownMode::Graceful { timeout: Duration::from_millis(20) }).await;
	assert!(!report.completed());
	assert_eq!(report.dropped(), 1);
}

#[tokio::test]
async fn handler_fault_invalidates_attachment() {
	let (recorder, observed) = Recorder::new();
	let relay = Relay::spawn("fault", &RelayConfig::default(), recorder);
	let mut events = relay.subscribe();

	relay.enqueue(tick(0)).unwrap();
	relay.enqueue(Call::Fail).unwrap();

	let RelayEvent::Faulted { exit } = events.recv().await.unwrap() else {
		panic!("expected a fault report");
	};
	assert_eq!(exit.kind(), ConsumerExitKind::HandlerFailed);
	assert_eq!(exit.message(), Some("fail: requested failure"));
	assert!(!relay.attachment().is_valid());
	assert_eq!(relay.enqueue(tick(1)), Err(RelayError::Detached));
	assert_eq!(observed.applied().len(), 1);
	assert_eq!(observed.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn handler_panic_is_classified_and_reported() {
	let (recorder, observed) = Recorder::new();
	let relay = Relay::spawn("panic", &RelayConfig::default(), recorder);
	let mut events = relay.subscribe();

	relay.enqueue(Call::Panic).unwrap();

	let RelayEvent::Faulted { exit } = events.recv().await.unwrap() else {
		panic!("expected a fault report");
	};
	assert_eq!(exit.kind(), ConsumerExitKind::Panicked);
	assert_eq!(exit.message(), Some("handler panic at seq 1"));
	assert!(exit.is_failure());
	assert_eq!(relay.enqueue(tick(0)), Err(RelayError::Detached));
	assert_eq!(observed.stopped.load(Ordering::SeqCst), 0);
}
