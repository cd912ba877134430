use std::sync::atomic::Ordering;
use std::time::Duration;

use edlink_relay::{AuthToken, Relay, RelayConfig, ShutdownMode};

use crate::common::{Call, Recorder};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_producer_order_survives_thread_interleaving() {
	const PRODUCERS: usize = 8;
	const PER_PRODUCER: usize = 1_000;

	let (recorder, observed) = Recorder::new();
	let config = RelayConfig {
		capacity: PRODUCERS * PER_PRODUCER,
		..RelayConfig::default()
	};
	let relay = Relay::spawn("ordering", &config, recorder);
	let token = AuthToken::generate();
	assert!(relay.attach_token(token));
	let port = relay.port(&token).unwrap();

	let threads: Vec<_> = (0..PRODUCERS)
		.map(|producer| {
			let port = port.clone();
			std::thread::spawn(move || {
				for idx in 0..PER_PRODUCER {
					port.send(Call::Tick { producer, idx }).unwrap();
				}
			})
		})
		.collect();
	for thread in threads {
		thread.join().unwrap();
	}

	let report = relay.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(10) }).await;
	assert!(report.completed());
	assert_eq!(report.dropped(), 0);

	let applied = observed.applied();
	assert_eq!(applied.len(), PRODUCERS * PER_PRODUCER);
	assert!(applied.windows(2).all(|w| w[0].0 < w[1].0), "delivery must follow sequence order");

	let mut next = [0usize; PRODUCERS];
	for (_, call) in applied {
		let Call::Tick { producer, idx } = call else {
			panic!("unexpected call {call:?}");
		};
		assert_eq!(idx, next[producer], "producer {producer} reordered");
		next[producer] += 1;
	}
	assert_eq!(observed.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn handler_invocations_never_overlap() {
	let (recorder, observed) = Recorder::new();
	let relay = Relay::spawn("single-writer", &RelayConfig::default(), recorder);
	let port = relay.owner_port();

	let producers: Vec<_> = (0..16)
		.map(|producer| {
			let port = port.clone();
			tokio::spawn(async move {
				for idx in 0..200 {
					while port.send(Call::Tick { producer, idx }).is_err() {
						tokio::task::yield_now().await;
					}
					if idx % 7 == 0 {
						tokio::task::yield_now().await;
					}
				}
			})
		})
		.collect();
	for producer in producers {
		producer.await.unwrap();
	}

	let report = relay.shutdown(ShutdownMode::Graceful { timeout: Duration::from_secs(10) }).await;
	assert!(report.completed());
	assert_eq!(observed.applied().len(), 16 * 200);
	assert_eq!(observed.max_in_flight.load(Ordering::SeqCst), 1);
}

#[test]
fn producers_without_a_runtime_are_served() {
	let (recorder, observed) = Recorder::new();
	let relay = Relay::spawn("no-runtime", &RelayConfig::default(), recorder);
	let port = relay.owner_port();

	for idx in 0..10 {
		assert_eq!(port.send(Call::Tick { producer: 0, idx }), Ok(idx as u64 + 1));
	}
	let deadline = std::time::Instant::now() + Duration::from_secs(5);
	while observed.applied().len() < 10 && std::time::Instant::now() < deadline {
		std::thread::sleep(Duration::from_millis(5));
	}
	assert_eq!(observed.applied().len(), 10);
}
