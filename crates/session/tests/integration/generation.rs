use std::time::Duration;

use edlink_primitives::TextFlags;
use edlink_session::{FieldInfo, Generation, HostEvent, RopeField};
use pretty_assertions::assert_eq;

use crate::common::{StallingField, before_cursor, linked};

#[tokio::test]
async fn rebinding_invalidates_handles_to_the_old_field() {
	let fx = linked();
	let first = RopeField::new("");
	let (session, old) = fx.bind_and_connect(first.clone(), 0);
	assert_eq!(old.generation(), Generation::new(1));
	assert!(old.commit_text("a", 1));

	let second = RopeField::new("");
	assert_eq!(fx.host.bind_field(second.clone(), FieldInfo::default()), Some(Generation::new(2)));

	assert!(!old.is_valid());
	assert!(!old.commit_text("stale", 1));
	assert_eq!(before_cursor(&old).await, None);

	let fresh = session.connection().unwrap();
	assert_eq!(fresh.generation(), Generation::new(2));
	assert!(fresh.commit_text("b", 1));
	assert_eq!(before_cursor(&fresh).await.as_deref(), Some("b"));

	assert_eq!(first.text(), "a");
	assert_eq!(second.text(), "b");
}

#[tokio::test]
async fn unbinding_leaves_no_connectable_field() {
	let mut fx = linked();
	let (session, conn) = fx.bind_and_connect(RopeField::new("x"), 1);

	assert!(fx.host.unbind_field());
	assert!(!conn.commit_text("y", 1));
	assert!(session.connection().is_none());
	fx.wait_for(|event| matches!(event, HostEvent::FieldUnbound { generation } if *generation == Generation::new(1)))
		.await;

	let field = RopeField::new("");
	fx.host.bind_field(field.clone(), FieldInfo::default()).unwrap();
	let conn = session.connection().unwrap();
	assert_eq!(conn.generation(), Generation::new(3));
	assert!(conn.commit_text("z", 1));
	assert_eq!(before_cursor(&conn).await.as_deref(), Some("z"));
}

#[tokio::test]
async fn no_connection_before_the_first_bind() {
	let fx = linked();
	let session = fx.client.create_session().unwrap();
	assert!(session.connection().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn in_flight_read_fails_after_rebind() {
	let fx = linked();
	let stalled = StallingField::new(RopeField::new("old"), Duration::from_millis(200));
	let (_session, conn) = fx.bind_and_connect(stalled, 3);

	let reader = {
		let conn = conn.clone();
		tokio::spawn(async move { conn.text_before_cursor(3, TextFlags::empty()).await })
	};
	tokio::time::sleep(Duration::from_millis(50)).await;
	fx.host.bind_field(RopeField::new("new"), FieldInfo::default()).unwrap();

	assert_eq!(reader.await.unwrap(), None);
}
