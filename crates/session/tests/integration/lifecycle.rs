use std::time::Duration;

use edlink_primitives::TextRange;
use edlink_session::{AuthToken, HostEvent, RelayError, RopeField, SelectionUpdate, SessionState};
use pretty_assertions::assert_eq;

use crate::common::{Linked, before_cursor, linked};

async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
	for _ in 0..200 {
		if cond() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	cond()
}

async fn next_selection_change(fx: &mut Linked) -> SelectionUpdate {
	match fx.wait_for(|event| matches!(event, HostEvent::SelectionChanged { .. })).await {
		HostEvent::SelectionChanged { update, .. } => update,
		_ => unreachable!(),
	}
}

#[tokio::test]
async fn second_token_is_ignored() {
	let fx = linked();
	let intruder = AuthToken::generate();
	assert!(!fx.link.attach_token(intruder));
	assert!(matches!(fx.link.client(&intruder), Err(RelayError::Unauthenticated)));
	assert!(fx.link.client(&fx.token).is_ok());
}

#[tokio::test]
async fn created_session_is_active_and_announced() {
	let mut fx = linked();
	let session = fx.client.create_session().unwrap();
	assert_eq!(session.state(), SessionState::Active);
	let id = session.id();
	assert_eq!(fx.wait_for(|event| matches!(event, HostEvent::SessionReady(_))).await, HostEvent::SessionReady(id));
}

#[tokio::test]
async fn revocation_is_terminal() {
	let mut fx = linked();
	let (session, conn) = fx.bind_and_connect(RopeField::new(""), 0);
	let id = session.id();

	assert!(fx.host.revoke_session(id));
	assert_eq!(session.state(), SessionState::Revoked);
	assert!(!conn.commit_text("x", 1));
	assert_eq!(before_cursor(&conn).await, None);
	assert_eq!(conn.cursor_caps_mode(!0).await, 0);
	assert!(session.connection().is_none());

	assert!(!fx.host.set_session_enabled(id, true));
	assert!(!fx.host.set_session_enabled(id, false));
	assert!(!fx.host.revoke_session(id));
	assert_eq!(session.state(), SessionState::Revoked);
	assert_eq!(fx.wait_for(|event| matches!(event, HostEvent::Revoked(_))).await, HostEvent::Revoked(id));
	assert_eq!(session.state(), SessionState::Revoked);
}

#[tokio::test]
async fn disabled_session_rejects_calls_until_enabled() {
	let fx = linked();
	let field = RopeField::new("");
	let (session, conn) = fx.bind_and_connect(field.clone(), 0);

	assert!(fx.host.set_session_enabled(session.id(), false));
	assert!(eventually(|| session.state() == SessionState::Disabled).await);
	assert!(!conn.commit_text("dropped", 1));
	assert!(session.connection().is_none());

	assert!(fx.host.set_session_enabled(session.id(), true));
	assert!(eventually(|| session.state() == SessionState::Active).await);
	assert!(conn.commit_text("kept", 1));
	assert_eq!(before_cursor(&conn).await.as_deref(), Some("kept"));
	assert_eq!(field.text(), "kept");
}

#[tokio::test]
async fn new_session_replaces_the_previous_one() {
	let mut fx = linked();
	let first = fx.client.create_session().unwrap();
	let second = fx.client.create_session().unwrap();

	assert_eq!(first.state(), SessionState::Revoked);
	assert_eq!(second.state(), SessionState::Active);
	assert!(!fx.host.revoke_session(first.id()));

	let first_id = first.id();
	assert_eq!(fx.wait_for(|event| matches!(event, HostEvent::Revoked(_))).await, HostEvent::Revoked(first_id));
}

#[tokio::test]
async fn interrupt_reaches_listener_in_order() {
	let mut fx = linked();
	let session = fx.client.create_session().unwrap();
	assert!(fx.host.interrupt());

	let id = session.id();
	assert_eq!(fx.wait_for(|_| true).await, HostEvent::SessionReady(id));
	assert_eq!(fx.wait_for(|_| true).await, HostEvent::Interrupted);
}

#[tokio::test]
async fn replacing_a_session_mid_composition_finishes_its_composing_text() {
	let mut fx = linked();
	let field = RopeField::new("abc");
	let (_first, old) = fx.bind_and_connect(field.clone(), 3);

	assert!(old.set_composing_text("xy", 1));
	assert_eq!(before_cursor(&old).await.as_deref(), Some("abcxy"));
	assert_eq!(next_selection_change(&mut fx).await.composing, Some(TextRange::new(3, 5)));

	let second = fx.client.create_session().unwrap();
	let conn = second.connection().unwrap();
	assert!(conn.commit_text("Z", 1));

	let released = next_selection_change(&mut fx).await;
	assert_eq!(released.new_selection, TextRange::point(5));
	assert_eq!(released.composing, None);
	let committed = next_selection_change(&mut fx).await;
	assert_eq!(committed.old_selection, TextRange::point(5));
	assert_eq!(committed.new_selection, TextRange::point(6));
	assert_eq!(committed.composing, None);
	assert_eq!(field.text(), "abcxyZ");
	assert_eq!(before_cursor(&conn).await.as_deref(), Some("abcxyZ"));
}

#[tokio::test]
async fn replacing_a_session_mid_batch_releases_its_notifications() {
	let mut fx = linked();
	let field = RopeField::new("");
	let (_first, old) = fx.bind_and_connect(field.clone(), 0);

	assert!(old.begin_batch_edit());
	assert!(old.commit_text("a", 1));
	assert_eq!(before_cursor(&old).await.as_deref(), Some("a"));

	let second = fx.client.create_session().unwrap();
	let conn = second.connection().unwrap();
	assert!(conn.commit_text("b", 1));

	let released = next_selection_change(&mut fx).await;
	assert_eq!(released.old_selection, TextRange::point(0));
	assert_eq!(released.new_selection, TextRange::point(1));
	let committed = next_selection_change(&mut fx).await;
	assert_eq!(committed.new_selection, TextRange::point(2));
	assert_eq!(field.text(), "ab");

	// The new connection never opened a batch of its own.
	assert!(!conn.end_batch_edit());
	assert!(conn.set_selection(0, 1));
	assert_eq!(next_selection_change(&mut fx).await.new_selection, TextRange::new(0, 1));
}

#[tokio::test]
async fn host_revocation_finishes_composing_before_the_next_session() {
	let mut fx = linked();
	let field = RopeField::new("abc");
	let (first, old) = fx.bind_and_connect(field.clone(), 3);

	assert!(old.begin_batch_edit());
	assert!(old.set_composing_text("xy", 1));
	assert_eq!(before_cursor(&old).await.as_deref(), Some("abcxy"));

	assert!(fx.host.revoke_session(first.id()));
	let released = next_selection_change(&mut fx).await;
	assert_eq!(released.old_selection, TextRange::point(3));
	assert_eq!(released.new_selection, TextRange::point(5));
	assert_eq!(released.composing, None);
	assert!(!old.is_valid());

	let second = fx.client.create_session().unwrap();
	let conn = second.connection().unwrap();
	assert!(conn.commit_text("Z", 1));
	assert_eq!(next_selection_change(&mut fx).await.new_selection, TextRange::point(6));
	assert_eq!(field.text(), "abcxyZ");
}
