use edlink_primitives::{
	ContextMenuAction, EditorAction, ExtractFlags, ExtractedTextRequest, KeyEvent, PrivateCommand, TextFlags, TextRange,
};
use edlink_session::{FieldEffect, HostEvent, RopeField, SelectionUpdate};
use pretty_assertions::assert_eq;

use crate::common::{Linked, before_cursor, linked};

fn drain_selection_changes(fx: &mut Linked) -> Vec<SelectionUpdate> {
	let mut updates = Vec::new();
	while let Ok(event) = fx.events.try_recv() {
		if let HostEvent::SelectionChanged { update, .. } = event {
			updates.push(update);
		}
	}
	updates
}

#[tokio::test]
async fn batched_typing_reports_selection_once() {
	let mut fx = linked();
	let field = RopeField::new("");
	let (_session, conn) = fx.bind_and_connect(field.clone(), 0);

	assert!(conn.begin_batch_edit());
	assert!(conn.commit_text("he", 1));
	assert!(conn.set_composing_text("llo", 1));
	assert!(conn.finish_composing_text());
	assert!(conn.end_batch_edit());
	assert_eq!(before_cursor(&conn).await.as_deref(), Some("hello"));

	assert_eq!(field.text(), "hello");
	assert_eq!(
		drain_selection_changes(&mut fx),
		vec![SelectionUpdate {
			old_selection: TextRange::point(0),
			new_selection: TextRange::point(5),
			composing: None,
		}]
	);
}

#[tokio::test]
async fn unbalanced_end_batch_sends_nothing() {
	let mut fx = linked();
	let (_session, conn) = fx.bind_and_connect(RopeField::new("abc"), 3);

	assert!(!conn.end_batch_edit());
	assert!(conn.begin_batch_edit());
	assert!(conn.end_batch_edit());
	assert!(!conn.end_batch_edit());

	assert!(conn.commit_text("d", 1));
	assert_eq!(before_cursor(&conn).await.as_deref(), Some("abcd"));
	assert_eq!(drain_selection_changes(&mut fx).len(), 1);
}

#[tokio::test]
async fn cursor_placement_and_deletion() {
	let fx = linked();
	let field = RopeField::new("hello world");
	let (_session, conn) = fx.bind_and_connect(field.clone(), 5);

	assert!(conn.commit_text(",", 0));
	assert_eq!(before_cursor(&conn).await.as_deref(), Some("hello"));
	assert!(conn.set_selection(12, 12));
	assert!(conn.delete_surrounding_text(6, 0));
	assert_eq!(field.text(), "hello,");

	assert!(conn.set_selection(1_000, 1_000));
	assert!(conn.set_selection(0, 5));
	assert_eq!(conn.selected_text(TextFlags::empty()).await.unwrap().text, "hello");
	let around = conn.surrounding_text(0, 1, TextFlags::empty()).await.unwrap();
	assert_eq!(around.text.text, "hello,");
	assert_eq!(around.selection, TextRange::new(0, 5));
	assert_eq!(around.offset, 0);
}

#[tokio::test]
async fn monitored_extraction_follows_edits() {
	let mut fx = linked();
	let (_session, conn) = fx.bind_and_connect(RopeField::new("ab"), 2);

	let request = ExtractedTextRequest {
		token: 7,
		..ExtractedTextRequest::default()
	};
	let snapshot = conn.extracted_text(request, ExtractFlags::MONITOR).await.unwrap();
	assert_eq!(snapshot.text, "ab");
	assert_eq!(snapshot.selection, TextRange::point(2));

	assert!(conn.commit_text("c", 1));
	let event = fx.wait_for(|event| matches!(event, HostEvent::ExtractedTextChanged { .. })).await;
	let HostEvent::ExtractedTextChanged { token, text, .. } = event else {
		unreachable!();
	};
	assert_eq!(token, 7);
	assert_eq!(text.text, "abc");
	assert_eq!(text.start_offset, 0);
	assert_eq!(text.selection, TextRange::point(3));
}

#[tokio::test]
async fn close_finishes_composing_and_invalidates() {
	let mut fx = linked();
	let field = RopeField::new("");
	let (session, conn) = fx.bind_and_connect(field.clone(), 0);

	assert!(conn.begin_batch_edit());
	assert!(conn.set_composing_text("wor", 1));
	assert!(conn.close());
	assert!(!conn.is_valid());
	assert!(!conn.close());
	assert!(!conn.commit_text("x", 1));
	assert!(!conn.end_batch_edit());

	let update = fx.wait_for(|event| matches!(event, HostEvent::SelectionChanged { .. })).await;
	let HostEvent::SelectionChanged { update, .. } = update else {
		unreachable!();
	};
	assert_eq!(update.new_selection, TextRange::point(3));
	assert_eq!(update.composing, None);
	assert_eq!(field.text(), "wor");

	// The field stays bound; a fresh connection works.
	let fresh = session.connection().unwrap();
	assert_eq!(before_cursor(&fresh).await.as_deref(), Some("wor"));
}

#[tokio::test]
async fn opaque_actions_reach_the_field_in_order() {
	let fx = linked();
	let field = RopeField::new("");
	let (_session, conn) = fx.bind_and_connect(field.clone(), 0);
	let command = PrivateCommand::new("org.edlink.ping").with("n", "1");

	assert!(conn.perform_editor_action(EditorAction::Done));
	assert!(conn.send_key_event(KeyEvent::down(66)));
	assert!(conn.report_fullscreen_mode(true));
	assert!(conn.perform_private_command(command.clone()));
	before_cursor(&conn).await.unwrap();

	assert_eq!(
		field.effects(),
		vec![
			FieldEffect::EditorAction(EditorAction::Done),
			FieldEffect::Key(KeyEvent::down(66)),
			FieldEffect::Fullscreen(true),
			FieldEffect::PrivateCommand(command),
		]
	);
}

#[tokio::test]
async fn clipboard_actions_edit_the_field() {
	let fx = linked();
	let field = RopeField::new("cut me");
	let (_session, conn) = fx.bind_and_connect(field.clone(), 0);

	assert!(conn.set_selection(0, 4));
	assert!(conn.perform_context_menu_action(ContextMenuAction::Cut));
	assert!(conn.perform_context_menu_action(ContextMenuAction::SelectAll));
	assert!(conn.perform_context_menu_action(ContextMenuAction::Paste));
	before_cursor(&conn).await.unwrap();

	assert_eq!(field.clipboard_text().as_deref(), Some("cut "));
	assert_eq!(field.text(), "cut ");
}

#[tokio::test]
async fn caps_mode_is_masked_by_request() {
	let fx = linked();
	let (_session, conn) = fx.bind_and_connect(RopeField::new("").with_caps_mode(0x3000), 0);
	assert_eq!(conn.cursor_caps_mode(0x1000).await, 0x1000);
	assert_eq!(conn.cursor_caps_mode(0x4000).await, 0);
}

#[tokio::test]
async fn second_connection_takes_over_an_open_batch() {
	let mut fx = linked();
	let field = RopeField::new("");
	let (session, first) = fx.bind_and_connect(field.clone(), 0);
	let second = session.connection().unwrap();
	assert_ne!(first.id(), second.id());
	assert_eq!(first.clone().id(), first.id());

	assert!(first.begin_batch_edit());
	assert!(first.set_composing_text("x", 1));
	assert!(second.commit_text("y", 1));
	assert_eq!(before_cursor(&second).await.as_deref(), Some("xy"));

	assert_eq!(field.text(), "xy");
	assert_eq!(
		drain_selection_changes(&mut fx),
		vec![
			SelectionUpdate {
				old_selection: TextRange::point(0),
				new_selection: TextRange::point(1),
				composing: None,
			},
			SelectionUpdate {
				old_selection: TextRange::point(1),
				new_selection: TextRange::point(2),
				composing: None,
			},
		]
	);

	// The first connection's close no longer touches state it lost.
	assert!(second.set_composing_text("z", 1));
	assert!(first.close());
	assert!(second.finish_composing_text());
	assert_eq!(before_cursor(&second).await.as_deref(), Some("xyz"));
	let updates = drain_selection_changes(&mut fx);
	assert_eq!(updates.len(), 2);
	assert_eq!(updates[0].composing, Some(TextRange::new(2, 3)));
	assert_eq!(updates[1].composing, None);
}

#[tokio::test]
async fn dropping_a_connection_collapses_its_batch() {
	let mut fx = linked();
	let field = RopeField::new("");
	let (session, conn) = fx.bind_and_connect(field.clone(), 0);

	assert!(conn.begin_batch_edit());
	assert!(conn.begin_batch_edit());
	assert!(conn.commit_text("q", 1));
	let clone = conn.clone();
	drop(conn);
	assert!(clone.is_valid());
	drop(clone);

	let update = fx.wait_for(|event| matches!(event, HostEvent::SelectionChanged { .. })).await;
	let HostEvent::SelectionChanged { update, .. } = update else {
		unreachable!();
	};
	assert_eq!(update.new_selection, TextRange::point(1));
	assert_eq!(field.text(), "q");

	let fresh = session.connection().unwrap();
	assert!(fresh.set_selection(0, 1));
	assert_eq!(before_cursor(&fresh).await.as_deref(), Some(""));
	assert_eq!(
		drain_selection_changes(&mut fx),
		vec![SelectionUpdate {
			old_selection: TextRange::point(1),
			new_selection: TextRange::new(0, 1),
			composing: None,
		}]
	);
}
