//! Edit link demo.
//!
//! Binds an in-memory field, then plays a short typing script through a
//! producer connection the way an input method would: composition, commit,
//! a batched correction and a monitored snapshot.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use edlink_primitives::{EditorAction, ExtractFlags, ExtractedText, ExtractedTextRequest, TextFlags};
use edlink_session::{
	AuthToken, EditLink, EdlinkConfig, FieldInfo, Generation, HostListener, RopeField, SelectionUpdate, SessionId, ShutdownMode,
};
use tracing::info;

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "edlink-demo")]
#[command(about = "Play a scripted typing session into an in-memory field")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	/// Initial field content; the cursor starts at its end
	#[arg(short, long, default_value = "")]
	text: String,
}

/// Logs host notifications.
struct LogListener;

impl HostListener for LogListener {
	fn on_session_ready(&mut self, session: SessionId) {
		info!(session = %session, "session ready");
	}

	fn on_revoked(&mut self, session: SessionId) {
		info!(session = %session, "session revoked");
	}

	fn on_field_bound(&mut self, generation: Generation, info: &FieldInfo) {
		info!(generation = %generation, selection = %info.initial_selection, "field bound");
	}

	fn on_selection_changed(&mut self, generation: Generation, update: SelectionUpdate) {
		info!(
			generation = %generation,
			old = %update.old_selection,
			new = %update.new_selection,
			composing = ?update.composing,
			"selection changed"
		);
	}

	fn on_extracted_text_changed(&mut self, _generation: Generation, token: i32, text: &ExtractedText) {
		info!(token, text = %text.text, "extracted text changed");
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => EdlinkConfig::load(path)?,
		None => EdlinkConfig::default(),
	};
	config.validate()?;

	let link = EditLink::spawn(&config, LogListener);
	let token = AuthToken::generate();
	link.attach_token(token);
	let client = link.client(&token)?;

	let field = RopeField::new(&args.text);
	let info = FieldInfo {
		action: Some(EditorAction::Done),
		label: Some("demo".into()),
		..FieldInfo::with_cursor(args.text.chars().count())
	};
	link.host().bind_field(field.clone(), info).ok_or("field bind was rejected")?;

	let session = client.create_session().ok_or("session could not be created")?;
	let conn = session.connection().ok_or("no field bound")?;

	let request = ExtractedTextRequest {
		token: 1,
		..ExtractedTextRequest::default()
	};
	conn.extracted_text(request, ExtractFlags::MONITOR).await;

	for partial in ["h", "he", "hel", "helo"] {
		conn.set_composing_text(partial, 1);
	}
	conn.commit_text("helo", 1);

	// Correct the typo as one batch so the host reports a single update.
	conn.begin_batch_edit();
	conn.delete_surrounding_text(4, 0);
	conn.commit_text("hello", 1);
	conn.end_batch_edit();
	conn.commit_text(" world", 1);
	conn.perform_editor_action(EditorAction::Done);

	let before = conn.text_before_cursor(usize::MAX, TextFlags::empty()).await;
	info!(before = ?before.map(|text| text.text), "text before cursor");
	conn.close();

	let report = link
		.shutdown(ShutdownMode::Graceful {
			timeout: Duration::from_secs(1),
		})
		.await;
	info!(completed = report.completed(), dropped = report.dropped(), "link closed");

	println!("{}", field.text());
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("edlink_session=trace,edlink_relay=trace,edlink_worker=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
