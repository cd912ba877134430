//! Worker primitives shared by the relay: a sequenced bounded mailbox,
//! generation stamps, task classes and runtime-aware spawning.

mod class;
/// Sequenced multi-producer, single-consumer mailbox.
pub mod mailbox;
mod panic;
mod spawn;
mod token;

pub use class::TaskClass;
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSendOutcome, MailboxSender, OverflowPolicy, Sequenced};
pub use panic::join_error_panic_message;
pub use spawn::{runtime_handle, spawn};
pub use token::{Generation, GenerationClock};
