//! Ordered call relay.
//!
//! Producers on any thread claim an [`Attachment`] with a one-shot
//! [`AuthToken`], then enqueue calls through a [`RelayPort`]. A single
//! consumer task applies them through a [`RelayHandler`] strictly in enqueue
//! order, one at a time.
//!
//! ```text
//! producer threads ─┐
//! producer threads ─┼─▶ RelayPort::send ─▶ bounded mailbox ─▶ consumer ─▶ RelayHandler::apply
//! owner (target)   ─┘        (never blocks)     (seq order)   (one task)
//! ```
//!
//! A consumer that faults or panics invalidates the attachment. Later sends
//! fail with [`RelayError::Detached`] and [`RelayEvent::Faulted`] is published.

mod attachment;
mod consumer;
mod error;
mod event;
mod gate;
mod handler;
mod join_ctrl;
mod message;
mod relay;

pub use attachment::Attachment;
pub use edlink_worker::{Generation, OverflowPolicy};
pub use error::{RelayError, Result};
pub use event::{ConsumerExit, ConsumerExitKind, RelayEvent};
pub use gate::{AuthToken, TokenGate};
pub use handler::{HandlerFault, RelayContext, RelayHandler};
pub use message::{Message, RelayCall};
pub use relay::{Relay, RelayConfig, RelayPort, ShutdownMode, ShutdownReport};
