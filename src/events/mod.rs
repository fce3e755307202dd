//! # Events Module
//!
//! The diagnostics sink every component reports through.
//!
//! ## Design
//! Components never reach for global state to report what they did. They
//! are handed an [`EventSender`] at construction and emit typed events; the
//! binary (or a test) decides whether anybody listens.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Organize(OrganizeEvent::Copied { destination, .. }) = event {
//!             println!("Filed {}", destination.display());
//!         }
//!     }
//! });
//!
//! let engine = OrganizeEngine::new(config, reader, sender);
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
