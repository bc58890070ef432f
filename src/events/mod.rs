//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The core engine emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and surface per-page QC outcomes.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             QcEvent::Analysis(AnalysisEvent::IssuesFound { reference, issues }) => {
//!                 println!("{reference}: {issues:?}")
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run analyses with the sender
//! engine.analyze_with_events(reference, &session, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
