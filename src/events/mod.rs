//! # Events Module
//!
//! Event-driven progress reporting for long-running scans.
//!
//! ## Design
//! The engine emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. Nothing in the
//! engine blocks on a listener: if the receiver is gone, events are
//! dropped.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Analysis(AnalysisEvent::Progress(p)) = event {
//!             println!("Analysed {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! let session = ScanSession::builder().build();
//! let result = session.run_records(&records, EuclideanMetric, &sender, &CancellationToken::new());
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
