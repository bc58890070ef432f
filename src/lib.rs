//! # Scan QC
//!
//! A client-side quality control engine for scanned document pages.
//!
//! ## Core Philosophy
//! - **Catch bad pages at the scanner** - flag defects before the operator moves on
//! - **Never fake a pass** - a failed analysis is an error, not a clean result
//! - **Show the numbers** - every flag comes with the metric that triggered it
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and support layers:
//! - `core` - The page analysis engine
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Caller-facing error types
//!
//! ## Checks
//! Each analyzed page is checked for four defects:
//! - **Blank page** - mean brightness against a near-white threshold
//! - **Blur** - variance of the Laplacian response over the page
//! - **Skew** - rotation angle against a degree threshold (estimator is a stub)
//! - **Duplicate** - perceptual hash looked up in the batch session

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::engine::{QcConfig, QcEngine, QcMetrics, QcResult};
pub use crate::core::pixel::{GrayscaleMethod, ImageRef, PixelBuffer, PixelSource};
pub use crate::core::session::QcSession;
pub use error::{QcError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
