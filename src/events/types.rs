//! Event type definitions for QC progress reporting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All events emitted by the QC engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QcEvent {
    /// Per-page analysis events
    Analysis(AnalysisEvent),
    /// Batch session lifecycle events
    Session(SessionEvent),
}

/// Events during the analysis of a single page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisEvent {
    /// Analysis of a page has started
    Started { reference: String },
    /// The page was decoded into pixels
    Decoded {
        reference: String,
        width: u32,
        height: u32,
    },
    /// One or more defects were found
    IssuesFound {
        reference: String,
        issues: Vec<String>,
    },
    /// Analysis finished; `passed` means no defects
    Completed { reference: String, passed: bool },
    /// Analysis failed; the page produced no result
    Error { reference: String, message: String },
}

/// Events from the batch session lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new batch session was started
    Started { session_id: Uuid },
    /// Duplicate memory was wiped
    Reset {
        session_id: Uuid,
        hashes_cleared: usize,
    },
}
