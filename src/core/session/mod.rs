//! # Session Module
//!
//! Duplicate memory scoped to one physical scanning batch.
//!
//! A session is created when the operator starts a batch and reset when a
//! new batch begins (or after an intentional recapture of a wrongly
//! flagged page). It is injected into every analysis call rather than held
//! as a process-wide singleton, so concurrent batches at different
//! scanning stations never cross-contaminate.

use crate::core::hasher::PageHash;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Per-batch set of page hashes seen so far.
///
/// The lookup-and-insert of a duplicate check runs in a single critical
/// section; two in-flight analyses of the same page cannot both report
/// "not a duplicate".
pub struct QcSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    seen: Mutex<HashSet<String>>,
}

impl QcSession {
    /// Start a fresh session for a new batch
    pub fn new() -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            seen: Mutex::new(HashSet::new()),
        };
        debug!(session_id = %session.id, "QC session started");
        session
    }

    /// Session identity, for logs and events
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When this batch's session was created
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Check a page hash against the batch and record it if unseen.
    ///
    /// Returns `true` if the hash was already present (a duplicate
    /// capture); the set is left unchanged in that case. Otherwise the
    /// hash is inserted and `false` is returned.
    pub fn check_and_record(&self, hash: &PageHash) -> bool {
        // A poisoned lock still holds a structurally intact set
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if seen.iter().any(|known| hash.matches(known)) {
            debug!(session_id = %self.id, %hash, "duplicate page detected");
            return true;
        }

        seen.insert(hash.as_str().to_string());
        false
    }

    /// Forget every hash seen in this batch.
    ///
    /// Called when a new physical batch begins or when the operator wants
    /// duplicate memory wiped. Returns how many hashes were discarded.
    pub fn reset(&self) -> usize {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let cleared = seen.len();
        seen.clear();
        debug!(session_id = %self.id, cleared, "QC session reset");
        cleared
    }

    /// Number of distinct pages seen so far
    pub fn seen_count(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether no pages have been recorded yet
    pub fn is_empty(&self) -> bool {
        self.seen_count() == 0
    }
}

impl Default for QcSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn hash(bits: &str) -> PageHash {
        PageHash::Perceptual(bits.to_string())
    }

    #[test]
    fn first_sighting_is_not_a_duplicate() {
        let session = QcSession::new();
        assert!(!session.check_and_record(&hash("1100")));
        assert_eq!(session.seen_count(), 1);
    }

    #[test]
    fn second_sighting_is_a_duplicate() {
        let session = QcSession::new();
        session.check_and_record(&hash("1100"));

        assert!(session.check_and_record(&hash("1100")));
        // Duplicate hit leaves the set unchanged
        assert_eq!(session.seen_count(), 1);
    }

    #[test]
    fn distinct_hashes_do_not_collide() {
        let session = QcSession::new();
        assert!(!session.check_and_record(&hash("1100")));
        assert!(!session.check_and_record(&hash("0011")));
        assert_eq!(session.seen_count(), 2);
    }

    #[test]
    fn reset_forgets_seen_pages() {
        let session = QcSession::new();
        session.check_and_record(&hash("1100"));
        session.check_and_record(&hash("0011"));

        assert_eq!(session.reset(), 2);
        assert!(session.is_empty());
        assert!(!session.check_and_record(&hash("1100")));
    }

    #[test]
    fn degraded_and_perceptual_hashes_share_the_set() {
        let session = QcSession::new();
        let degraded = PageHash::Degraded("100-100-0-255".to_string());

        assert!(!session.check_and_record(&degraded));
        assert!(session.check_and_record(&degraded));
    }

    #[test]
    fn concurrent_checks_admit_exactly_one_first_sighting() {
        let session = Arc::new(QcSession::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let session = Arc::clone(&session);
            handles.push(thread::spawn(move || {
                session.check_and_record(&hash("1010")) as usize
            }));
        }

        let duplicates: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(duplicates, 7);
        assert_eq!(session.seen_count(), 1);
    }

    #[test]
    fn sessions_have_distinct_identities() {
        let a = QcSession::new();
        let b = QcSession::new();
        assert_ne!(a.id(), b.id());
    }
}
