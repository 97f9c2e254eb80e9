//! Request sequencing and per-record sync state.
//!
//! Fetches are never cancelled, so a slow response for an old selection
//! (say, the meetings of last year) can arrive after the response for the
//! current one. Each fetch takes a [`Ticket`] from a [`RequestTracker`] slot;
//! only the newest ticket for a slot is accepted when results come back.

use std::collections::HashMap;
use std::hash::Hash;

/// Handle for one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub slot: K,
    pub seq: u64,
}

/// Hands out monotonically increasing tickets per slot.
#[derive(Debug)]
pub struct RequestTracker<K> {
    next_seq: u64,
    latest: HashMap<K, u64>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self { next_seq: 0, latest: HashMap::new() }
    }
}

impl<K: Eq + Hash + Clone> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `slot`, superseding every earlier ticket for it.
    pub fn issue(&mut self, slot: K) -> Ticket<K> {
        self.next_seq += 1;
        self.latest.insert(slot.clone(), self.next_seq);
        Ticket { slot, seq: self.next_seq }
    }

    /// Whether `ticket` is still the newest for its slot.
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.seq)
    }

    /// Forget every outstanding ticket, e.g. on logout.
    pub fn reset(&mut self) {
        self.latest.clear();
    }
}

/// Whether a locally edited value has reached the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    Pending,
    #[default]
    Committed,
    Failed(String),
}

impl SyncState {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncState::Failed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SyncState::Pending)
    }
}

/// A value plus its sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    pub value: T,
    pub sync: SyncState,
    /// Bumped on every local edit so a late reply for an older edit
    /// does not overwrite the state of a newer one.
    pub revision: u64,
}

impl<T> Tracked<T> {
    /// Value as loaded from the backend.
    pub fn committed(value: T) -> Self {
        Self { value, sync: SyncState::Committed, revision: 0 }
    }

    /// Apply an optimistic edit. Returns the revision to report back with.
    pub fn edit(&mut self, value: T) -> u64 {
        self.value = value;
        self.sync = SyncState::Pending;
        self.revision += 1;
        self.revision
    }

    /// Record the outcome of the edit with `revision`. Outcomes for
    /// superseded edits are ignored; returns whether it was applied.
    /// The value itself is left as edited either way.
    pub fn settle(&mut self, revision: u64, outcome: Result<(), String>) -> bool {
        if revision != self.revision {
            return false;
        }
        self.sync = match outcome {
            Ok(()) => SyncState::Committed,
            Err(reason) => SyncState::Failed(reason),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue("meetings");
        let second = tracker.issue("meetings");
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut tracker = RequestTracker::new();
        let meetings = tracker.issue("meetings");
        let years = tracker.issue("years");
        assert!(tracker.is_current(&meetings));
        assert!(tracker.is_current(&years));

        tracker.reset();
        assert!(!tracker.is_current(&meetings));
    }

    #[test]
    fn test_tracked_failure_keeps_optimistic_value() {
        let mut row = Tracked::committed(0u8);
        let rev = row.edit(1);
        assert!(row.sync.is_pending());
        assert!(row.settle(rev, Err("Server error".into())));
        assert_eq!(row.value, 1);
        assert_eq!(row.sync, SyncState::Failed("Server error".into()));
    }

    #[test]
    fn test_tracked_ignores_stale_outcome() {
        let mut row = Tracked::committed(0u8);
        let old = row.edit(1);
        let new = row.edit(2);
        assert!(!row.settle(old, Err("boom".into())));
        assert!(row.sync.is_pending());
        assert!(row.settle(new, Ok(())));
        assert_eq!(row.sync, SyncState::Committed);
        assert_eq!(row.value, 2);
    }
}
