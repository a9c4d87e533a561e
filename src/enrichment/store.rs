//! Keyed enrichment store with one mutation entry point per state transition

use std::collections::{HashMap, HashSet};

use crate::transactions::{EnrichmentResult, TransactionId, TransactionRecord};

/// Reconciliation pass identifier; strictly increasing
pub type Generation = u64;

/// Identifies one outstanding request for one transaction
pub type RequestTicket = u64;

/// Progress of the latest request for a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

/// Who is writing into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitSource {
    /// A bulk reconciliation pass; accepted only while it is the displayed pass
    Pass(Generation),
    /// A user-initiated single-item request; last write wins
    Manual,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    result: Option<EnrichmentResult>,
    request: RequestState,
    ticket: RequestTicket,
}

/// Read-only view of one transaction's enrichment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentSnapshot {
    pub result: Option<EnrichmentResult>,
    pub loading: bool,
    pub error: Option<String>,
}

impl EnrichmentSnapshot {
    /// Settled: not waiting on any request
    pub fn is_terminal(&self) -> bool {
        !self.loading
    }
}

fn snapshot_of(entry: &Entry) -> EnrichmentSnapshot {
    let (loading, error) = match &entry.request {
        RequestState::Idle => (false, None),
        RequestState::Loading => (true, None),
        RequestState::Failed(message) => (false, Some(message.clone())),
    };
    EnrichmentSnapshot {
        result: entry.result.clone(),
        loading,
        error,
    }
}

/// Everything the view shows: the current transaction list and, per id, the
/// enrichment result plus request state.
///
/// All mutation goes through the methods below, each of which checks the
/// commit source before touching anything and reports whether it applied.
#[derive(Debug, Default)]
pub struct EnrichmentStore {
    /// Latest generation handed out
    latest: Generation,

    /// Generation whose items are displayed
    displayed: Generation,

    next_ticket: RequestTicket,
    items: Vec<TransactionRecord>,
    entries: HashMap<TransactionId, Entry>,
    closed: bool,
}

impl EnrichmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Reads ----

    /// Snapshot for one id; unknown ids read as empty and idle
    pub fn get(&self, id: TransactionId) -> EnrichmentSnapshot {
        self.entries.get(&id).map(snapshot_of).unwrap_or_default()
    }

    pub fn contains(&self, id: TransactionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Transactions in display order
    pub fn items(&self) -> &[TransactionRecord] {
        &self.items
    }

    /// Transactions paired with their snapshots, in display order
    pub fn rows(&self) -> Vec<(TransactionRecord, EnrichmentSnapshot)> {
        self.items
            .iter()
            .map(|item| (item.clone(), self.get(item.id)))
            .collect()
    }

    /// Settled rows not yet in `seen`, in display order
    pub fn newly_settled(&self, seen: &HashSet<TransactionId>) -> Vec<(TransactionRecord, EnrichmentSnapshot)> {
        self.items
            .iter()
            .filter(|item| !seen.contains(&item.id))
            .map(|item| (item.clone(), self.get(item.id)))
            .filter(|(_, state)| state.is_terminal())
            .collect()
    }

    /// Number of transactions with a request in flight
    pub fn pending(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.request == RequestState::Loading)
            .count()
    }

    pub fn displayed_generation(&self) -> Generation {
        self.displayed
    }

    pub fn latest_generation(&self) -> Generation {
        self.latest
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ---- Transitions ----

    /// Hand out the next generation. Reserving supersedes any pass that has
    /// not started yet, but the displayed pass keeps committing until a newer
    /// one actually begins.
    pub fn reserve_generation(&mut self) -> Generation {
        self.latest += 1;
        self.latest
    }

    /// Replace the item list and clear all prior enrichment state.
    ///
    /// Only the most recently reserved generation may begin. Every item starts
    /// out loading; returns the ticket issued to each, or `None` if stale.
    pub fn begin_pass(
        &mut self,
        generation: Generation,
        items: Vec<TransactionRecord>,
    ) -> Option<Vec<(TransactionId, RequestTicket)>> {
        if self.closed || generation != self.latest {
            return None;
        }

        let mut unique = Vec::with_capacity(items.len());
        let mut entries = HashMap::with_capacity(items.len());
        let mut tickets = Vec::with_capacity(items.len());

        for item in items {
            if entries.contains_key(&item.id) {
                log::warn!("transaction {} listed twice; keeping the first", item.id);
                continue;
            }
            let ticket = self.issue_ticket();
            entries.insert(
                item.id,
                Entry {
                    result: None,
                    request: RequestState::Loading,
                    ticket,
                },
            );
            tickets.push((item.id, ticket));
            unique.push(item);
        }

        self.displayed = generation;
        self.items = unique;
        self.entries = entries;
        Some(tickets)
    }

    /// Put a client-created transaction at the head of the list
    pub fn insert_item(&mut self, item: TransactionRecord, initial: Option<EnrichmentResult>) -> bool {
        if self.closed {
            return false;
        }

        let ticket = self.issue_ticket();
        self.items.retain(|existing| existing.id != item.id);
        self.entries.insert(
            item.id,
            Entry {
                result: initial,
                request: RequestState::Idle,
                ticket,
            },
        );
        self.items.insert(0, item);
        true
    }

    /// Mark a request as started; clears any previous error
    pub fn start_loading(&mut self, id: TransactionId, source: CommitSource) -> Option<RequestTicket> {
        if !self.accepts(id, source) {
            return None;
        }
        let ticket = self.issue_ticket();
        let entry = self.entries.get_mut(&id)?;
        entry.request = RequestState::Loading;
        entry.ticket = ticket;
        Some(ticket)
    }

    /// Replace the result wholesale and return to idle
    pub fn commit_success(
        &mut self,
        id: TransactionId,
        source: CommitSource,
        result: Option<EnrichmentResult>,
    ) -> bool {
        if !self.accepts(id, source) {
            return false;
        }
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.result = result;
                entry.request = RequestState::Idle;
                true
            }
            None => false,
        }
    }

    /// Record a failure; the previous result stays in place
    pub fn commit_failure(&mut self, id: TransactionId, source: CommitSource, message: String) -> bool {
        if !self.accepts(id, source) {
            return false;
        }
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.request = RequestState::Failed(message);
                true
            }
            None => false,
        }
    }

    /// Drop the loading flag of an abandoned request, if it is still the
    /// latest one for that id
    pub fn clear_loading(&mut self, id: TransactionId, ticket: RequestTicket) -> bool {
        if self.closed {
            return false;
        }
        match self.entries.get_mut(&id) {
            Some(entry) if entry.ticket == ticket && entry.request == RequestState::Loading => {
                entry.request = RequestState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Tear down: nothing commits afterwards
    pub fn close(&mut self) -> bool {
        let changed = !self.closed;
        self.closed = true;
        changed
    }

    fn accepts(&self, id: TransactionId, source: CommitSource) -> bool {
        if self.closed || !self.entries.contains_key(&id) {
            return false;
        }
        match source {
            CommitSource::Pass(generation) => generation == self.displayed,
            CommitSource::Manual => true,
        }
    }

    fn issue_ticket(&mut self) -> RequestTicket {
        self.next_ticket += 1;
        self.next_ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(id: TransactionId) -> TransactionRecord {
        TransactionRecord {
            id,
            account_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: format!("tx {}", id),
            amount: -1.0,
            merchant_raw: None,
        }
    }

    fn categorized(category: &str) -> EnrichmentResult {
        EnrichmentResult {
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_begin_pass_clears_previous_state() {
        let mut store = EnrichmentStore::new();
        let g1 = store.reserve_generation();
        store.begin_pass(g1, vec![tx(1), tx(2)]).unwrap();
        assert!(store.commit_success(1, CommitSource::Pass(g1), Some(categorized("Dining"))));

        let g2 = store.reserve_generation();
        let tickets = store.begin_pass(g2, vec![tx(1), tx(3)]).unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(store.get(1).result, None);
        assert!(store.get(1).loading);
        assert!(!store.contains(2));
        assert_eq!(store.pending(), 2);
    }

    #[test]
    fn test_newly_settled_reports_each_row_once() {
        let mut store = EnrichmentStore::new();
        let g = store.reserve_generation();
        store.begin_pass(g, vec![tx(1), tx(2), tx(3)]).unwrap();
        let mut seen = HashSet::new();
        assert!(store.newly_settled(&seen).is_empty());

        store.commit_success(2, CommitSource::Pass(g), Some(categorized("Rent")));
        let settled = store.newly_settled(&seen);
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].0.id, 2);
        assert_eq!(settled[0].1.result, Some(categorized("Rent")));
        seen.extend(settled.iter().map(|(item, _)| item.id));

        store.commit_failure(3, CommitSource::Pass(g), "timeout".to_string());
        store.commit_success(1, CommitSource::Pass(g), None);
        let ids: Vec<TransactionId> = store.newly_settled(&seen).iter().map(|(item, _)| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_stale_generation_cannot_begin_or_commit() {
        let mut store = EnrichmentStore::new();
        let g1 = store.reserve_generation();
        let g2 = store.reserve_generation();

        assert!(store.begin_pass(g1, vec![tx(1)]).is_none());
        store.begin_pass(g2, vec![tx(1)]).unwrap();

        assert!(!store.commit_success(1, CommitSource::Pass(g1), Some(categorized("Old"))));
        assert_eq!(store.get(1).result, None);
    }

    #[test]
    fn test_displayed_pass_commits_while_next_is_reserved() {
        let mut store = EnrichmentStore::new();
        let g1 = store.reserve_generation();
        store.begin_pass(g1, vec![tx(1)]).unwrap();

        // A search has been issued but its listing has not arrived yet
        let _g2 = store.reserve_generation();
        assert!(store.commit_success(1, CommitSource::Pass(g1), Some(categorized("Dining"))));
        assert!(!store.get(1).loading);
    }

    #[test]
    fn test_success_replaces_wholesale() {
        let mut store = EnrichmentStore::new();
        let full = EnrichmentResult {
            merchant: Some("Costa".to_string()),
            subcategory: Some("Coffee".to_string()),
            notes: Some("daily".to_string()),
            ..categorized("Dining")
        };
        store.insert_item(tx(1), Some(full));

        store.start_loading(1, CommitSource::Manual).unwrap();
        store.commit_success(1, CommitSource::Manual, Some(categorized("Groceries")));

        let snapshot = store.get(1);
        assert_eq!(snapshot.result, Some(categorized("Groceries")));
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, None);
    }

    #[test]
    fn test_failure_keeps_result() {
        let mut store = EnrichmentStore::new();
        store.insert_item(tx(1), Some(categorized("Dining")));

        store.start_loading(1, CommitSource::Manual).unwrap();
        store.commit_failure(1, CommitSource::Manual, "server returned 500".to_string());

        let snapshot = store.get(1);
        assert_eq!(snapshot.result, Some(categorized("Dining")));
        assert_eq!(snapshot.error.as_deref(), Some("server returned 500"));
        assert!(!snapshot.loading);

        // Starting again clears the error
        store.start_loading(1, CommitSource::Manual).unwrap();
        assert_eq!(store.get(1).error, None);
    }

    #[test]
    fn test_clear_loading_respects_ticket() {
        let mut store = EnrichmentStore::new();
        store.insert_item(tx(1), None);

        let first = store.start_loading(1, CommitSource::Manual).unwrap();
        let second = store.start_loading(1, CommitSource::Manual).unwrap();

        assert!(!store.clear_loading(1, first));
        assert!(store.get(1).loading);
        assert!(store.clear_loading(1, second));
        assert!(!store.get(1).loading);
    }

    #[test]
    fn test_insert_item_prepends_and_replaces() {
        let mut store = EnrichmentStore::new();
        let g = store.reserve_generation();
        store.begin_pass(g, vec![tx(1), tx(2)]).unwrap();

        store.insert_item(tx(3), None);
        store.insert_item(tx(2), Some(categorized("Rent")));

        let ids: Vec<TransactionId> = store.items().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(!store.get(2).loading);
        assert_eq!(store.get(2).result, Some(categorized("Rent")));
    }

    #[test]
    fn test_closed_store_rejects_everything() {
        let mut store = EnrichmentStore::new();
        let g = store.reserve_generation();
        store.begin_pass(g, vec![tx(1)]).unwrap();
        assert!(store.close());

        assert!(!store.commit_success(1, CommitSource::Pass(g), None));
        assert!(!store.insert_item(tx(2), None));
        let g2 = store.reserve_generation();
        assert!(store.begin_pass(g2, vec![tx(2)]).is_none());
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let mut store = EnrichmentStore::new();
        let g = store.reserve_generation();
        let tickets = store.begin_pass(g, vec![tx(1), tx(1), tx(2)]).unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn test_unknown_id_reads_empty() {
        let store = EnrichmentStore::new();
        assert_eq!(store.get(99), EnrichmentSnapshot::default());
    }
}
