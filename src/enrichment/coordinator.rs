//! Fan-out/fan-in coordinator for transaction enrichment

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::guard::LoadingGuard;
use super::store::{CommitSource, EnrichmentSnapshot, EnrichmentStore, Generation, RequestTicket};
use crate::client::{ApiError, CategorizeRequest, FinanceApi, TransactionQuery};
use crate::transactions::{EnrichmentResult, NewTransaction, TransactionId, TransactionRecord};

/// Handle on the requests of one reconciliation pass.
///
/// Results are committed as each request settles whether or not anyone holds
/// this handle; dropping it detaches the tasks without cancelling them.
#[derive(Debug)]
pub struct ReconcilePass {
    generation: Generation,
    tasks: Vec<JoinHandle<()>>,
    superseded: bool,
}

impl ReconcilePass {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of requests issued
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// A newer pass, or shutdown, got in first; nothing was issued
    pub fn is_superseded(&self) -> bool {
        self.superseded
    }

    /// Wait for every request of the pass to settle
    pub async fn settled(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                if e.is_panic() {
                    log::warn!("enrichment task of pass {} panicked", self.generation);
                }
            }
        }
    }
}

/// Owns the enrichment view and reconciles it against the backend.
///
/// Cheap to clone; clones share the same store. Operations that issue
/// requests spawn tokio tasks and must run inside a tokio runtime.
pub struct EnrichmentCoordinator<A: ?Sized> {
    api: Arc<A>,
    store: Arc<watch::Sender<EnrichmentStore>>,
}

impl<A: ?Sized> Clone for EnrichmentCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
        }
    }
}

impl<A> EnrichmentCoordinator<A>
where
    A: FinanceApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        let (sender, _) = watch::channel(EnrichmentStore::new());
        Self {
            api,
            store: Arc::new(sender),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    // ---- Reads ----

    /// Current `{result, loading, error}` for one transaction
    pub fn get_state(&self, id: TransactionId) -> EnrichmentSnapshot {
        self.store.borrow().get(id)
    }

    pub fn contains(&self, id: TransactionId) -> bool {
        self.store.borrow().contains(id)
    }

    /// Displayed transactions, in order
    pub fn items(&self) -> Vec<TransactionRecord> {
        self.store.borrow().items().to_vec()
    }

    /// Displayed transactions with their enrichment state
    pub fn rows(&self) -> Vec<(TransactionRecord, EnrichmentSnapshot)> {
        self.store.borrow().rows()
    }

    /// Receiver notified after every applied commit
    pub fn subscribe(&self) -> watch::Receiver<EnrichmentStore> {
        self.store.subscribe()
    }

    // ---- Bulk reconciliation ----

    /// Replace the displayed list with `items` and fetch enrichment for each.
    ///
    /// Prior state is cleared before this returns. One task per item is
    /// spawned; each commits on its own as soon as its request settles.
    pub fn load_and_reconcile(&self, items: Vec<TransactionRecord>) -> ReconcilePass {
        let generation = self.reserve_generation();
        self.begin(generation, items)
    }

    /// List transactions matching `query`, then reconcile them.
    ///
    /// The generation is taken before the listing request, so an older search
    /// whose listing arrives late cannot replace a newer one.
    pub async fn search(&self, query: &TransactionQuery) -> Result<ReconcilePass, ApiError> {
        let generation = self.reserve_generation();
        let items = self.api.list_transactions(query).await?;
        Ok(self.begin(generation, items))
    }

    fn reserve_generation(&self) -> Generation {
        let mut generation = 0;
        // Reserving is invisible to the view; no notification
        self.store.send_if_modified(|store| {
            generation = store.reserve_generation();
            false
        });
        generation
    }

    fn begin(&self, generation: Generation, items: Vec<TransactionRecord>) -> ReconcilePass {
        let count = items.len();
        let mut started = None;
        self.store.send_if_modified(|store| {
            started = store.begin_pass(generation, items);
            started.is_some()
        });

        match started {
            Some(tickets) => {
                log::info!("reconciliation pass {} started for {} transactions", generation, tickets.len());
                let tasks = tickets
                    .into_iter()
                    .map(|(id, ticket)| self.spawn_fetch(generation, id, ticket))
                    .collect();
                ReconcilePass {
                    generation,
                    tasks,
                    superseded: false,
                }
            }
            None => {
                log::debug!("pass {} superseded before it began ({} transactions)", generation, count);
                ReconcilePass {
                    generation,
                    tasks: Vec::new(),
                    superseded: true,
                }
            }
        }
    }

    fn spawn_fetch(&self, generation: Generation, id: TransactionId, ticket: RequestTicket) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            let _guard = LoadingGuard::new(Arc::clone(&store), id, ticket);
            let outcome = api.fetch_enrichment(id).await.map_err(|e| e.to_string());
            commit(&store, id, CommitSource::Pass(generation), outcome);
        })
    }

    // ---- Single-item operations ----

    /// Compute enrichment for one transaction via `/categorize`.
    ///
    /// On success the stored result is replaced wholesale; on failure the
    /// previous result is kept and the error recorded. The loading flag is
    /// cleared however the request ends. Transactions not currently displayed
    /// are still categorized but nothing is stored for them.
    pub async fn enrich_one(&self, item: &TransactionRecord) -> Result<EnrichmentResult, ApiError> {
        let id = item.id;
        let mut ticket = None;
        self.store.send_if_modified(|store| {
            ticket = store.start_loading(id, CommitSource::Manual);
            ticket.is_some()
        });
        if ticket.is_none() {
            log::debug!("transaction {} is not displayed; categorizing without storing", id);
        }
        let _guard = ticket.map(|ticket| LoadingGuard::new(Arc::clone(&self.store), id, ticket));

        let request = CategorizeRequest {
            description: item.description.clone(),
            amount: item.amount,
            transaction_id: Some(id),
        };
        let outcome = self.api.categorize(&request).await;

        let committed = outcome
            .as_ref()
            .map(|result| Some(result.clone()))
            .map_err(|e| e.to_string());
        commit(&self.store, id, CommitSource::Manual, committed);

        outcome
    }

    /// Show a client-created transaction at the head of the list right away
    pub fn add_item(&self, item: TransactionRecord, initial_result: Option<EnrichmentResult>) -> bool {
        self.store.send_if_modified(|store| store.insert_item(item, initial_result))
    }

    /// Create a transaction, add it to the view, and optionally enrich it.
    ///
    /// A rejected create (e.g. missing description) leaves the view untouched.
    /// An enrichment failure after a successful create is recorded against the
    /// new item and does not fail the create.
    pub async fn create_transaction(
        &self,
        transaction: &NewTransaction,
        enrich: bool,
    ) -> Result<TransactionRecord, ApiError> {
        let record = self.api.create_transaction(transaction).await?;
        log::info!("created transaction {}", record.id);

        self.add_item(record.clone(), None);
        if enrich {
            let _ = self.enrich_one(&record).await;
        }

        Ok(record)
    }

    /// Tear down: in-flight requests keep running but nothing they return is stored
    pub fn shutdown(&self) {
        if self.store.send_if_modified(EnrichmentStore::close) {
            log::info!("enrichment coordinator shut down");
        }
    }
}

/// Single choke point for writing a settled request into the store
fn commit(
    store: &watch::Sender<EnrichmentStore>,
    id: TransactionId,
    source: CommitSource,
    outcome: Result<Option<EnrichmentResult>, String>,
) -> bool {
    let applied = match outcome {
        Ok(result) => store.send_if_modified(|s| s.commit_success(id, source, result)),
        Err(message) => {
            log::warn!("enrichment for transaction {} failed: {}", id, message);
            store.send_if_modified(|s| s.commit_failure(id, source, message))
        }
    };

    if !applied {
        log::debug!("dropped commit for transaction {} from {:?}", id, source);
    }
    applied
}
