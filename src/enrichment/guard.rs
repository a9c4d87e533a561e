//! Guaranteed cleanup of a request's loading flag

use std::sync::Arc;
use tokio::sync::watch;

use super::store::{EnrichmentStore, RequestTicket};
use crate::transactions::TransactionId;

/// Clears the loading flag of one request when dropped.
///
/// Held across the request's await point, so the flag is cleared however the
/// request ends, including cancellation and panics. After a normal
/// commit the flag is already gone and the drop is a no-op; a newer request
/// for the same id holds a different ticket and is left alone.
pub(crate) struct LoadingGuard {
    store: Arc<watch::Sender<EnrichmentStore>>,
    id: TransactionId,
    ticket: RequestTicket,
}

impl LoadingGuard {
    pub(crate) fn new(store: Arc<watch::Sender<EnrichmentStore>>, id: TransactionId, ticket: RequestTicket) -> Self {
        Self { store, id, ticket }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let (id, ticket) = (self.id, self.ticket);
        if self.store.send_if_modified(|store| store.clear_loading(id, ticket)) {
            log::debug!("request for transaction {} abandoned; loading cleared", id);
        }
    }
}
