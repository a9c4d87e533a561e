//! Per-transaction enrichment reconciliation
//!
//! The [`EnrichmentCoordinator`] fans out one request per listed transaction
//! and folds the results back into a single [`EnrichmentStore`] as they
//! arrive. Passes are identified by a generation token; commits from a
//! superseded pass are dropped at the store's choke point.

mod store;
mod guard;
mod coordinator;

pub use store::{
    CommitSource, EnrichmentSnapshot, EnrichmentStore, Generation, RequestState, RequestTicket,
};
pub use coordinator::{EnrichmentCoordinator, ReconcilePass};
