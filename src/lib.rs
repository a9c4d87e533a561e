//! Finance Advisor - core of a personal finance advisor
//!
//! This library provides:
//! - Reconciliation of per-transaction AI enrichment fetched concurrently,
//!   with stale results from superseded passes discarded
//! - Single-transaction categorization and client-side transaction creation
//! - Savings projection for a redirected recurring spend, compounded monthly
//! - HTTP client for the persistence and categorization API

pub mod client;
pub mod config;
pub mod enrichment;
pub mod projection;
pub mod transactions;

// Re-export commonly used types
pub use client::{ApiError, FinanceApi, HttpFinanceApi, TransactionQuery};
pub use config::ClientConfig;
pub use enrichment::{EnrichmentCoordinator, EnrichmentSnapshot, ReconcilePass};
pub use projection::{project, ProjectionEngine, ProjectionParameters, ProjectionResult};
pub use transactions::{EnrichmentResult, NewTransaction, TransactionRecord};
