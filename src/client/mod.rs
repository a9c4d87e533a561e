//! Client side of the persistence and categorization API
//!
//! The coordinator only talks to the [`FinanceApi`] trait; [`HttpFinanceApi`]
//! is the production implementation over HTTP/JSON.

mod error;
mod wire;
mod http;

pub use error::ApiError;
pub use wire::{CategorizeRequest, EnrichedPayload, error_detail};
pub use http::HttpFinanceApi;

use async_trait::async_trait;

use crate::projection::{ProjectionParameters, ProjectionResult};
use crate::transactions::{EnrichmentResult, NewTransaction, TransactionId, TransactionRecord};

/// Query for `GET /transactions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Free-text search over description, merchant, category and notes
    pub q: Option<String>,

    /// Maximum number of rows (server default applies when absent)
    pub limit: Option<u32>,
}

impl TransactionQuery {
    pub fn search(q: impl Into<String>) -> Self {
        let q = q.into();
        Self {
            q: if q.trim().is_empty() { None } else { Some(q) },
            limit: None,
        }
    }
}

/// Operations the advisor core needs from the backend.
///
/// Every method is a suspension point; implementations must be cheap to share
/// between tasks.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    /// `GET /transactions?q=..&limit=..`, newest first
    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<TransactionRecord>, ApiError>;

    /// `GET /transactions/{id}/enriched`; `None` when not computed yet
    async fn fetch_enrichment(&self, id: TransactionId) -> Result<Option<EnrichmentResult>, ApiError>;

    /// `POST /categorize`: computes (and, with an id, stores) an enrichment
    async fn categorize(&self, request: &CategorizeRequest) -> Result<EnrichmentResult, ApiError>;

    /// `POST /transactions`
    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<TransactionRecord, ApiError>;

    /// `POST /simulate/coffee`: server-side variant of the projection engine
    async fn simulate(&self, params: &ProjectionParameters) -> Result<ProjectionResult, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_means_no_filter() {
        assert_eq!(TransactionQuery::search("   ").q, None);
        assert_eq!(TransactionQuery::search("coffee").q.as_deref(), Some("coffee"));
    }
}
