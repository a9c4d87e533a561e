//! Transaction records and their AI-derived enrichment

mod record;
mod enrichment;
pub mod loader;

pub use record::{TransactionId, TransactionRecord, NewTransaction, DEFAULT_ACCOUNT_ID};
pub use enrichment::{EnrichmentResult, SpendingClass};
pub use loader::{load_transactions, load_transactions_from_reader};
