//! Transaction data structures matching the persistence API format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Externally assigned transaction identity
pub type TransactionId = i64;

/// Account used when the caller does not name one ("main account")
pub const DEFAULT_ACCOUNT_ID: i64 = 1;

fn default_account_id() -> i64 {
    DEFAULT_ACCOUNT_ID
}

/// A transaction as listed by `GET /transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier assigned by the server
    pub id: TransactionId,

    /// Owning account
    #[serde(default = "default_account_id")]
    pub account_id: i64,

    /// Booking date (serialized as YYYY-MM-DD)
    pub date: NaiveDate,

    /// Free-text bank description
    pub description: String,

    /// Signed amount: positive income, negative spend
    pub amount: f64,

    /// Merchant string as it appeared on the statement
    #[serde(default)]
    pub merchant_raw: Option<String>,
}

impl TransactionRecord {
    /// Best merchant hint available before enrichment
    pub fn merchant_hint(&self) -> &str {
        self.merchant_raw.as_deref().unwrap_or(&self.description)
    }
}

/// Body of `POST /transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(default = "default_account_id")]
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub merchant_raw: Option<String>,
}

impl NewTransaction {
    /// Create a transaction for the default account
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: f64) -> Self {
        Self {
            account_id: DEFAULT_ACCOUNT_ID,
            date,
            description: description.into(),
            amount,
            merchant_raw: None,
        }
    }

    pub fn with_merchant(mut self, merchant_raw: impl Into<String>) -> Self {
        self.merchant_raw = Some(merchant_raw.into());
        self
    }

    pub fn with_account(mut self, account_id: i64) -> Self {
        self.account_id = account_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_api_json() {
        let json = r#"{"id": 42, "account_id": 1, "date": "2025-03-14",
                       "description": "STARBUCKS DUBLIN", "amount": -4.5,
                       "merchant_raw": null}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, 42);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(record.merchant_raw, None);
        assert_eq!(record.merchant_hint(), "STARBUCKS DUBLIN");
    }

    #[test]
    fn test_new_transaction_defaults_account() {
        let json = r#"{"date": "2025-01-02", "description": "Rent", "amount": -1200.0}"#;
        let tx: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.account_id, DEFAULT_ACCOUNT_ID);

        let body = serde_json::to_value(tx.with_merchant("Landlord")).unwrap();
        assert_eq!(body["date"], "2025-01-02");
        assert_eq!(body["merchant_raw"], "Landlord");
    }
}
