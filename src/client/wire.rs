//! JSON payloads exchanged with the backend

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transactions::{EnrichmentResult, SpendingClass, TransactionId};

/// Body of `POST /categorize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeRequest {
    pub description: String,
    pub amount: f64,

    /// When absent the server categorizes without storing the result
    pub transaction_id: Option<TransactionId>,
}

/// Enrichment as returned by `/transactions/{id}/enriched` and `/categorize`.
///
/// Every field is optional on the wire; unknown spending classes are dropped
/// rather than failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichedPayload {
    pub transaction_id: Option<TransactionId>,
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub is_subscription: Option<bool>,
    pub confidence: Option<f64>,
    pub notes: Option<String>,
    pub spending_class: Option<String>,
}

impl EnrichedPayload {
    /// Stored enrichment, taken as-is
    pub fn into_result(self) -> EnrichmentResult {
        let spending_class = self.spending_class.as_deref().and_then(parse_spending_class);
        EnrichmentResult {
            merchant: self.merchant,
            category: self.category,
            subcategory: self.subcategory,
            is_subscription: self.is_subscription,
            confidence: self.confidence,
            notes: self.notes,
            spending_class,
        }
    }

    /// Freshly computed enrichment: a missing subscription flag means `false`
    pub fn into_categorized(self) -> EnrichmentResult {
        let mut result = self.into_result();
        result.is_subscription.get_or_insert(false);
        result
    }
}

fn parse_spending_class(raw: &str) -> Option<SpendingClass> {
    match raw.parse() {
        Ok(class) => Some(class),
        Err(e) => {
            log::debug!("{}; treating as absent", e);
            None
        }
    }
}

/// Human-readable message from an error body.
///
/// Understands `{"detail": "..."}` as well as validation lists of the form
/// `{"detail": [{"msg": "...", "loc": [...]}, ...]}`.
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match (item.get("msg").and_then(Value::as_str), item.get("loc")) {
                    (Some(msg), Some(Value::Array(loc))) => {
                        let field = loc.last().and_then(Value::as_str).unwrap_or("body");
                        format!("{}: {}", field, msg)
                    }
                    (Some(msg), _) => msg.to_string(),
                    (None, _) => item.to_string(),
                })
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
