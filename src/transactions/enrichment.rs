//! AI-derived enrichment attached to a transaction after the fact

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Budget bucket assigned by the categorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingClass {
    /// Groceries, utilities, rent, fuel
    Need,
    /// Dining out, entertainment, shopping
    Want,
    /// Transfers to savings, investments, overpayments
    Savings,
}

impl SpendingClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingClass::Need => "need",
            SpendingClass::Want => "want",
            SpendingClass::Savings => "savings",
        }
    }
}

impl fmt::Display for SpendingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpendingClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "need" => Ok(SpendingClass::Need),
            "want" => Ok(SpendingClass::Want),
            "savings" => Ok(SpendingClass::Savings),
            other => Err(format!("Unknown spending class: {}", other)),
        }
    }
}

/// Enrichment for one transaction.
///
/// Always replaced as a whole: a new result never inherits fields from the
/// one it replaces, so every field here is either freshly supplied or `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,

    /// Recurring service or membership
    pub is_subscription: Option<bool>,

    /// Categorizer certainty in [0, 1]
    pub confidence: Option<f64>,

    /// Brief reasoning from the categorizer
    pub notes: Option<String>,

    pub spending_class: Option<SpendingClass>,
}

impl EnrichmentResult {
    /// Subscription-like: flagged as such, or categorized under subscriptions
    pub fn is_subscription_like(&self) -> bool {
        self.is_subscription.unwrap_or(false)
            || self
                .category
                .as_deref()
                .map(|c| c.to_lowercase().contains("subscription"))
                .unwrap_or(false)
    }

    /// Short one-line label for listings
    pub fn label(&self) -> String {
        let merchant = self.merchant.as_deref().unwrap_or("?");
        let category = self.category.as_deref().unwrap_or("Uncategorized");
        match (&self.subcategory, self.spending_class) {
            (Some(sub), Some(class)) => format!("{} / {} > {} [{}]", merchant, category, sub, class),
            (Some(sub), None) => format!("{} / {} > {}", merchant, category, sub),
            (None, Some(class)) => format!("{} / {} [{}]", merchant, category, class),
            (None, None) => format!("{} / {}", merchant, category),
        }
    }
}
