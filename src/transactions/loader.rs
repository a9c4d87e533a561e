//! Load transactions for import from a CSV file
//!
//! Expected columns: account_id,date,description,amount,merchant_raw

use super::{NewTransaction, DEFAULT_ACCOUNT_ID};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row; account and merchant columns may be blank
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    account_id: Option<i64>,
    date: String,
    description: String,
    amount: f64,
    merchant_raw: Option<String>,
}

impl CsvRow {
    fn to_transaction(self) -> Result<NewTransaction, Box<dyn Error>> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| format!("Invalid date '{}': {}", self.date, e))?;

        let description = self.description.trim();
        if description.is_empty() {
            return Err("Empty description".into());
        }
        if !self.amount.is_finite() {
            return Err(format!("Invalid amount for '{}'", description).into());
        }

        Ok(NewTransaction {
            account_id: self.account_id.unwrap_or(DEFAULT_ACCOUNT_ID),
            date,
            description: description.to_string(),
            amount: self.amount,
            merchant_raw: self
                .merchant_raw
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        })
    }
}

/// Load all transactions from a CSV file
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<NewTransaction>, Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    load_transactions_from_reader(file)
}

/// Load transactions from any reader (e.g., string buffer, stdin)
pub fn load_transactions_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<NewTransaction>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut transactions = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        transactions.push(row.to_transaction()?);
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_reader() {
        let data = "account_id,date,description,amount,merchant_raw\n\
                    1,2025-02-01,Flat white,-3.50,Costa\n\
                    ,2025-02-03,Salary,2500.00,\n";

        let txs = load_transactions_from_reader(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 2);

        assert_eq!(txs[0].merchant_raw.as_deref(), Some("Costa"));
        assert_eq!(txs[0].amount, -3.5);

        assert_eq!(txs[1].account_id, DEFAULT_ACCOUNT_ID);
        assert_eq!(txs[1].merchant_raw, None);
    }

    #[test]
    fn test_bad_date_rejected() {
        let data = "account_id,date,description,amount,merchant_raw\n\
                    1,03/02/2025,Lunch,-9.00,\n";
        assert!(load_transactions_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_blank_description_rejected() {
        let data = "account_id,date,description,amount,merchant_raw\n\
                    1,2025-02-01,  ,-9.00,\n";
        assert!(load_transactions_from_reader(data.as_bytes()).is_err());
    }
}
