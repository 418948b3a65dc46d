//! CSV export of the transaction ledger

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::models::Transaction;

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    date: String,
    #[serde(rename = "type")]
    kind: &'static str,
    category: &'static str,
    description: &'a str,
    amount: String,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: &tx.id,
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind.as_str(),
            category: tx.category.as_str(),
            description: &tx.description,
            amount: format!("{:.2}", tx.amount),
        }
    }
}

/// Write transactions as CSV, in stored order, with a header row
pub fn write_transactions_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if transactions.is_empty() {
        // serialize() emits the header with the first record only
        csv_writer.write_record(["id", "date", "type", "category", "description", "amount"])?;
    }
    for tx in transactions {
        csv_writer.serialize(CsvRow::from(tx))?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn export(transactions: &[Transaction]) -> String {
        let mut out = Vec::new();
        write_transactions_csv(&mut out, transactions).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_export_seed_ledger() {
        let csv = export(&seed::transactions());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "id,date,type,category,description,amount");
        assert_eq!(lines[1], "1,2023-11-01,income,Other,Monthly Salary,3500.00");
        assert_eq!(lines[2], "2,2023-11-02,expense,Housing,Rent Payment,1200.00");
    }

    #[test]
    fn test_export_empty_has_header() {
        assert_eq!(export(&[]), "id,date,type,category,description,amount\n");
    }

    #[test]
    fn test_export_quotes_commas() {
        let mut tx = seed::transactions().remove(2);
        tx.description = "Milk, eggs".to_string();
        let csv = export(&[tx]);
        assert!(csv.contains("\"Milk, eggs\""));
    }
}
