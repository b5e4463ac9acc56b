//! Income and expense transactions

use super::repository::Record;
use super::validation::{ensure_amount, ensure_not_blank};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionType::Income => "Income",
                TransactionType::Expense => "Expense",
            }
        )
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(TransactionType::Income),
            "expense" | "out" => Ok(TransactionType::Expense),
            _ => Err(anyhow::anyhow!("Invalid transaction type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        description: &str,
        amount: f64,
        category: &str,
        date: DateTime<Utc>,
        kind: TransactionType,
        notes: Option<String>,
    ) -> Result<Self> {
        let transaction = Self {
            id: Uuid::now_v7().to_string(),
            description: description.trim().to_string(),
            amount,
            category: category.trim().to_string(),
            date,
            kind,
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        transaction.validate()?;
        Ok(transaction)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_not_blank("Description", &self.description)?;
        ensure_not_blank("Category", &self.category)?;
        ensure_amount("Amount", self.amount)
    }

    /// Amount with the sign applied: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

impl Record for Transaction {
    const COLLECTION: &'static str = "transactions";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_trims_and_validates() {
        let tx = Transaction::new(
            "  Salary ",
            3500.0,
            "Work",
            Utc::now(),
            TransactionType::Income,
            Some("   ".to_string()),
        )
        .unwrap();
        assert_eq!(tx.description, "Salary");
        assert!(tx.notes.is_none());
        assert!(!tx.id.is_empty());
        assert_eq!(tx.signed_amount(), 3500.0);

        let negative = Transaction::new(
            "Refund",
            -5.0,
            "Shopping",
            Utc::now(),
            TransactionType::Expense,
            None,
        );
        assert!(negative.is_err());

        let blank = Transaction::new("", 5.0, "Food", Utc::now(), TransactionType::Expense, None);
        assert!(blank.is_err());
    }

    #[test]
    fn test_expense_is_negative_when_signed() {
        let tx = Transaction::new(
            "Groceries",
            82.4,
            "Food",
            Utc::now(),
            TransactionType::Expense,
            None,
        )
        .unwrap();
        assert!(tx.is_expense());
        assert_eq!(tx.signed_amount(), -82.4);
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!(
            "Income".parse::<TransactionType>().unwrap(),
            TransactionType::Income
        );
        assert_eq!(
            "expense".parse::<TransactionType>().unwrap(),
            TransactionType::Expense
        );
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_serialized_type_field() {
        let tx = Transaction::new(
            "Coffee",
            3.5,
            "Food",
            Utc::now(),
            TransactionType::Expense,
            None,
        )
        .unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "Expense");
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
