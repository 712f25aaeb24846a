use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Movement kind carried by a transaction's history text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Acquisition,
    Payment,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Acquisition => "ACQUISITION",
            MovementKind::Payment => "PAYMENT",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated transaction row. Rows whose date cannot be parsed or whose
/// history text carries no movement keyword never become records.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub raw_text: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
    pub kind: MovementKind,
    /// Digit string; leading zeros are significant.
    pub invoice: String,
}

/// Accumulated debit/credit totals for one invoice number. Purely additive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}
