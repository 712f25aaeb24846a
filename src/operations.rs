use std::collections::{hash_map::Entry, HashMap};
use std::fmt;

use rust_decimal::Decimal;

use crate::import::{format_amount, SETTLE_TOLERANCE};
use crate::ir::{InvoiceTotals, TransactionRecord};

/// Group records by invoice number, accumulating debit and credit totals.
/// Purely additive, so totals are independent of record order; the key order
/// is first appearance, which keeps the report deterministic.
pub fn aggregate_by_invoice(records: &[TransactionRecord]) -> Vec<(String, InvoiceTotals)> {
    let mut aggregates: Vec<(String, InvoiceTotals)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let slot = match index.entry(record.invoice.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                aggregates.push((record.invoice.clone(), InvoiceTotals::default()));
                *entry.insert(aggregates.len() - 1)
            }
        };
        let totals = &mut aggregates[slot].1;
        totals.total_debit += record.debit;
        totals.total_credit += record.credit;
    }
    aggregates
}

/// Payment status of one aggregated invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    NoPaymentRegistered,
    NoAcquisitionRegistered,
    Ok,
    /// Signed credit minus debit, beyond the settle tolerance.
    Difference(Decimal),
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::NoPaymentRegistered => f.write_str("no payment registered"),
            InvoiceStatus::NoAcquisitionRegistered => f.write_str("no acquisition registered"),
            InvoiceStatus::Ok => f.write_str("OK"),
            InvoiceStatus::Difference(difference) => {
                write!(f, "difference {}", format_amount(*difference))
            }
        }
    }
}

/// One classified invoice of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub invoice: String,
    pub totals: InvoiceTotals,
    pub status: InvoiceStatus,
}

/// File-level prior-balance check, rendered as the single trailing summary
/// line of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCheck {
    /// No invoice had debit without an offsetting credit; nothing to
    /// reconcile against the prior balance.
    NothingToReconcile { prior_balance: Decimal },
    Ok {
        prior_balance: Decimal,
        debit_only: Decimal,
    },
    Difference {
        /// Signed debit-only sum minus prior balance; displayed as magnitude.
        difference: Decimal,
        prior_balance: Decimal,
        debit_only: Decimal,
    },
}

impl fmt::Display for BalanceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceCheck::NothingToReconcile { prior_balance } => write!(
                f,
                "| Prior balance OK | Prior balance {}    No debit without acquisition",
                format_amount(*prior_balance)
            ),
            BalanceCheck::Ok {
                prior_balance,
                debit_only,
            } => write!(
                f,
                "| Prior balance OK | Prior balance {}    Debit without acquisition {}",
                format_amount(*prior_balance),
                format_amount(*debit_only)
            ),
            BalanceCheck::Difference {
                difference,
                prior_balance,
                debit_only,
            } => write!(
                f,
                "| Prior balance difference {} | Prior balance {}    Debit without acquisition {}",
                format_amount(difference.abs()),
                format_amount(*prior_balance),
                format_amount(*debit_only)
            ),
        }
    }
}

/// Classified invoices plus the prior-balance check for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub lines: Vec<InvoiceLine>,
    pub balance_check: BalanceCheck,
}

/// Classify each aggregate (in first-seen order) and compute the file-level
/// prior-balance check. Invoices with neither debit nor credit are excluded
/// entirely.
pub fn reconcile(
    aggregates: Vec<(String, InvoiceTotals)>,
    prior_balance: Decimal,
) -> Reconciliation {
    let mut lines = Vec::new();
    let mut debit_only = Decimal::ZERO;

    for (invoice, totals) in aggregates {
        let InvoiceTotals {
            total_debit,
            total_credit,
        } = totals;
        if total_credit.is_zero() && total_debit.is_zero() {
            continue;
        }
        let status = if total_credit > Decimal::ZERO && total_debit.is_zero() {
            InvoiceStatus::NoPaymentRegistered
        } else if total_debit > Decimal::ZERO && total_credit.is_zero() {
            debit_only += total_debit;
            InvoiceStatus::NoAcquisitionRegistered
        } else if (total_credit - total_debit).abs() < SETTLE_TOLERANCE {
            InvoiceStatus::Ok
        } else {
            InvoiceStatus::Difference(total_credit - total_debit)
        };
        lines.push(InvoiceLine {
            invoice,
            totals,
            status,
        });
    }

    let balance_check = if debit_only > Decimal::ZERO {
        let difference = debit_only - prior_balance;
        if difference.abs() < SETTLE_TOLERANCE {
            BalanceCheck::Ok {
                prior_balance,
                debit_only,
            }
        } else {
            BalanceCheck::Difference {
                difference,
                prior_balance,
                debit_only,
            }
        }
    } else {
        BalanceCheck::NothingToReconcile { prior_balance }
    };

    Reconciliation {
        lines,
        balance_check,
    }
}
