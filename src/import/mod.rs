use std::fmt;

use log::{info, warn};
use rust_decimal::Decimal;

use crate::grid::RawGrid;
use crate::ir::TransactionRecord;

mod amount;
mod date;
mod header;
mod pattern;

pub use amount::{format_amount, parse_amount, SETTLE_TOLERANCE};
pub use date::parse_date_cell;
pub use header::{locate_header, Field, HeaderLocation, COLUMN_LABELS};
pub use pattern::{match_movement, MOVEMENT_PATTERN};

/// Marker text of the carried-forward balance row.
const PRIOR_BALANCE_MARKER: &str = "SALDO ANTERIOR";

/// Why a file was abandoned without producing artifacts. File-scoped and
/// recoverable at the batch level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    HeaderRowNotFound,
    ColumnNotFound(Field),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HeaderRowNotFound => f.write_str("header row not found"),
            SkipReason::ColumnNotFound(field) => {
                write!(f, "required column \"{}\" not found", field.label())
            }
        }
    }
}

/// Everything the core pulls out of one grid.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Validated transaction rows, in original grid order.
    pub records: Vec<TransactionRecord>,
    /// Carried-forward balance, sign-normalized; zero when absent.
    pub prior_balance: Decimal,
}

/// Run the extraction pipeline over one loaded grid: locate the header,
/// pull the prior balance, and collect the transaction records.
pub fn extract(grid: &RawGrid) -> Result<Extraction, SkipReason> {
    let location = locate_header(grid)?;
    let prior_balance = prior_balance(grid, &location);
    let records = transaction_records(grid, &location);
    Ok(Extraction {
        records,
        prior_balance,
    })
}

fn prior_balance(grid: &RawGrid, location: &HeaderLocation) -> Decimal {
    let Some(balance_col) = location.balance_col else {
        warn!("balance column not present, prior balance defaults to 0,00");
        return Decimal::ZERO;
    };
    let marker_row = (location.header_row..grid.row_count()).find(|&row| {
        grid.row(row)
            .iter()
            .any(|cell| cell.text().to_uppercase().contains(PRIOR_BALANCE_MARKER))
    });
    let Some(row) = marker_row else {
        warn!("marker \"{PRIOR_BALANCE_MARKER}\" not found, prior balance defaults to 0,00");
        return Decimal::ZERO;
    };
    // Liabilities are carried with a negative sign; the accounting balance
    // is the magnitude.
    let value = parse_amount(grid.cell(row, balance_col)).abs();
    info!("prior balance: {}", format_amount(value));
    value
}

fn transaction_records(grid: &RawGrid, location: &HeaderLocation) -> Vec<TransactionRecord> {
    let mut records = Vec::new();
    for row in location.header_row + 1..grid.row_count() {
        // Footer and summary rows have no parseable date; dropped, not errors.
        let Some(date) = parse_date_cell(grid.cell(row, location.date_col)) else {
            continue;
        };
        let raw_text = grid.cell(row, location.history_col).text();
        // A dated row without a movement keyword carries no reconciliation
        // information and must not enter the aggregate under an empty key.
        let Some((kind, invoice)) = match_movement(&raw_text) else {
            continue;
        };
        let balance = location
            .balance_col
            .map(|col| parse_amount(grid.cell(row, col)))
            .unwrap_or_default();
        records.push(TransactionRecord {
            date,
            debit: parse_amount(grid.cell(row, location.debit_col)),
            credit: parse_amount(grid.cell(row, location.credit_col)),
            balance,
            kind,
            invoice,
            raw_text,
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::grid::text_grid;
    use crate::ir::MovementKind;

    const HEADER: &[&str] = &[
        "DATA",
        "CONTRAPARTIDA/HISTÓRICO",
        "DÉBITO",
        "CRÉDITO",
        "SALDO-EXERCÍCIO",
    ];

    #[test]
    fn extracts_records_and_prior_balance() {
        let grid = text_grid(&[
            &["BALANCETE"],
            HEADER,
            &["", "SALDO ANTERIOR", "", "", "-500,00"],
            &["05/01/2024", "PAGAMENTO NF 100", "", "200,00", "300,00"],
            &["06/01/2024", "AQUISICAO NF 200", "150,00", "", "150,00"],
            &["", "TOTAL DO PERÍODO", "150,00", "200,00", ""],
        ]);
        let extraction = extract(&grid).unwrap();

        assert_eq!(extraction.prior_balance, Decimal::new(50000, 2));
        assert_eq!(extraction.records.len(), 2);

        let first = &extraction.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(first.kind, MovementKind::Payment);
        assert_eq!(first.invoice, "100");
        assert_eq!(first.credit, Decimal::new(20000, 2));
        assert_eq!(first.debit, Decimal::ZERO);
        assert_eq!(first.raw_text, "PAGAMENTO NF 100");

        let second = &extraction.records[1];
        assert_eq!(second.kind, MovementKind::Acquisition);
        assert_eq!(second.invoice, "200");
        assert_eq!(second.debit, Decimal::new(15000, 2));
    }

    #[test]
    fn rows_without_movement_keyword_are_dropped() {
        let grid = text_grid(&[
            HEADER,
            &["05/01/2024", "TARIFA BANCÁRIA 12", "5,00", "", ""],
            &["06/01/2024", "PAGAMENTO NF 7", "", "5,00", ""],
        ]);
        let extraction = extract(&grid).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].invoice, "7");
    }

    #[test]
    fn rows_without_parseable_date_are_dropped() {
        let grid = text_grid(&[
            HEADER,
            &["", "PAGAMENTO NF 1", "", "5,00", ""],
            &["SOMA", "PAGAMENTO NF 2", "", "5,00", ""],
        ]);
        let extraction = extract(&grid).unwrap();
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn missing_marker_defaults_prior_balance_to_zero() {
        let grid = text_grid(&[
            HEADER,
            &["05/01/2024", "PAGAMENTO NF 1", "", "5,00", "5,00"],
        ]);
        let extraction = extract(&grid).unwrap();
        assert_eq!(extraction.prior_balance, Decimal::ZERO);
    }

    #[test]
    fn missing_balance_column_defaults_everything_to_zero() {
        let grid = text_grid(&[
            &["DATA", "CONTRAPARTIDA/HISTÓRICO", "DÉBITO", "CRÉDITO"],
            &["", "SALDO ANTERIOR", "", ""],
            &["05/01/2024", "PAGAMENTO NF 1", "", "5,00"],
        ]);
        let extraction = extract(&grid).unwrap();
        assert_eq!(extraction.prior_balance, Decimal::ZERO);
        assert_eq!(extraction.records[0].balance, Decimal::ZERO);
    }

    #[test]
    fn malformed_amount_cells_default_to_zero() {
        let grid = text_grid(&[
            HEADER,
            &["05/01/2024", "PAGAMENTO NF 1", "n/a", "x", "?"],
        ]);
        let extraction = extract(&grid).unwrap();
        let record = &extraction.records[0];
        assert_eq!(record.debit, Decimal::ZERO);
        assert_eq!(record.credit, Decimal::ZERO);
        assert_eq!(record.balance, Decimal::ZERO);
    }

    #[test]
    fn headerless_grid_is_skipped() {
        let grid = text_grid(&[&["nothing", "here"]]);
        assert_eq!(extract(&grid).unwrap_err(), SkipReason::HeaderRowNotFound);
    }
}
