use crate::grid::{Cell, RawGrid};

use super::SkipReason;

/// Semantic fields of the transaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    History,
    Debit,
    Credit,
    Balance,
}

impl Field {
    /// Label token this field is matched by in the header row.
    pub fn label(self) -> &'static str {
        COLUMN_LABELS
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, label)| *label)
            .expect("every field has a label")
    }
}

/// The whole column matching policy in one table: each field resolves
/// independently against the header row by case-insensitive substring
/// containment, first matching cell (left to right) wins.
pub const COLUMN_LABELS: [(Field, &str); 5] = [
    (Field::Date, "DATA"),
    (Field::History, "CONTRAPARTIDA/HISTÓRICO"),
    (Field::Debit, "DÉBITO"),
    (Field::Credit, "CRÉDITO"),
    (Field::Balance, "SALDO-EXERCÍCIO"),
];

/// Resolved position of the transaction table inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    pub header_row: usize,
    pub date_col: usize,
    pub history_col: usize,
    pub debit_col: usize,
    pub credit_col: usize,
    /// May be legitimately absent; the prior-balance check then degrades to
    /// its zero default.
    pub balance_col: Option<usize>,
}

/// Find the header row and resolve the five columns.
///
/// A row qualifies as the header when it holds both `DÉBITO` and `CRÉDITO`
/// as whole-cell case-insensitive values; the first qualifying row wins.
/// Column lookup is the looser substring containment, re-resolved per field
/// so header cells with extra text around the label still resolve.
pub fn locate_header(grid: &RawGrid) -> Result<HeaderLocation, SkipReason> {
    let header_row = grid
        .rows()
        .position(row_is_header)
        .ok_or(SkipReason::HeaderRowNotFound)?;

    let cells = grid.row(header_row);
    let mut columns = [None; COLUMN_LABELS.len()];
    for (slot, (_, label)) in columns.iter_mut().zip(COLUMN_LABELS.iter()) {
        *slot = cells
            .iter()
            .position(|cell| cell.text().to_uppercase().contains(label));
    }
    let [date, history, debit, credit, balance] = columns;

    let required =
        |column: Option<usize>, field: Field| column.ok_or(SkipReason::ColumnNotFound(field));
    Ok(HeaderLocation {
        header_row,
        date_col: required(date, Field::Date)?,
        history_col: required(history, Field::History)?,
        debit_col: required(debit, Field::Debit)?,
        credit_col: required(credit, Field::Credit)?,
        balance_col: balance,
    })
}

fn row_is_header(row: &[Cell]) -> bool {
    let holds = |label: &str| row.iter().any(|cell| cell.text().to_uppercase() == label);
    holds("DÉBITO") && holds("CRÉDITO")
}
