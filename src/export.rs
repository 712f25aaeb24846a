use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::import::format_amount;
use crate::ir::{MovementKind, TransactionRecord};
use crate::operations::Reconciliation;

/// Render the report payload: one line per classified invoice, then exactly
/// one trailing summary line.
pub fn report_lines(reconciliation: &Reconciliation) -> Vec<String> {
    let mut lines: Vec<String> = reconciliation
        .lines
        .iter()
        .map(|line| {
            format!(
                "NF {} -> Credit: {} | Debit: {} | {}",
                line.invoice,
                format_amount(line.totals.total_credit),
                format_amount(line.totals.total_debit),
                line.status,
            )
        })
        .collect();
    lines.push(reconciliation.balance_check.to_string());
    lines
}

pub fn write_report(path: &Path, lines: &[String]) -> Result<()> {
    std::fs::write(path, lines.join("\n"))
        .with_context(|| format!("failed to write report {}", path.display()))
}

/// One row of the normalized entries table.
#[derive(Serialize)]
struct EntryRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "FullText")]
    full_text: &'a str,
    #[serde(rename = "Debit")]
    debit: String,
    #[serde(rename = "Credit")]
    credit: String,
    #[serde(rename = "Description")]
    description: MovementKind,
    #[serde(rename = "InvoiceNumber")]
    invoice_number: &'a str,
}

/// Write the full set of extracted records, in original row order, as the
/// normalized entries table.
pub fn write_entries(path: &Path, records: &[TransactionRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create entries table {}", path.display()))?;
    for record in records {
        writer.serialize(EntryRow {
            date: record.date.format("%Y-%m-%d").to_string(),
            full_text: &record.raw_text,
            debit: format_amount(record.debit),
            credit: format_amount(record.credit),
            description: record.kind,
            invoice_number: &record.invoice,
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write entries table {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::ir::InvoiceTotals;
    use crate::operations::reconcile;

    #[test]
    fn report_lines_match_the_expected_wording() {
        let aggregates = vec![
            (
                "100".to_string(),
                InvoiceTotals {
                    total_debit: Decimal::ZERO,
                    total_credit: Decimal::new(50000, 2),
                },
            ),
            (
                "200".to_string(),
                InvoiceTotals {
                    total_debit: Decimal::new(40000, 2),
                    total_credit: Decimal::ZERO,
                },
            ),
        ];
        let reconciliation = reconcile(aggregates, Decimal::new(50000, 2));
        assert_eq!(
            report_lines(&reconciliation),
            vec![
                "NF 100 -> Credit: 500,00 | Debit: 0,00 | no payment registered".to_string(),
                "NF 200 -> Credit: 0,00 | Debit: 400,00 | no acquisition registered".to_string(),
                "| Prior balance difference 100,00 | Prior balance 500,00    \
                 Debit without acquisition 400,00"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn entries_table_keeps_row_order_and_leading_zeros() {
        let records = vec![
            TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                raw_text: "PAGAMENTO NF 0042".to_string(),
                debit: Decimal::ZERO,
                credit: Decimal::new(20000, 2),
                balance: Decimal::ZERO,
                kind: MovementKind::Payment,
                invoice: "0042".to_string(),
            },
            TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
                raw_text: "AQUISICAO NF 7".to_string(),
                debit: Decimal::new(15000, 2),
                credit: Decimal::ZERO,
                balance: Decimal::ZERO,
                kind: MovementKind::Acquisition,
                invoice: "7".to_string(),
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.csv");
        write_entries(&path, &records).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Date,FullText,Debit,Credit,Description,InvoiceNumber\n\
             2024-01-05,PAGAMENTO NF 0042,\"0,00\",\"200,00\",PAYMENT,0042\n\
             2024-01-06,AQUISICAO NF 7,\"150,00\",\"0,00\",ACQUISITION,7\n"
        );
    }
}
