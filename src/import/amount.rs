use rust_decimal::Decimal;

use crate::grid::Cell;

/// Absolute tolerance, in the currency minor unit, under which two totals are
/// considered settled. Every "OK" decision in the pipeline goes through this
/// one constant.
pub const SETTLE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Parse a monetary cell into an exact decimal.
///
/// Numeric cells go through their string representation so binary rounding
/// artifacts never reach the decimal domain. Text cells are read as pt-BR
/// formatted values: "." is a thousands separator, "," the decimal mark.
/// Anything unparseable yields zero; malformed cells are common in these
/// exports and must not stop the file.
pub fn parse_amount(cell: &Cell) -> Decimal {
    match cell {
        Cell::Number(number) => {
            Decimal::from_str_exact(&number.to_string()).unwrap_or(Decimal::ZERO)
        }
        Cell::Text(text) => parse_text_amount(text),
        _ => Decimal::ZERO,
    }
}

fn parse_text_amount(text: &str) -> Decimal {
    let normalized = text.trim().replace('.', "").replace(',', ".");
    Decimal::from_str_exact(&normalized).unwrap_or(Decimal::ZERO)
}

/// Render with exactly two fractional digits and a decimal comma.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2)).replace('.', ",")
}
