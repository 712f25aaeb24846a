use chrono::NaiveDate;

use crate::grid::{excel_serial_to_date, Cell};

/// Textual date layouts accepted in the date column, tried in order.
const TEXT_LAYOUTS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%y"];

/// Permissive date parsing for the date column. Native date cells pass
/// through, numeric cells are treated as Excel serial days, text cells are
/// tried against the layouts above (a trailing time-of-day is ignored).
/// `None` means the row is not a transaction row.
pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(text) => parse_text_date(text),
        Cell::Empty => None,
    }
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.split_whitespace().next()?;
    TEXT_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(date_part, layout).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn native_date_cells_pass_through() {
        assert_eq!(
            parse_date_cell(&Cell::Date(date(2024, 1, 5))),
            Some(date(2024, 1, 5))
        );
    }

    #[test]
    fn serial_numbers_convert() {
        assert_eq!(parse_date_cell(&Cell::Number(45667.0)), Some(date(2025, 1, 10)));
        assert_eq!(parse_date_cell(&Cell::Number(-1.0)), None);
    }

    #[test]
    fn textual_dates_are_day_first() {
        assert_eq!(
            parse_date_cell(&Cell::Text("05/01/2024".to_string())),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            parse_date_cell(&Cell::Text("2024-01-05".to_string())),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            parse_date_cell(&Cell::Text("05-01-2024".to_string())),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            parse_date_cell(&Cell::Text("01/02/2024 00:00:00".to_string())),
            Some(date(2024, 2, 1))
        );
    }

    #[test]
    fn non_dates_are_rejected() {
        assert_eq!(parse_date_cell(&Cell::Text("TOTAL".to_string())), None);
        assert_eq!(parse_date_cell(&Cell::Text("32/01/2024".to_string())), None);
        assert_eq!(parse_date_cell(&Cell::Text("".to_string())), None);
        assert_eq!(parse_date_cell(&Cell::Empty), None);
    }
}
