//! Week arithmetic - Every menu, shopping list and purchase is keyed by the
//! Monday of its ISO week.

use crate::errors::{Error, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};

/// Storage format of week keys.
pub const WEEK_FORMAT: &str = "%Y-%m-%d";

/// Returns the Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Parses any `YYYY-MM-DD` date and normalizes it to its week's Monday.
pub fn parse_week(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), WEEK_FORMAT)
        .map(week_start)
        .map_err(|_| Error::InvalidWeek {
            value: value.to_string(),
        })
}

/// Monday of the current local week.
#[must_use]
pub fn current_week() -> NaiveDate {
    week_start(Local::now().date_naive())
}

/// `YYYY-MM-DD` of the week's Monday.
#[must_use]
pub fn week_key(week: NaiveDate) -> String {
    week_start(week).format(WEEK_FORMAT).to_string()
}

/// Id of the weekly menu record: `menu-YYYY-MM-DD`.
#[must_use]
pub fn menu_id(week: NaiveDate) -> String {
    format!("menu-{}", week_key(week))
}

/// Id of the shopping list record: `shopping-YYYY-MM-DD`.
#[must_use]
pub fn shopping_list_id(week: NaiveDate) -> String {
    format!("shopping-{}", week_key(week))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-03-04 is a Monday
        assert_eq!(week_start(date(2024, 3, 4)), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 3, 6)), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 3, 10)), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 3, 11)), date(2024, 3, 11));
    }

    #[test]
    fn test_week_start_crosses_year_boundary() {
        // 2025-01-01 is a Wednesday
        assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 30));
    }

    #[test]
    fn test_parse_week_normalizes() {
        assert_eq!(parse_week("2024-03-08").unwrap(), date(2024, 3, 4));
        assert!(matches!(
            parse_week("next week"),
            Err(Error::InvalidWeek { value: _ })
        ));
    }

    #[test]
    fn test_record_ids() {
        let week = date(2024, 3, 7);
        assert_eq!(week_key(week), "2024-03-04");
        assert_eq!(menu_id(week), "menu-2024-03-04");
        assert_eq!(shopping_list_id(week), "shopping-2024-03-04");
    }

    #[test]
    fn test_current_week_is_monday() {
        assert_eq!(current_week().weekday(), chrono::Weekday::Mon);
    }
}
