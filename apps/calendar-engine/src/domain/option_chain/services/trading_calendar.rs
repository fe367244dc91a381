//! Trading day arithmetic.
//!
//! Weekends are excluded; exchange holidays are not consulted.

use chrono::{Datelike, NaiveDate, Weekday};

/// Whether `date` falls on Monday through Friday.
#[must_use]
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays from `today` (inclusive) up to `expiration` (exclusive).
///
/// Returns 0 when the expiration is today or already past.
#[must_use]
pub fn trading_days_until(today: NaiveDate, expiration: NaiveDate) -> u32 {
    let mut days = 0;
    let mut current = today;
    while current < expiration {
        if is_weekday(current) {
            days += 1;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}
