//! Expiration selection for calendar spreads.

use chrono::NaiveDate;

use crate::domain::calendar_spread::errors::SpreadError;
use crate::domain::option_chain::{Expiration, ExpirationSet};

/// Trading-day window considered for either leg.
pub const CANDIDATE_WINDOW: (u32, u32) = (1, 10);

/// Short leg window and preferred trading days.
pub const SHORT_WINDOW: (u32, u32) = (2, 4);
/// Preferred short leg trading days.
pub const SHORT_TARGET_DAYS: u32 = 3;

/// Long leg window.
pub const LONG_WINDOW: (u32, u32) = (3, 5);
/// Preferred long leg trading days.
pub const LONG_TARGET_DAYS: u32 = 4;

/// A chosen short/long expiration pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPair {
    /// Near expiration.
    pub short: Expiration,
    /// Far expiration.
    pub long: Expiration,
}

/// Index of the entry inside `window` closest to `target`; first wins ties.
fn closest_in_window(
    candidates: &[Expiration],
    window: (u32, u32),
    target: u32,
) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, e)| (window.0..=window.1).contains(&e.trading_days()))
        .min_by_key(|(_, e)| e.trading_days().abs_diff(target))
        .map(|(i, _)| i)
}

fn shift(index: usize, offset: i32, len: usize) -> usize {
    let shifted = index as i64 + i64::from(offset);
    shifted.clamp(0, len as i64 - 1) as usize
}

/// Choose the short (~3 trading days) and long (~4 trading days)
/// expirations, shifted by `expiration_offset` positions.
pub fn select_expiration_pair(
    set: &ExpirationSet,
    expiration_offset: i32,
) -> Result<ExpirationPair, SpreadError> {
    if set.len() < 2 {
        return Err(SpreadError::InsufficientExpirations {
            underlying: set.underlying().to_string(),
            available: set.len(),
        });
    }

    let candidates = set.within_trading_days(CANDIDATE_WINDOW.0, CANDIDATE_WINDOW.1);
    let no_suitable = |message: String| SpreadError::NoSuitableExpirations {
        underlying: set.underlying().to_string(),
        message,
    };

    let short_base = closest_in_window(&candidates, SHORT_WINDOW, SHORT_TARGET_DAYS)
        .ok_or_else(|| {
            no_suitable(format!(
                "no expiration {}-{} trading days out",
                SHORT_WINDOW.0, SHORT_WINDOW.1
            ))
        })?;
    let long_base = closest_in_window(&candidates, LONG_WINDOW, LONG_TARGET_DAYS).ok_or_else(
        || {
            no_suitable(format!(
                "no expiration {}-{} trading days out",
                LONG_WINDOW.0, LONG_WINDOW.1
            ))
        },
    )?;

    let short_index = shift(short_base, expiration_offset, candidates.len());
    let mut long_index = shift(long_base, expiration_offset, candidates.len());
    if long_index <= short_index {
        long_index = short_index + 1;
    }

    let short = candidates[short_index];
    let long = candidates.get(long_index).copied().ok_or_else(|| {
        no_suitable(format!(
            "no later expiration after {} for the long leg (offset {expiration_offset})",
            short.date()
        ))
    })?;

    if short.trading_days() >= long.trading_days() {
        return Err(no_suitable(format!(
            "{} and {} have the same trading days",
            short.date(),
            long.date()
        )));
    }

    Ok(ExpirationPair { short, long })
}

/// Entry within `tolerance` trading days of `target`, optionally restricted
/// to dates after `after`. The closest wins; ties keep listing order.
#[must_use]
pub fn find_near_trading_days(
    set: &ExpirationSet,
    target: u32,
    tolerance: u32,
    after: Option<NaiveDate>,
) -> Option<Expiration> {
    set.entries()
        .iter()
        .filter(|e| e.trading_days().abs_diff(target) <= tolerance)
        .filter(|e| after.is_none_or(|a| e.date() > a))
        .min_by_key(|e| e.trading_days().abs_diff(target))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn set_with_days(days: &[u32]) -> ExpirationSet {
        let base = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let entries = days
            .iter()
            .map(|d| Expiration::new(base + Duration::days(i64::from(*d)), *d))
            .collect();
        ExpirationSet::from_entries("SPY", entries)
    }

    fn days(pair: ExpirationPair) -> (u32, u32) {
        (pair.short.trading_days(), pair.long.trading_days())
    }

    #[test]
    fn picks_three_and_four_day_expirations() {
        let pair = select_expiration_pair(&set_with_days(&[2, 3, 4, 5]), 0).unwrap();
        assert_eq!(days(pair), (3, 4));
    }

    #[test]
    fn falls_back_within_windows() {
        let pair = select_expiration_pair(&set_with_days(&[0, 2, 5, 12]), 0).unwrap();
        assert_eq!(days(pair), (2, 5));
    }

    #[test]
    fn positive_offset_moves_both_legs_out() {
        let pair = select_expiration_pair(&set_with_days(&[1, 2, 3, 4, 5, 6]), 1).unwrap();
        assert_eq!(days(pair), (4, 5));
    }

    #[test]
    fn negative_offset_moves_both_legs_in() {
        let pair = select_expiration_pair(&set_with_days(&[1, 2, 3, 4, 5]), -1).unwrap();
        assert_eq!(days(pair), (2, 3));
    }

    #[test]
    fn large_negative_offset_clamps_and_separates_legs() {
        let pair = select_expiration_pair(&set_with_days(&[1, 2, 3, 4]), -10).unwrap();
        assert_eq!(days(pair), (1, 2));
    }

    #[test]
    fn offset_past_the_end_fails() {
        let err = select_expiration_pair(&set_with_days(&[2, 3, 4, 5]), 10).unwrap_err();
        assert!(matches!(err, SpreadError::NoSuitableExpirations { .. }));
    }

    #[test]
    fn single_expiration_is_insufficient() {
        let err = select_expiration_pair(&set_with_days(&[3]), 0).unwrap_err();
        assert!(matches!(
            err,
            SpreadError::InsufficientExpirations { available: 1, .. }
        ));
    }

    #[test]
    fn nothing_in_short_window_fails() {
        let err = select_expiration_pair(&set_with_days(&[1, 8, 9]), 0).unwrap_err();
        assert!(matches!(err, SpreadError::NoSuitableExpirations { .. }));
    }

    #[test]
    fn same_expiration_for_both_windows_uses_next_entry() {
        let pair = select_expiration_pair(&set_with_days(&[3, 7]), 0).unwrap();
        assert_eq!(days(pair), (3, 7));
    }

    #[test]
    fn near_search_respects_tolerance_and_order() {
        let set = set_with_days(&[1, 2, 3, 5, 9]);
        assert_eq!(find_near_trading_days(&set, 2, 1, None).unwrap().trading_days(), 2);
        assert_eq!(find_near_trading_days(&set, 4, 1, None).unwrap().trading_days(), 3);
        assert!(find_near_trading_days(&set, 7, 1, None).is_none());

        let after = set.entries()[2].date();
        assert_eq!(
            find_near_trading_days(&set, 4, 1, Some(after))
                .unwrap()
                .trading_days(),
            5
        );
    }
}
