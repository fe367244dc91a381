//! Position Classifier
//!
//! Partitions raw account positions into option legs and pairs short/long
//! legs into calendar spreads.

use serde::{Deserialize, Serialize};

use crate::domain::positions::value_objects::Position;

/// A short near leg matched with a long far leg at the same strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarPair {
    /// Short (near) leg.
    pub short: Position,
    /// Long (far) leg.
    pub long: Position,
}

/// Option positions of one underlying grouped into calendar pairs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifiedPositions {
    /// Matched calendar spreads.
    pub pairs: Vec<CalendarPair>,
    /// Short legs with no matching long leg.
    pub unpaired_short: Vec<Position>,
    /// Long legs with no matching short leg.
    pub unpaired_long: Vec<Position>,
}

/// The legs a close or roll acts on. Either may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpreadLegs {
    /// Short leg.
    pub short: Option<Position>,
    /// Long leg.
    pub long: Option<Position>,
}

impl SpreadLegs {
    /// Neither leg is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.short.is_none() && self.long.is_none()
    }
}

fn matches_underlying(position: &Position, underlying: &str) -> bool {
    match position.occ() {
        Some(occ) => occ.root.eq_ignore_ascii_case(underlying),
        None => position
            .symbol
            .to_ascii_uppercase()
            .starts_with(&underlying.to_ascii_uppercase()),
    }
}

/// Option positions, optionally restricted to one underlying.
#[must_use]
pub fn option_positions(positions: &[Position], underlying: Option<&str>) -> Vec<Position> {
    positions
        .iter()
        .filter(|p| p.is_option())
        .filter(|p| underlying.is_none_or(|u| matches_underlying(p, u)))
        .cloned()
        .collect()
}

fn is_calendar_pair(short: &Position, long: &Position) -> bool {
    match (short.occ(), long.occ()) {
        (Some(s), Some(l)) => {
            s.root == l.root
                && s.option_type == l.option_type
                && s.strike == l.strike
                && s.expiration < l.expiration
        }
        _ => false,
    }
}

/// Pair short and long option legs into calendar spreads.
///
/// Each short leg takes the first unused long leg with the same root,
/// option type and strike that expires later.
#[must_use]
pub fn classify(positions: &[Position], underlying: Option<&str>) -> ClassifiedPositions {
    let options = option_positions(positions, underlying);
    let shorts: Vec<&Position> = options.iter().filter(|p| p.is_short()).collect();
    let longs: Vec<&Position> = options.iter().filter(|p| p.is_long()).collect();

    let mut used = vec![false; longs.len()];
    let mut result = ClassifiedPositions::default();

    for short in shorts {
        let found = longs
            .iter()
            .enumerate()
            .find(|(i, long)| !used[*i] && is_calendar_pair(short, long));
        match found {
            Some((i, long)) => {
                used[i] = true;
                result.pairs.push(CalendarPair {
                    short: short.clone(),
                    long: (*long).clone(),
                });
            }
            None => result.unpaired_short.push(short.clone()),
        }
    }

    result.unpaired_long = longs
        .into_iter()
        .zip(used)
        .filter(|(_, used)| !used)
        .map(|(p, _)| p.clone())
        .collect();
    result
}

/// Legs to close for `underlying`: the first matched pair, otherwise the
/// first short and first long option positions found.
#[must_use]
pub fn legs_to_close(positions: &[Position], underlying: &str) -> SpreadLegs {
    let classified = classify(positions, Some(underlying));
    if let Some(pair) = classified.pairs.into_iter().next() {
        return SpreadLegs {
            short: Some(pair.short),
            long: Some(pair.long),
        };
    }
    SpreadLegs {
        short: classified.unpaired_short.into_iter().next(),
        long: classified.unpaired_long.into_iter().next(),
    }
}
