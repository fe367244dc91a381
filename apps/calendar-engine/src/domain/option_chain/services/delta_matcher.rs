//! Delta Matcher
//!
//! Picks the contract whose delta sits closest to a signed target. Calls
//! target `+d`, puts target `-d`. Contracts whose delta sign disagrees with
//! the option type are never selected, so a missing delta (read as 0) only
//! matters when a fallback estimator supplies one.

use crate::domain::option_chain::services::greeks_estimator::DeltaEstimator;
use crate::domain::option_chain::value_objects::{OptionContract, OptionType};

/// Signed delta target for `option_type`.
#[must_use]
pub fn signed_target(target_delta: f64, option_type: OptionType) -> f64 {
    target_delta.abs() * option_type.delta_sign()
}

/// Delta used for ranking: live delta, else the estimate, else 0.
fn effective_delta(contract: &OptionContract, fallback: Option<&DeltaEstimator>) -> f64 {
    contract
        .delta()
        .or_else(|| fallback.and_then(|est| est.estimate(contract)))
        .unwrap_or(0.0)
}

fn sign_agrees(delta: f64, option_type: OptionType) -> bool {
    match option_type {
        OptionType::Call => delta > 0.0,
        OptionType::Put => delta < 0.0,
    }
}

/// Select the contract of `option_type` closest to `target_delta`.
///
/// `target_delta` is a magnitude in (0, 1). Ties keep chain order. Returns
/// `None` when no contract of the right type has a delta of the right sign.
#[must_use]
pub fn find_closest_delta<'a>(
    chain: &'a [OptionContract],
    target_delta: f64,
    option_type: OptionType,
    fallback: Option<&DeltaEstimator>,
) -> Option<&'a OptionContract> {
    rank_by_delta(chain, target_delta, option_type, fallback)
        .into_iter()
        .next()
        .map(|(contract, _)| contract)
}

/// All sign-matching contracts of `option_type` with their effective delta,
/// ordered by distance from the signed target (stable).
#[must_use]
pub fn rank_by_delta<'a>(
    chain: &'a [OptionContract],
    target_delta: f64,
    option_type: OptionType,
    fallback: Option<&DeltaEstimator>,
) -> Vec<(&'a OptionContract, f64)> {
    let target = signed_target(target_delta, option_type);
    let mut ranked: Vec<(&OptionContract, f64)> = chain
        .iter()
        .filter(|c| c.option_type() == option_type)
        .map(|c| (c, effective_delta(c, fallback)))
        .filter(|(_, delta)| sign_agrees(*delta, option_type))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| (a - target).abs().total_cmp(&(b - target).abs()));
    ranked
}
