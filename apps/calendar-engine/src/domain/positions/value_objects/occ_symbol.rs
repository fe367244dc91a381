//! OCC option symbol parsing.
//!
//! Format: root, `YYMMDD`, `C`/`P`, strike × 1000 padded to eight digits,
//! e.g. `SPY240119C00450000`. Space padding inside the root is tolerated.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::option_chain::OptionType;

/// Parsed components of an OCC option symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccSymbol {
    /// Root (underlying) symbol.
    pub root: String,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Decimal,
}

#[allow(clippy::expect_used)]
fn occ_regex() -> &'static Regex {
    static OCC_REGEX: OnceLock<Regex> = OnceLock::new();
    OCC_REGEX.get_or_init(|| {
        Regex::new(r"^(\w+?)(\d{6})([CP])(\d{8})$").expect("occ symbol regex is valid")
    })
}

/// Whether `symbol` looks like an OCC option symbol.
#[must_use]
pub fn is_occ_symbol(symbol: &str) -> bool {
    OccSymbol::parse(symbol).is_some()
}

impl OccSymbol {
    /// Parse `symbol`; `None` when it is not an OCC option symbol.
    #[must_use]
    pub fn parse(symbol: &str) -> Option<Self> {
        let compact: String = symbol.chars().filter(|c| !c.is_whitespace()).collect();
        let caps = occ_regex().captures(&compact)?;

        let root = caps.get(1)?.as_str().to_string();
        let date = caps.get(2)?.as_str();
        let expiration = NaiveDate::parse_from_str(date, "%y%m%d").ok()?;
        let option_type = match caps.get(3)?.as_str() {
            "C" => OptionType::Call,
            _ => OptionType::Put,
        };
        let strike_thousandths: i64 = caps.get(4)?.as_str().parse().ok()?;
        Some(Self {
            root,
            expiration,
            option_type,
            strike: Decimal::new(strike_thousandths, 3).normalize(),
        })
    }

    /// Compose the canonical compact symbol.
    #[must_use]
    pub fn to_symbol(&self) -> String {
        let thousandths = (self.strike * Decimal::ONE_THOUSAND).trunc().to_i64().unwrap_or(0);
        let type_char = match self.option_type {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        };
        format!(
            "{}{}{}{:08}",
            self.root,
            self.expiration.format("%y%m%d"),
            type_char,
            thousandths
        )
    }
}

impl std::fmt::Display for OccSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_symbol())
    }
}
