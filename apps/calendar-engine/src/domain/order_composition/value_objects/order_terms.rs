//! Order sides, types, durations and classes.

use serde::{Deserialize, Serialize};

/// Order side as the brokerage names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    /// Buy equity.
    Buy,
    /// Sell equity.
    Sell,
    /// Sell equity short.
    SellShort,
    /// Cover a short equity position.
    BuyToCover,
    /// Open a long option position.
    BuyToOpen,
    /// Open a short option position.
    SellToOpen,
    /// Close a short option position.
    BuyToClose,
    /// Close a long option position.
    SellToClose,
}

impl OrderSide {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::SellShort => "sell_short",
            Self::BuyToCover => "buy_to_cover",
            Self::BuyToOpen => "buy_to_open",
            Self::SellToOpen => "sell_to_open",
            Self::BuyToClose => "buy_to_close",
            Self::SellToClose => "sell_to_close",
        }
    }

    /// Whether this side applies to option contracts.
    #[must_use]
    pub const fn is_option_side(self) -> bool {
        matches!(
            self,
            Self::BuyToOpen | Self::SellToOpen | Self::BuyToClose | Self::SellToClose
        )
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop order.
    Stop,
    /// Stop-limit order.
    StopLimit,
    /// Multileg net debit.
    Debit,
    /// Multileg net credit.
    Credit,
    /// Multileg even.
    Even,
}

impl OrderType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
            Self::StopLimit => "stop_limit",
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Even => "even",
        }
    }

    /// Whether a limit price is required.
    #[must_use]
    pub const fn requires_price(self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::Debit | Self::Credit)
    }

    /// Whether a stop price is required.
    #[must_use]
    pub const fn requires_stop(self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }

    /// Types valid for a single-leg order.
    #[must_use]
    pub const fn is_single_leg(self) -> bool {
        matches!(self, Self::Market | Self::Limit | Self::Stop | Self::StopLimit)
    }

    /// Types valid for a multileg order.
    #[must_use]
    pub const fn is_multileg(self) -> bool {
        matches!(
            self,
            Self::Market | Self::Limit | Self::Debit | Self::Credit | Self::Even
        )
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(Self::Market),
            "limit" => Ok(Self::Limit),
            "stop" => Ok(Self::Stop),
            "stop_limit" => Ok(Self::StopLimit),
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            "even" => Ok(Self::Even),
            other => Err(format!("unknown order type: {other}")),
        }
    }
}

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDuration {
    /// Good for the regular session.
    #[default]
    Day,
    /// Good till cancelled.
    Gtc,
    /// Pre-market session.
    Pre,
    /// Post-market session.
    Post,
}

impl OrderDuration {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Gtc => "gtc",
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for OrderDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "gtc" => Ok(Self::Gtc),
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            other => Err(format!("unknown duration: {other}")),
        }
    }
}

/// Order class as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderClass {
    /// Single equity order.
    Equity,
    /// Single option order.
    Option,
    /// Multi-leg option order.
    Multileg,
    /// One-triggers-other.
    Oto,
    /// One-cancels-other.
    Oco,
    /// One-triggers-one-cancels-other.
    Otoco,
}

impl OrderClass {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Option => "option",
            Self::Multileg => "multileg",
            Self::Oto => "oto",
            Self::Oco => "oco",
            Self::Otoco => "otoco",
        }
    }
}

impl std::fmt::Display for OrderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
