//! Spread Order Composer
//!
//! Turns calendar spreads and held legs into order payloads. Opening is a
//! single multileg order; closing is always two independent single-leg
//! orders because the brokerage's OCO validation requires both child orders
//! to share one option symbol, which a calendar spread never does.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::calendar_spread::{CalendarSpread, LegRole};
use crate::domain::option_chain::OptionType;
use crate::domain::order_composition::errors::OrderValidationError;
use crate::domain::order_composition::value_objects::{
    AdvancedKind, AdvancedOrder, MultilegOrder, OrderDuration, OrderLeg, OrderPayload, OrderType,
    SingleLegOrder,
};
use crate::domain::positions::{Position, SpreadLegs};

/// Tag for a newly opened spread: `{UNDERLYING}_{DELTA%}D_{TYPE}_CAL_{DATE}`.
#[must_use]
pub fn open_tag(
    underlying: &str,
    target_delta: f64,
    option_type: OptionType,
    date: NaiveDate,
) -> String {
    format!(
        "{}_{:.0}D_{}_CAL_{}",
        underlying.to_ascii_uppercase(),
        target_delta * 100.0,
        option_type,
        date.format("%Y-%m-%d")
    )
}

/// Tag for a closing order on `role`'s leg.
#[must_use]
pub fn close_tag(role: LegRole, date: NaiveDate) -> String {
    let leg = match role {
        LegRole::Short => "SHORT",
        LegRole::Long => "LONG",
    };
    format!("CLOSE_{leg}_{}", date.format("%Y-%m-%d"))
}

/// Options for an opening order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrderOptions {
    /// Spreads to open.
    pub quantity: Decimal,
    /// Net limit price; market order when absent.
    pub price: Option<Decimal>,
    /// Time in force.
    pub duration: OrderDuration,
    /// Client tag.
    pub tag: Option<String>,
}

impl OpenOrderOptions {
    /// Market day order for `quantity` spreads.
    #[must_use]
    pub const fn market(quantity: Decimal) -> Self {
        Self {
            quantity,
            price: None,
            duration: OrderDuration::Day,
            tag: None,
        }
    }

    /// Limit at `price`.
    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the time in force.
    #[must_use]
    pub const fn with_duration(mut self, duration: OrderDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Independent closing orders for the held legs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClosingOrders {
    /// Buy-to-close for the short leg.
    pub short: Option<SingleLegOrder>,
    /// Sell-to-close for the long leg.
    pub long: Option<SingleLegOrder>,
}

impl ClosingOrders {
    /// Orders in submission order (short first).
    #[must_use]
    pub fn into_payloads(self) -> Vec<OrderPayload> {
        self.short
            .into_iter()
            .chain(self.long)
            .map(OrderPayload::Single)
            .collect()
    }

    /// Whether there is nothing to close.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.short.is_none() && self.long.is_none()
    }
}

/// Multileg opening order: short `sell_to_open`, long `buy_to_open`.
pub fn compose_open(
    spread: &CalendarSpread,
    options: &OpenOrderOptions,
) -> Result<OrderPayload, OrderValidationError> {
    let legs = [LegRole::Short, LegRole::Long]
        .into_iter()
        .map(|role| OrderLeg {
            option_symbol: spread.leg(role).contract().symbol().to_string(),
            side: role.opening_side(),
            quantity: options.quantity,
        })
        .collect();

    let order = MultilegOrder {
        symbol: spread.underlying().to_string(),
        order_type: if options.price.is_some() {
            OrderType::Limit
        } else {
            OrderType::Market
        },
        duration: options.duration,
        price: options.price,
        legs,
        tag: options.tag.clone(),
    };
    let payload = OrderPayload::Multileg(order);
    payload.validate()?;
    Ok(payload)
}

fn close_leg(
    position: &Position,
    role: LegRole,
    requested: Decimal,
    date: NaiveDate,
) -> Result<SingleLegOrder, OrderValidationError> {
    let quantity = requested.min(position.held());
    let order = SingleLegOrder::option_market(
        position.underlying(),
        position.symbol.clone(),
        role.closing_side(),
        quantity,
    )
    .with_tag(close_tag(role, date));
    order.validate()?;
    Ok(order)
}

/// Two independent closing orders, each for `min(requested, |held|)`.
/// A missing leg yields no order for that leg.
pub fn compose_close(
    legs: &SpreadLegs,
    requested: Decimal,
    date: NaiveDate,
) -> Result<ClosingOrders, OrderValidationError> {
    if requested <= Decimal::ZERO {
        return Err(OrderValidationError::InvalidQuantity {
            quantity: requested,
        });
    }
    Ok(ClosingOrders {
        short: legs
            .short
            .as_ref()
            .map(|p| close_leg(p, LegRole::Short, requested, date))
            .transpose()?,
        long: legs
            .long
            .as_ref()
            .map(|p| close_leg(p, LegRole::Long, requested, date))
            .transpose()?,
    })
}

/// Closing both legs as one OCO group.
///
/// Composed and validated locally so the rejection happens before any
/// submission: legs of a calendar spread never share an option symbol.
pub fn compose_close_oco(
    legs: &SpreadLegs,
    requested: Decimal,
    date: NaiveDate,
) -> Result<OrderPayload, OrderValidationError> {
    let (Some(short), Some(long)) = (&legs.short, &legs.long) else {
        return Err(OrderValidationError::MissingField {
            field: "both short and long positions are required for OCO".to_string(),
        });
    };
    let mut short_order = close_leg(short, LegRole::Short, requested, date)?;
    short_order.order_type = OrderType::Limit;
    short_order.price = Some(Decimal::new(1, 2));
    let long_order = close_leg(long, LegRole::Long, requested, date)?;

    let payload = OrderPayload::Advanced(AdvancedOrder {
        kind: AdvancedKind::Oco,
        orders: vec![short_order, long_order],
        tag: None,
    });
    payload.validate()?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::option_chain::{Expiration, OptionContract};
    use crate::domain::order_composition::value_objects::{OrderClass, OrderSide};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn spread() -> CalendarSpread {
        CalendarSpread::new(
            OptionContract::new("SPY240118C00450000", "SPY", dec!(450), date(18), OptionType::Call),
            OptionContract::new("SPY240119C00450000", "SPY", dec!(450), date(19), OptionType::Call),
            Expiration::new(date(18), 3),
            Expiration::new(date(19), 4),
        )
        .unwrap()
    }

    fn held_legs(short_qty: Decimal, long_qty: Decimal) -> SpreadLegs {
        SpreadLegs {
            short: Some(Position::new("SPY240118C00450000", short_qty)),
            long: Some(Position::new("SPY240119C00450000", long_qty)),
        }
    }

    #[test]
    fn open_tag_format() {
        assert_eq!(
            open_tag("spy", 0.35, OptionType::Call, date(15)),
            "SPY_35D_CALL_CAL_2024-01-15"
        );
        assert_eq!(close_tag(LegRole::Long, date(15)), "CLOSE_LONG_2024-01-15");
    }

    #[test]
    fn open_is_two_leg_multileg() {
        let payload = compose_open(&spread(), &OpenOrderOptions::market(dec!(3))).unwrap();
        let OrderPayload::Multileg(order) = payload else {
            panic!("expected multileg");
        };
        assert_eq!(order.symbol, "SPY");
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.legs.len(), 2);
        assert_eq!(order.legs[0].option_symbol, "SPY240118C00450000");
        assert_eq!(order.legs[0].side, OrderSide::SellToOpen);
        assert_eq!(order.legs[1].option_symbol, "SPY240119C00450000");
        assert_eq!(order.legs[1].side, OrderSide::BuyToOpen);
        assert!(order.legs.iter().all(|l| l.quantity == dec!(3)));
    }

    #[test]
    fn open_with_price_is_limit() {
        let options = OpenOrderOptions::market(dec!(1))
            .with_price(dec!(0.45))
            .with_duration(OrderDuration::Gtc)
            .with_tag("SPY_35D_CALL_CAL_2024-01-15");
        let payload = compose_open(&spread(), &options).unwrap();
        let OrderPayload::Multileg(order) = payload else {
            panic!("expected multileg");
        };
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.price, Some(dec!(0.45)));
        assert_eq!(order.duration, OrderDuration::Gtc);
    }

    #[test]
    fn open_rejects_zero_quantity() {
        assert!(compose_open(&spread(), &OpenOrderOptions::market(Decimal::ZERO)).is_err());
    }

    #[test]
    fn close_caps_quantity_at_held() {
        let orders = compose_close(&held_legs(dec!(-2), dec!(2)), dec!(5), date(15)).unwrap();
        let short = orders.short.unwrap();
        assert_eq!(short.side, OrderSide::BuyToClose);
        assert_eq!(short.quantity, dec!(2));
        assert_eq!(short.tag.as_deref(), Some("CLOSE_SHORT_2024-01-15"));
        assert_eq!(short.class(), OrderClass::Option);
        let long = orders.long.unwrap();
        assert_eq!(long.side, OrderSide::SellToClose);
        assert_eq!(long.quantity, dec!(2));
    }

    #[test]
    fn close_skips_missing_leg() {
        let legs = SpreadLegs {
            short: None,
            long: Some(Position::new("SPY240119C00450000", dec!(1))),
        };
        let payloads = compose_close(&legs, dec!(1), date(15))
            .unwrap()
            .into_payloads();
        assert_eq!(payloads.len(), 1);
        assert!(compose_close(&SpreadLegs::default(), dec!(1), date(15)).unwrap().is_empty());
    }

    #[test]
    fn oco_close_is_rejected_before_submission() {
        let err = compose_close_oco(&held_legs(dec!(-1), dec!(1)), dec!(1), date(15)).unwrap_err();
        assert!(matches!(err, OrderValidationError::OcoSymbolMismatch { .. }));

        let err = compose_close_oco(&SpreadLegs::default(), dec!(1), date(15)).unwrap_err();
        assert!(matches!(err, OrderValidationError::MissingField { .. }));
    }

    proptest! {
        #[test]
        fn close_never_emits_oco(short in -50i64..0, long in 1i64..50, requested in 1i64..60) {
            let legs = held_legs(Decimal::from(short), Decimal::from(long));
            let payloads = compose_close(&legs, Decimal::from(requested), date(15))
                .unwrap()
                .into_payloads();
            prop_assert_eq!(payloads.len(), 2);
            for payload in payloads {
                prop_assert!(!payload.is_oco());
                prop_assert_eq!(payload.class(), OrderClass::Option);
            }
        }
    }
}
