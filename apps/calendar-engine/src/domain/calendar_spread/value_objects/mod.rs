//! Calendar spread value objects.

mod calendar_spread;
mod spread_greeks;
mod spread_leg;
mod spread_request;

pub use calendar_spread::CalendarSpread;
pub use spread_greeks::SpreadGreeks;
pub use spread_leg::{LegRole, SpreadLeg};
pub use spread_request::SpreadRequest;
