//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod build_calendar_spread;
mod close_calendar_spread;
mod estimate_next_day;
mod list_positions;
mod manage_orders;
mod open_calendar_spread;
mod preview_calendar_spread;
mod roll_calendar_spread;

pub use build_calendar_spread::{
    BuildCalendarSpreadUseCase, BuildSpreadError, BuilderConfig, DEFAULT_ALLOWED_UNDERLYINGS,
    DeltaFallback,
};
pub use close_calendar_spread::{
    CloseCalendarSpreadUseCase, CloseSpreadError, CloseSpreadRequest, CloseSpreadResponse,
    LegCloseOutcome,
};
pub use estimate_next_day::{EstimateNextDayUseCase, NEXT_DAY_TOLERANCE, NextDaySpreadEstimate};
pub use list_positions::{ListPositionsUseCase, PositionsView};
pub use manage_orders::ManageOrdersUseCase;
pub use open_calendar_spread::{
    OpenCalendarSpreadUseCase, OpenSpreadError, OpenSpreadRequest, OpenSpreadResponse,
};
pub use preview_calendar_spread::{PositionGreeks, PreviewCalendarSpreadUseCase, SpreadPreview};
pub use roll_calendar_spread::{
    RollCalendarSpreadUseCase, RollPhase, RollRequestError, RollSpreadResponse,
};
