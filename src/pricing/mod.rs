//! Quote pricing
//!
//! Pure arithmetic over rate cards and design elements. Nothing in here does
//! I/O or holds state.

pub mod adjustments;
pub mod calculator;
pub mod money;

pub use adjustments::{
    complexity_multiplier, seasonal_adjustment, ComplexityAdjustment, PriceAdjustment,
    SeasonalAdjustment,
};
pub use calculator::{generate_quote, LineRounding, QuoteCalculator, DEFAULT_CURRENCY};
pub use money::round2;
