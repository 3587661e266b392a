//! Optional pricing adjustments
//!
//! Neither the complexity multiplier nor seasonal pricing is applied by
//! [`generate_quote`](super::generate_quote). Callers opt in by passing
//! adjustments to [`QuoteCalculator::generate_adjusted`](super::QuoteCalculator::generate_adjusted),
//! which multiplies the subtotal by each one in turn before the margin is added.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::domain::{DesignElement, ElementType};

const LARGE_QUANTITY_THRESHOLD: i64 = 50;

/// Peak season runs March to September inclusive
const PEAK_MONTHS: std::ops::RangeInclusive<u32> = 3..=9;

fn type_weight(element_type: ElementType) -> Decimal {
    match element_type {
        ElementType::WaterFeature => Decimal::new(30, 2),
        ElementType::Pergola => Decimal::new(20, 2),
        ElementType::Lighting => Decimal::new(15, 2),
        ElementType::FirePit => Decimal::new(25, 2),
        _ => Decimal::ZERO,
    }
}

/// Dimensionless job-complexity multiplier in the range 1.0..=1.5
pub fn complexity_multiplier(elements: &[DesignElement]) -> Decimal {
    let per_element = Decimal::new(1, 1);
    let large_quantity = Decimal::new(1, 1);
    let threshold = Decimal::from(LARGE_QUANTITY_THRESHOLD);

    let score: Decimal = elements
        .iter()
        .map(|element| {
            let mut weight = per_element + type_weight(element.element_type);
            if element.quantity > threshold {
                weight += large_quantity;
            }
            weight
        })
        .sum();

    (Decimal::ONE + score).min(Decimal::new(15, 1))
}

/// Whether a calendar month (1-12) is in the March to September peak
pub fn is_peak_season(month: u32) -> bool {
    PEAK_MONTHS.contains(&month)
}

/// Seasonal price for `base_price` in `month`. Months outside 1-12 are
/// treated as off-peak.
pub fn seasonal_adjustment(base_price: Decimal, month: u32) -> Decimal {
    base_price * seasonal_multiplier(month)
}

fn seasonal_multiplier(month: u32) -> Decimal {
    if is_peak_season(month) {
        Decimal::new(110, 2)
    } else {
        Decimal::new(95, 2)
    }
}

/// A multiplicative adjustment to a quote subtotal
pub trait PriceAdjustment: Send + Sync {
    fn name(&self) -> &str;

    fn multiplier(&self) -> Decimal;

    fn apply(&self, amount: Decimal) -> Decimal {
        amount * self.multiplier()
    }
}

/// Complexity surcharge derived from a design's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityAdjustment {
    multiplier: Decimal,
}

impl ComplexityAdjustment {
    pub fn from_elements(elements: &[DesignElement]) -> Self {
        Self {
            multiplier: complexity_multiplier(elements),
        }
    }
}

impl PriceAdjustment for ComplexityAdjustment {
    fn name(&self) -> &str {
        "complexity"
    }

    fn multiplier(&self) -> Decimal {
        self.multiplier
    }
}

/// Peak or off-peak pricing for the month the work is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalAdjustment {
    month: u32,
}

impl SeasonalAdjustment {
    pub fn for_month(month: u32) -> Self {
        Self { month }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self { month: date.month() }
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl PriceAdjustment for SeasonalAdjustment {
    fn name(&self) -> &str {
        if is_peak_season(self.month) {
            "seasonal_peak"
        } else {
            "seasonal_off_peak"
        }
    }

    fn multiplier(&self) -> Decimal {
        seasonal_multiplier(self.month)
    }
}
