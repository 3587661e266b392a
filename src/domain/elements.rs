use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QuoteError, QuoteResult};

/// Largest quantity accepted on a single element
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Landscaping feature category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Patio,
    Decking,
    Turf,
    Planting,
    Pathway,
    WaterFeature,
    Pergola,
    Fencing,
    Lighting,
    FirePit,
    RetainingWall,
    Other,
}

impl ElementType {
    /// Label used as the start of a quote line description
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patio => "Patio Installation",
            Self::Decking => "Decking Installation",
            Self::Turf => "Turf Laying",
            Self::Planting => "Planting Scheme",
            Self::Pathway => "Garden Pathway",
            Self::WaterFeature => "Water Feature",
            Self::Pergola => "Pergola Construction",
            Self::Fencing => "Fencing",
            Self::Lighting => "Garden Lighting",
            Self::FirePit => "Fire Pit",
            Self::RetainingWall => "Retaining Wall",
            Self::Other => "Additional Works",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patio => "PATIO",
            Self::Decking => "DECKING",
            Self::Turf => "TURF",
            Self::Planting => "PLANTING",
            Self::Pathway => "PATHWAY",
            Self::WaterFeature => "WATER_FEATURE",
            Self::Pergola => "PERGOLA",
            Self::Fencing => "FENCING",
            Self::Lighting => "LIGHTING",
            Self::FirePit => "FIRE_PIT",
            Self::RetainingWall => "RETAINING_WALL",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement basis of an element quantity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementUnit {
    /// Area in square metres
    Sqm,
    /// Length in linear metres
    LinearM,
    /// Discrete count
    Unit,
}

impl MeasurementUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqm => "SQM",
            Self::LinearM => "LINEAR_M",
            Self::Unit => "UNIT",
        }
    }

    /// Quantity annotation appended to a line description.
    ///
    /// Counts of one or less carry no annotation.
    pub fn annotate(&self, quantity: Decimal) -> Option<String> {
        let q = quantity.normalize();
        match self {
            Self::Sqm => Some(format!("({}m²)", q)),
            Self::LinearM => Some(format!("({}m linear)", q)),
            Self::Unit if quantity > Decimal::ONE => Some(format!("({} units)", q)),
            Self::Unit => None,
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantified feature attached to a design concept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignElement {
    pub element_type: ElementType,
    pub quantity: Decimal,
    pub unit: MeasurementUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DesignElement {
    pub fn new(element_type: ElementType, quantity: Decimal, unit: MeasurementUnit) -> Self {
        Self {
            element_type,
            quantity,
            unit,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn validate(&self) -> QuoteResult<()> {
        if self.quantity < Decimal::ZERO {
            return Err(QuoteError::validation(format!(
                "{} quantity must not be negative (got {})",
                self.element_type, self.quantity
            )));
        }
        if self.quantity > Decimal::from(MAX_QUANTITY) {
            return Err(QuoteError::validation(format!(
                "{} quantity must not exceed {} (got {})",
                self.element_type, MAX_QUANTITY, self.quantity
            )));
        }
        Ok(())
    }
}
