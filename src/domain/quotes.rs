use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::elements::{ElementType, MeasurementUnit};

pub const WASTE_DISPOSAL_DESCRIPTION: &str = "Waste Disposal & Site Cleanup";

/// One priced row of a quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLineItem {
    pub element_type: ElementType,
    pub description: String,
    pub quantity: Decimal,
    pub unit: MeasurementUnit,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Element left out of a quote because the rate card has no matching item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedElement {
    /// Position in the input element list
    pub index: usize,
    pub element_type: ElementType,
    pub unit: MeasurementUnit,
}

/// Pricing adjustment applied to the subtotal before margin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedAdjustment {
    pub name: String,
    pub multiplier: Decimal,
    /// Subtotal after this adjustment
    pub amount: Decimal,
}

/// Calculator output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedQuote {
    pub subtotal: Decimal,
    /// Equal to `subtotal` unless adjustments were applied
    pub adjusted_subtotal: Decimal,
    pub profit: Decimal,
    pub total: Decimal,
    pub low_estimate: Decimal,
    pub high_estimate: Decimal,
    pub currency: String,
    pub line_items: Vec<QuoteLineItem>,
    #[serde(default)]
    pub skipped_elements: Vec<SkippedElement>,
    #[serde(default)]
    pub adjustments: Vec<AppliedAdjustment>,
}

impl GeneratedQuote {
    pub fn is_partial(&self) -> bool {
        !self.skipped_elements.is_empty()
    }

    pub fn waste_disposal_line(&self) -> Option<&QuoteLineItem> {
        self.line_items
            .last()
            .filter(|item| item.description == WASTE_DISPOSAL_DESCRIPTION)
    }
}

/// Design concept whose elements are priced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    pub id: Uuid,
    pub organisation_id: Uuid,
    #[serde(default)]
    pub elements: Vec<super::DesignElement>,
    pub created_at: DateTime<Utc>,
}

impl Design {
    pub fn new(organisation_id: Uuid, elements: Vec<super::DesignElement>) -> Self {
        Self {
            id: Uuid::new_v4(),
            organisation_id,
            elements,
            created_at: Utc::now(),
        }
    }
}

/// Persisted quote for a design concept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredQuote {
    pub id: Uuid,
    pub design_id: Uuid,
    pub organisation_id: Uuid,
    pub quote: GeneratedQuote,
    pub created_at: DateTime<Utc>,
}

impl StoredQuote {
    pub fn new(design_id: Uuid, organisation_id: Uuid, quote: GeneratedQuote) -> Self {
        Self {
            id: Uuid::new_v4(),
            design_id,
            organisation_id,
            quote,
            created_at: Utc::now(),
        }
    }
}
