use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::elements::{ElementType, MeasurementUnit};
use crate::error::{QuoteError, QuoteResult};

/// Largest rate, cost or labour-hour figure a rate card may hold
pub const MAX_RATE: i64 = 1_000_000;

/// Per-(element type, unit) pricing rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateItem {
    pub element_type: ElementType,
    pub unit: MeasurementUnit,
    pub base_material_cost: Decimal,
    pub base_labour_hours_per_unit: Decimal,
}

impl RateItem {
    pub fn new(
        element_type: ElementType,
        unit: MeasurementUnit,
        base_material_cost: Decimal,
        base_labour_hours_per_unit: Decimal,
    ) -> Self {
        Self {
            element_type,
            unit,
            base_material_cost,
            base_labour_hours_per_unit,
        }
    }

    fn matches(&self, element_type: ElementType, unit: MeasurementUnit) -> bool {
        self.element_type == element_type && self.unit == unit
    }
}

/// Organisation-scoped pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateCard {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub organisation_id: Uuid,
    pub labour_rate_per_hour: Decimal,
    pub default_profit_margin_percent: Decimal,
    pub waste_disposal_rate: Decimal,
    /// Carried for travel surcharges; the calculator does not read it
    #[serde(default)]
    pub travel_cost_per_mile: Decimal,
    #[serde(default)]
    pub rate_items: Vec<RateItem>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RateCard {
    pub fn new(
        organisation_id: Uuid,
        labour_rate_per_hour: Decimal,
        default_profit_margin_percent: Decimal,
        waste_disposal_rate: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organisation_id,
            labour_rate_per_hour,
            default_profit_margin_percent,
            waste_disposal_rate,
            travel_cost_per_mile: Decimal::ZERO,
            rate_items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_rate_item(mut self, item: RateItem) -> Self {
        self.upsert_rate_item(item);
        self
    }

    /// Seed card used when an organisation is created
    pub fn with_default_rates(organisation_id: Uuid) -> Self {
        use ElementType::*;
        use MeasurementUnit::*;

        // (type, unit, material cost per unit, labour hours per unit)
        let defaults: [(ElementType, MeasurementUnit, i64, i64); 11] = [
            (Patio, Sqm, 5000, 200),
            (Decking, Sqm, 6500, 250),
            (Turf, Sqm, 1200, 30),
            (Planting, Sqm, 2500, 75),
            (Pathway, Sqm, 4000, 150),
            (WaterFeature, Unit, 120000, 1600),
            (Pergola, Unit, 180000, 2400),
            (Fencing, LinearM, 4500, 100),
            (Lighting, Unit, 8500, 50),
            (FirePit, Unit, 60000, 800),
            (RetainingWall, LinearM, 9000, 300),
        ];

        let mut card = Self::new(
            organisation_id,
            Decimal::from(45),
            Decimal::from(20),
            Decimal::from(150),
        );
        card.travel_cost_per_mile = Decimal::new(45, 2);
        card.rate_items = defaults
            .iter()
            .map(|&(element_type, unit, material, hours)| {
                RateItem::new(
                    element_type,
                    unit,
                    Decimal::new(material, 2),
                    Decimal::new(hours, 2),
                )
            })
            .collect();
        card
    }

    /// Exact match on both type and unit
    pub fn find_rate_item(
        &self,
        element_type: ElementType,
        unit: MeasurementUnit,
    ) -> Option<&RateItem> {
        self.rate_items
            .iter()
            .find(|item| item.matches(element_type, unit))
    }

    fn upsert_rate_item(&mut self, item: RateItem) {
        match self
            .rate_items
            .iter_mut()
            .find(|existing| existing.matches(item.element_type, item.unit))
        {
            Some(existing) => *existing = item,
            None => self.rate_items.push(item),
        }
    }

    pub fn validate(&self) -> QuoteResult<()> {
        let rates = [
            ("labour_rate_per_hour", self.labour_rate_per_hour),
            ("waste_disposal_rate", self.waste_disposal_rate),
            ("travel_cost_per_mile", self.travel_cost_per_mile),
        ];
        for (field, value) in rates {
            check_rate(field, value)?;
        }

        let margin = self.default_profit_margin_percent;
        if margin < Decimal::ZERO || margin > Decimal::ONE_HUNDRED {
            return Err(QuoteError::validation(format!(
                "default_profit_margin_percent must be between 0 and 100 (got {})",
                margin
            )));
        }

        let mut seen = HashSet::new();
        for item in &self.rate_items {
            if !seen.insert((item.element_type, item.unit)) {
                return Err(QuoteError::validation(format!(
                    "duplicate rate item for {} / {}",
                    item.element_type, item.unit
                )));
            }
            check_rate("base_material_cost", item.base_material_cost)?;
            check_rate("base_labour_hours_per_unit", item.base_labour_hours_per_unit)?;
        }

        Ok(())
    }

    /// Apply an explicit rate update. The card is left untouched when the
    /// updated values fail validation.
    pub fn apply_update(&mut self, req: UpdateRateCardRequest) -> QuoteResult<()> {
        let mut updated = self.clone();

        if let Some(rate) = req.labour_rate_per_hour {
            updated.labour_rate_per_hour = rate;
        }
        if let Some(margin) = req.default_profit_margin_percent {
            updated.default_profit_margin_percent = margin;
        }
        if let Some(rate) = req.waste_disposal_rate {
            updated.waste_disposal_rate = rate;
        }
        if let Some(rate) = req.travel_cost_per_mile {
            updated.travel_cost_per_mile = rate;
        }
        for item in req.rate_items {
            updated.upsert_rate_item(item);
        }

        updated.validate()?;
        updated.updated_at = Utc::now();
        *self = updated;
        Ok(())
    }
}

fn check_rate(field: &str, value: Decimal) -> QuoteResult<()> {
    if value < Decimal::ZERO {
        return Err(QuoteError::validation(format!(
            "{} must not be negative (got {})",
            field, value
        )));
    }
    if value > Decimal::from(MAX_RATE) {
        return Err(QuoteError::validation(format!(
            "{} must not exceed {} (got {})",
            field, MAX_RATE, value
        )));
    }
    Ok(())
}

/// Request DTO for updating a rate card
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRateCardRequest {
    #[serde(default)]
    pub labour_rate_per_hour: Option<Decimal>,
    #[serde(default)]
    pub default_profit_margin_percent: Option<Decimal>,
    #[serde(default)]
    pub waste_disposal_rate: Option<Decimal>,
    #[serde(default)]
    pub travel_cost_per_mile: Option<Decimal>,
    /// Upserted by (element type, unit)
    #[serde(default)]
    pub rate_items: Vec<RateItem>,
}
