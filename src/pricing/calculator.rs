//! Quote calculator
//!
//! A pure rollup of design elements against a rate card: each priced element
//! becomes a line item, a waste-disposal line closes the list, and the
//! subtotal, margin and ±15% estimate band are derived from the line totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::adjustments::PriceAdjustment;
use super::money::{percent_of, round2};
use crate::domain::{
    AppliedAdjustment, DesignElement, ElementType, GeneratedQuote, MeasurementUnit,
    QuoteLineItem, RateCard, RateItem, SkippedElement, WASTE_DISPOSAL_DESCRIPTION,
};

pub const DEFAULT_CURRENCY: &str = "GBP";

/// Half-width of the estimate band, in percent
const ESTIMATE_BAND_PERCENT: i64 = 15;

/// How unit price and line total are rounded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineRounding {
    /// Unit price and line total rounded separately from the unrounded
    /// per-unit cost. `unit_price × quantity` may differ from `line_total`.
    #[default]
    Independent,
    /// Line total rounded first, unit price derived from it for display
    Consistent,
}

impl FromStr for LineRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "independent" | "legacy" => Ok(Self::Independent),
            "consistent" => Ok(Self::Consistent),
            other => Err(format!(
                "unknown line rounding {:?}, expected 'independent' or 'consistent'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteCalculator {
    currency: String,
    rounding: LineRounding,
}

impl Default for QuoteCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl QuoteCalculator {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            rounding: LineRounding::default(),
        }
    }

    pub fn with_rounding(mut self, rounding: LineRounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn rounding(&self) -> LineRounding {
        self.rounding
    }

    /// Price `elements` against `rate_card`.
    ///
    /// Elements without an exactly matching rate item are left out and listed
    /// in `skipped_elements`; the quote is still produced.
    pub fn generate(&self, elements: &[DesignElement], rate_card: &RateCard) -> GeneratedQuote {
        self.generate_adjusted(elements, rate_card, &[])
    }

    /// Price `elements`, then apply `adjustments` in order to the subtotal
    /// before the margin is added.
    pub fn generate_adjusted(
        &self,
        elements: &[DesignElement],
        rate_card: &RateCard,
        adjustments: &[&dyn PriceAdjustment],
    ) -> GeneratedQuote {
        let mut line_items = Vec::with_capacity(elements.len() + 1);
        let mut skipped_elements = Vec::new();

        for (index, element) in elements.iter().enumerate() {
            match rate_card.find_rate_item(element.element_type, element.unit) {
                Some(rate_item) => {
                    line_items.push(self.price_element(element, rate_item, rate_card))
                }
                None => {
                    tracing::warn!(
                        index,
                        element_type = %element.element_type,
                        unit = %element.unit,
                        rate_card_id = %rate_card.id,
                        "No rate item for element, leaving it out of the quote"
                    );
                    skipped_elements.push(SkippedElement {
                        index,
                        element_type: element.element_type,
                        unit: element.unit,
                    });
                }
            }
        }

        if !line_items.is_empty() {
            line_items.push(waste_disposal_line(rate_card));
        }

        let subtotal = round2(line_items.iter().map(|item| item.line_total).sum());

        let mut adjusted_subtotal = subtotal;
        let mut applied = Vec::with_capacity(adjustments.len());
        for adjustment in adjustments {
            adjusted_subtotal = round2(adjustment.apply(adjusted_subtotal));
            applied.push(AppliedAdjustment {
                name: adjustment.name().to_string(),
                multiplier: adjustment.multiplier(),
                amount: adjusted_subtotal,
            });
        }

        let profit = round2(percent_of(
            adjusted_subtotal,
            rate_card.default_profit_margin_percent,
        ));
        let total = round2(adjusted_subtotal + profit);
        let band = Decimal::from(ESTIMATE_BAND_PERCENT);
        let low_estimate = round2(percent_of(total, Decimal::ONE_HUNDRED - band));
        let high_estimate = round2(percent_of(total, Decimal::ONE_HUNDRED + band));

        tracing::debug!(
            line_items = line_items.len(),
            skipped = skipped_elements.len(),
            %subtotal,
            %total,
            "Quote calculated"
        );

        GeneratedQuote {
            subtotal,
            adjusted_subtotal,
            profit,
            total,
            low_estimate,
            high_estimate,
            currency: self.currency.clone(),
            line_items,
            skipped_elements,
            adjustments: applied,
        }
    }

    fn price_element(
        &self,
        element: &DesignElement,
        rate_item: &RateItem,
        rate_card: &RateCard,
    ) -> QuoteLineItem {
        let labour_per_unit = rate_item.base_labour_hours_per_unit * rate_card.labour_rate_per_hour;
        let material_cost = rate_item.base_material_cost * element.quantity;
        let labour_cost = labour_per_unit * element.quantity;
        let unit_cost = rate_item.base_material_cost + labour_per_unit;

        let line_total = round2(material_cost + labour_cost);
        let unit_price = match self.rounding {
            LineRounding::Consistent if element.quantity > Decimal::ZERO => {
                round2(line_total / element.quantity)
            }
            _ => round2(unit_cost),
        };

        QuoteLineItem {
            element_type: element.element_type,
            description: describe(element),
            quantity: element.quantity,
            unit: element.unit,
            unit_price,
            line_total,
        }
    }
}

/// Price `elements` against `rate_card` in the default currency
pub fn generate_quote(elements: &[DesignElement], rate_card: &RateCard) -> GeneratedQuote {
    QuoteCalculator::default().generate(elements, rate_card)
}

fn describe(element: &DesignElement) -> String {
    let mut description = element.element_type.label().to_string();

    if let Some(annotation) = element.unit.annotate(element.quantity) {
        description.push(' ');
        description.push_str(&annotation);
    }
    if let Some(note) = &element.note {
        description.push_str(" - ");
        description.push_str(note);
    }

    description
}

fn waste_disposal_line(rate_card: &RateCard) -> QuoteLineItem {
    let rate = rate_card.waste_disposal_rate;
    QuoteLineItem {
        element_type: ElementType::Other,
        description: WASTE_DISPOSAL_DESCRIPTION.to_string(),
        quantity: Decimal::ONE,
        unit: MeasurementUnit::Unit,
        unit_price: rate,
        line_total: rate,
    }
}
