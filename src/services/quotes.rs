//! Quote generation for stored designs.
//!
//! Loads a design and its organisation's rate card, runs the calculator and
//! persists the result. Tenancy, the one-quote-per-design rule and input
//! validation are enforced here; the calculator assumes all three.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::store::{DesignRepository, QuoteRepository, RateCardRepository};
use crate::domain::{DesignElement, GeneratedQuote, RateCard, StoredQuote, UpdateRateCardRequest};
use crate::error::{QuoteError, QuoteResult};
use crate::pricing::{ComplexityAdjustment, PriceAdjustment, QuoteCalculator, SeasonalAdjustment};

/// Optional adjustments applied before margin
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteOptions {
    /// Month (1-12) the work is scheduled for
    pub seasonal_month: Option<u32>,
    pub apply_complexity: bool,
}

impl QuoteOptions {
    /// Adjustment chain for these options, complexity first
    pub fn adjustments(&self, elements: &[DesignElement]) -> Vec<Box<dyn PriceAdjustment>> {
        let mut adjustments: Vec<Box<dyn PriceAdjustment>> = Vec::new();
        if self.apply_complexity {
            adjustments.push(Box::new(ComplexityAdjustment::from_elements(elements)));
        }
        if let Some(month) = self.seasonal_month {
            adjustments.push(Box::new(SeasonalAdjustment::for_month(month)));
        }
        adjustments
    }
}

fn price(
    calculator: &QuoteCalculator,
    elements: &[DesignElement],
    rate_card: &RateCard,
    options: QuoteOptions,
) -> GeneratedQuote {
    let adjustments = options.adjustments(elements);
    let adjustments: Vec<&dyn PriceAdjustment> = adjustments.iter().map(|a| a.as_ref()).collect();
    calculator.generate_adjusted(elements, rate_card, &adjustments)
}

/// Price a rate card and element list supplied as JSON documents
pub fn quote_from_json(
    calculator: &QuoteCalculator,
    rate_card_json: &str,
    elements_json: &str,
    options: QuoteOptions,
) -> QuoteResult<GeneratedQuote> {
    let rate_card: RateCard = serde_json::from_str(rate_card_json)
        .map_err(|e| QuoteError::validation(format!("Invalid rate card JSON: {}", e)))?;
    let elements: Vec<DesignElement> = serde_json::from_str(elements_json)
        .map_err(|e| QuoteError::validation(format!("Invalid design elements JSON: {}", e)))?;

    validate_inputs(&elements, &rate_card)?;

    Ok(price(calculator, &elements, &rate_card, options))
}

#[derive(Clone)]
pub struct QuoteService<S> {
    store: S,
    calculator: QuoteCalculator,
}

impl<S> QuoteService<S>
where
    S: RateCardRepository + DesignRepository + QuoteRepository,
{
    pub fn new(store: S, calculator: QuoteCalculator) -> Self {
        Self { store, calculator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate and store the quote for a design
    #[instrument(skip(self))]
    pub fn generate_for_design(
        &self,
        organisation_id: Uuid,
        design_id: Uuid,
        options: QuoteOptions,
    ) -> QuoteResult<StoredQuote> {
        let design = self
            .store
            .design(design_id)?
            .ok_or_else(|| QuoteError::not_found("Design not found"))?;

        if design.organisation_id != organisation_id {
            return Err(QuoteError::forbidden(
                "Design belongs to another organisation",
            ));
        }

        if self.store.quote_for_design(design_id)?.is_some() {
            return Err(QuoteError::conflict(
                "A quote has already been generated for this design",
            ));
        }

        if design.elements.is_empty() {
            return Err(QuoteError::validation("Design has no elements to quote"));
        }

        let rate_card = self
            .store
            .rate_card_for(organisation_id)?
            .ok_or_else(|| QuoteError::not_found("No rate card configured for organisation"))?;

        validate_inputs(&design.elements, &rate_card)?;

        let quote = price(&self.calculator, &design.elements, &rate_card, options);

        if quote.line_items.is_empty() {
            return Err(QuoteError::Unpriced(format!(
                "None of the {} design elements match the rate card",
                design.elements.len()
            )));
        }

        if quote.is_partial() {
            warn!(
                design_id = %design_id,
                skipped = quote.skipped_elements.len(),
                "Quote is missing unpriced elements"
            );
        }

        let stored = self
            .store
            .insert_if_absent(StoredQuote::new(design_id, organisation_id, quote))?;

        info!(
            quote_id = %stored.id,
            design_id = %design_id,
            total = %stored.quote.total,
            currency = %stored.quote.currency,
            "Quote generated"
        );

        Ok(stored)
    }

    pub fn get_quote(&self, organisation_id: Uuid, design_id: Uuid) -> QuoteResult<StoredQuote> {
        let quote = self
            .store
            .quote_for_design(design_id)?
            .ok_or_else(|| QuoteError::not_found("Quote not found"))?;

        if quote.organisation_id != organisation_id {
            // Same answer as a missing quote so ids of other tenants don't leak
            return Err(QuoteError::not_found("Quote not found"));
        }

        Ok(quote)
    }

    pub fn list_quotes(&self, organisation_id: Uuid) -> QuoteResult<Vec<StoredQuote>> {
        self.store.quotes_for_organisation(organisation_id)
    }

    /// Apply a rate update to the organisation's rate card
    #[instrument(skip(self, req))]
    pub fn update_rates(
        &self,
        organisation_id: Uuid,
        req: UpdateRateCardRequest,
    ) -> QuoteResult<RateCard> {
        let mut card = self
            .store
            .rate_card_for(organisation_id)?
            .ok_or_else(|| QuoteError::not_found("No rate card configured for organisation"))?;

        card.apply_update(req)?;
        let card = self.store.save_rate_card(card)?;

        info!(
            rate_card_id = %card.id,
            rate_items = card.rate_items.len(),
            "Rate card updated"
        );

        Ok(card)
    }
}

/// Precondition checks the calculator relies on
pub fn validate_inputs(elements: &[DesignElement], rate_card: &RateCard) -> QuoteResult<()> {
    rate_card.validate()?;
    elements.iter().try_for_each(DesignElement::validate)
}
