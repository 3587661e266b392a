//! Tenant-scoped storage for rate cards, designs and quotes.
//!
//! The repository traits are what the quote service depends on; any
//! key-indexed store can back them. [`InMemoryStore`] keeps everything in
//! process behind a single lock and is shared by cloning.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Design, RateCard, StoredQuote};
use crate::error::{QuoteError, QuoteResult};

pub trait RateCardRepository: Send + Sync {
    /// The organisation's authoritative rate card (the first one stored)
    fn rate_card_for(&self, organisation_id: Uuid) -> QuoteResult<Option<RateCard>>;

    /// Insert, or replace the card with the same id
    fn save_rate_card(&self, card: RateCard) -> QuoteResult<RateCard>;
}

pub trait DesignRepository: Send + Sync {
    fn design(&self, design_id: Uuid) -> QuoteResult<Option<Design>>;

    fn save_design(&self, design: Design) -> QuoteResult<Design>;
}

pub trait QuoteRepository: Send + Sync {
    fn quote_for_design(&self, design_id: Uuid) -> QuoteResult<Option<StoredQuote>>;

    /// Store `quote` unless its design already has one, in which case
    /// `QuoteError::Conflict` is returned and nothing is written.
    fn insert_if_absent(&self, quote: StoredQuote) -> QuoteResult<StoredQuote>;

    /// Quotes of one organisation, oldest first
    fn quotes_for_organisation(&self, organisation_id: Uuid) -> QuoteResult<Vec<StoredQuote>>;
}

#[derive(Default)]
struct StoreInner {
    rate_cards: HashMap<Uuid, Vec<RateCard>>,
    designs: HashMap<Uuid, Design>,
    quotes: HashMap<Uuid, StoredQuote>,
}

/// In-process store
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateCardRepository for InMemoryStore {
    fn rate_card_for(&self, organisation_id: Uuid) -> QuoteResult<Option<RateCard>> {
        let inner = self.inner.read();
        Ok(inner
            .rate_cards
            .get(&organisation_id)
            .and_then(|cards| cards.first())
            .cloned())
    }

    fn save_rate_card(&self, card: RateCard) -> QuoteResult<RateCard> {
        let mut inner = self.inner.write();
        let cards = inner.rate_cards.entry(card.organisation_id).or_default();

        match cards.iter_mut().find(|existing| existing.id == card.id) {
            Some(existing) => *existing = card.clone(),
            None => cards.push(card.clone()),
        }

        debug!(
            rate_card_id = %card.id,
            organisation_id = %card.organisation_id,
            "Rate card saved"
        );
        Ok(card)
    }
}

impl DesignRepository for InMemoryStore {
    fn design(&self, design_id: Uuid) -> QuoteResult<Option<Design>> {
        Ok(self.inner.read().designs.get(&design_id).cloned())
    }

    fn save_design(&self, design: Design) -> QuoteResult<Design> {
        self.inner.write().designs.insert(design.id, design.clone());
        Ok(design)
    }
}

impl QuoteRepository for InMemoryStore {
    fn quote_for_design(&self, design_id: Uuid) -> QuoteResult<Option<StoredQuote>> {
        Ok(self.inner.read().quotes.get(&design_id).cloned())
    }

    fn insert_if_absent(&self, quote: StoredQuote) -> QuoteResult<StoredQuote> {
        let mut inner = self.inner.write();

        if inner.quotes.contains_key(&quote.design_id) {
            return Err(QuoteError::conflict(format!(
                "A quote already exists for design {}",
                quote.design_id
            )));
        }

        inner.quotes.insert(quote.design_id, quote.clone());
        Ok(quote)
    }

    fn quotes_for_organisation(&self, organisation_id: Uuid) -> QuoteResult<Vec<StoredQuote>> {
        let inner = self.inner.read();
        let mut quotes: Vec<StoredQuote> = inner
            .quotes
            .values()
            .filter(|quote| quote.organisation_id == organisation_id)
            .cloned()
            .collect();
        quotes.sort_by_key(|quote| quote.created_at);
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::generate_quote;
    use rust_decimal::Decimal;

    #[test]
    fn test_first_rate_card_is_authoritative() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        let first = RateCard::with_default_rates(org);
        let mut second = RateCard::with_default_rates(org);
        second.labour_rate_per_hour = Decimal::from(60);

        store.save_rate_card(first.clone()).unwrap();
        store.save_rate_card(second).unwrap();

        let found = store.rate_card_for(org).unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.rate_card_for(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_second_quote_for_design_conflicts() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        let design_id = Uuid::new_v4();
        let card = RateCard::with_default_rates(org);
        let quote = generate_quote(&[], &card);

        store
            .insert_if_absent(StoredQuote::new(design_id, org, quote.clone()))
            .unwrap();
        let err = store
            .insert_if_absent(StoredQuote::new(design_id, org, quote))
            .unwrap_err();

        assert!(matches!(err, QuoteError::Conflict(_)));
        assert_eq!(store.quotes_for_organisation(org).unwrap().len(), 1);
    }

    #[test]
    fn test_quotes_are_tenant_scoped() {
        let store = InMemoryStore::new();
        let (org_a, org_b) = (Uuid::new_v4(), Uuid::new_v4());
        let quote = generate_quote(&[], &RateCard::with_default_rates(org_a));

        store
            .insert_if_absent(StoredQuote::new(Uuid::new_v4(), org_a, quote.clone()))
            .unwrap();
        store
            .insert_if_absent(StoredQuote::new(Uuid::new_v4(), org_b, quote))
            .unwrap();

        assert_eq!(store.quotes_for_organisation(org_a).unwrap().len(), 1);
        assert_eq!(store.quotes_for_organisation(org_b).unwrap().len(), 1);
    }
}
