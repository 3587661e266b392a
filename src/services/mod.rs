//! Service layer: storage and the quote workflow built on the calculator.

pub mod quotes;
pub mod store;

pub use quotes::{quote_from_json, validate_inputs, QuoteOptions, QuoteService};
pub use store::{DesignRepository, InMemoryStore, QuoteRepository, RateCardRepository};
