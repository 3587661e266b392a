//! Landscaping price quotes.
//!
//! [`pricing`] turns a design's elements and an organisation's rate card into a
//! line-itemised quote. [`services`] wraps it with storage, tenancy checks and
//! the one-quote-per-design rule.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod services;

pub use error::{QuoteError, QuoteResult};
pub use pricing::{generate_quote, QuoteCalculator};
