//! Domain types and DTOs
//!
//! Rate cards, design elements and the quotes priced from them.

pub mod elements;
pub mod quotes;
pub mod rate_cards;

pub use elements::*;
pub use quotes::*;
pub use rate_cards::*;
