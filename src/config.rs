use anyhow::{anyhow, bail, Result};
use std::env;

use crate::pricing::{LineRounding, QuoteCalculator, DEFAULT_CURRENCY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Pricing
    pub currency: String,
    pub line_rounding: LineRounding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            currency: DEFAULT_CURRENCY.to_string(),
            line_rounding: LineRounding::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Environment::from_str(&lookup("ENV").unwrap_or_else(|| "dev".to_string()));

        let currency = lookup("QUOTE_CURRENCY")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("QUOTE_CURRENCY must be a 3-letter currency code, got {:?}", currency);
        }

        let line_rounding = match lookup("QUOTE_LINE_ROUNDING") {
            Some(value) => value
                .parse::<LineRounding>()
                .map_err(|e| anyhow!("QUOTE_LINE_ROUNDING: {}", e))?,
            None => LineRounding::default(),
        };

        Ok(Settings {
            env,
            currency,
            line_rounding,
        })
    }

    /// Calculator configured with these settings
    pub fn calculator(&self) -> QuoteCalculator {
        QuoteCalculator::new(&self.currency).with_rounding(self.line_rounding)
    }
}
