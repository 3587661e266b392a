//! Unified error handling
//!
//! Every caller-facing failure maps to a stable code and a public message.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// No element of the design matched the rate card
    #[error("Unpriced: {0}")]
    Unpriced(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl QuoteError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unpriced(_) => "UNPRICED_DESIGN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::Validation(msg)
            | Self::Unpriced(msg) => msg.clone(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Internal(e) => tracing::error!(error = ?e, "Internal error"),
            _ => tracing::warn!(error = %self, "Quote error"),
        }

        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
        }
    }
}

pub type QuoteResult<T> = Result<T, QuoteError>;
