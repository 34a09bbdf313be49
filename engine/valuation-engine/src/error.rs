//! Error types for position valuation

use thiserror::Error;

/// Result type for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors that make a single position's profit undefined.
///
/// These are per-position: the owning group degrades, every other position
/// in the portfolio is still valued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error("unknown calculation mode: {0}")]
    UnknownCalculationMode(u8),

    #[error("unsupported price digits: {0}")]
    InvalidDigits(u8),

    #[error("invalid trade side: {0}")]
    InvalidSide(u8),

    #[error("conversion rate for {0} is zero")]
    ZeroConversionRate(String),

    #[error("non-finite profit for position {0}")]
    NonFiniteResult(i64),
}
