use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Terminal value undefined: discount rate {discount_rate} must exceed terminal growth rate {terminal_growth_rate}"
    )]
    TerminalValueUndefined {
        discount_rate: f64,
        terminal_growth_rate: f64,
    },

    #[error("Invalid discount rate: {0} (must be greater than -1)")]
    InvalidDiscountRate(f64),
}

impl ValuationError {
    /// Fatal input errors: retrying with the same parameters cannot succeed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ValuationError::InvalidInput(_) | ValuationError::TerminalValueUndefined { .. }
        )
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ValuationError::InvalidInput(msg.into())
    }
}
