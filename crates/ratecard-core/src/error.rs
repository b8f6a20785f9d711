//! Error types for rate card calculations and ledger operations.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculator::ModeKind;
use crate::ledger::PositionId;

/// Errors returned by the calculator, the ledger and the session.
///
/// Every error is scoped to the single operation that produced it; none of
/// them leave a session in an inconsistent state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateCardError {
    /// The requested role is not present in the catalog.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// A calculation input failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// A ledger operation referenced an id that does not exist.
    #[error("position {0} not found")]
    NotFound(PositionId),
}

/// Reasons a [`CalculationInput`](crate::CalculationInput) is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Hours must be strictly positive.
    #[error("hours must be greater than zero, got {0}")]
    NonPositiveHours(Decimal),

    /// Desired margin must lie in `[0, 1)`.
    #[error("desired margin must be at least 0 and below 1, got {0}")]
    MarginOutOfRange(Decimal),

    /// Target client rate must be strictly positive.
    #[error("target client rate must be greater than zero, got {0}")]
    NonPositiveRate(Decimal),

    /// The figures for this input are too large to represent.
    #[error("figures for this input are out of range")]
    OutOfRange,

    /// The session is locked to a different pricing mode.
    #[error("session is locked to {locked} mode; clear all positions before adding a {requested} position")]
    ModeMismatch {
        /// Mode the session is currently locked to.
        locked: ModeKind,
        /// Mode of the rejected input.
        requested: ModeKind,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = RateCardError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_input_error_converts() {
        let err: RateCardError = InputError::NonPositiveHours(dec!(0)).into();
        assert_eq!(
            err,
            RateCardError::InvalidInput(InputError::NonPositiveHours(dec!(0)))
        );
    }

    #[test]
    fn test_display() {
        let err = RateCardError::RoleNotFound("Wizard".to_string());
        assert_eq!(err.to_string(), "role not found: Wizard");

        let err = RateCardError::NotFound(PositionId::new(7));
        assert_eq!(err.to_string(), "position #7 not found");

        let err = RateCardError::from(InputError::ModeMismatch {
            locked: ModeKind::Margin,
            requested: ModeKind::Rate,
        });
        assert!(err.to_string().contains("locked to margin mode"));
    }
}
