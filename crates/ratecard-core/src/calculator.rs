//! Per-location pricing and best-location ranking.
//!
//! Two pricing modes are supported:
//!
//! - **Margin mode**: the desired margin is fixed and the client rate is
//!   derived per location as `cost / (1 - margin)`. Locations are ranked by
//!   the lowest total cost to the client.
//! - **Rate mode**: the client rate is fixed and the margin is derived per
//!   location as `(rate - cost) / rate`. Locations are ranked by the highest
//!   margin.
//!
//! In both modes a location with zero (or negative) cost reports a margin of
//! zero. Exact ties keep declaration order, so the first declared location
//! wins.
//!
//! # Example
//!
//! ```
//! use ratecard_core::calculator::{evaluate, PricingMode};
//! use ratecard_core::{Location, RoleCost};
//! use rust_decimal_macros::dec;
//!
//! let architect = RoleCost::new("Solution Architect", dec!(100), dec!(34), dec!(47));
//! let eval = evaluate(&architect, dec!(10), PricingMode::Margin(dec!(0.6))).unwrap();
//!
//! let best = eval.best();
//! assert_eq!(best.location, Location::Offshore);
//! assert_eq!(best.client_rate, dec!(85));
//! assert_eq!(best.total_cost, dec!(850));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{InputError, Result};
use crate::{CalculationInput, Location, RoleCatalog, RoleCost};

/// Margin applied by front ends when the user leaves the margin blank.
pub const DEFAULT_MARGIN: Decimal = Decimal::from_parts(60, 0, 0, false, 2);

/// How a calculation is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum PricingMode {
    /// Fixed desired margin in `[0, 1)`; client rate derived per location.
    Margin(Decimal),
    /// Fixed client rate per hour; margin derived per location.
    Rate(Decimal),
}

/// The pricing mode without its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Target-margin mode.
    Margin,
    /// Target-client-rate mode.
    Rate,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Margin => f.write_str("margin"),
            Self::Rate => f.write_str("rate"),
        }
    }
}

impl PricingMode {
    /// Margin mode with [`DEFAULT_MARGIN`].
    #[must_use]
    pub const fn default_margin() -> Self {
        Self::Margin(DEFAULT_MARGIN)
    }

    /// The kind of this mode.
    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Margin(_) => ModeKind::Margin,
            Self::Rate(_) => ModeKind::Rate,
        }
    }

    /// The mode's numeric parameter (margin or client rate).
    #[must_use]
    pub const fn parameter(&self) -> Decimal {
        match self {
            Self::Margin(m) | Self::Rate(m) => *m,
        }
    }

    /// Check the parameter against the mode's domain.
    pub fn validate(&self) -> Result<(), InputError> {
        match *self {
            Self::Margin(m) if m < Decimal::ZERO || m >= Decimal::ONE => {
                Err(InputError::MarginOutOfRange(m))
            }
            Self::Rate(r) if r <= Decimal::ZERO => Err(InputError::NonPositiveRate(r)),
            _ => Ok(()),
        }
    }

    /// Client rate per hour for a location with the given cost.
    ///
    /// Saturates at [`Decimal::MAX`] when the rate is not representable;
    /// see [`checked_client_rate`](Self::checked_client_rate).
    #[must_use]
    pub fn client_rate(&self, cost: Decimal) -> Decimal {
        self.client_rate_with(Arith::Saturating, cost)
            .unwrap_or(Decimal::MAX)
    }

    /// Client rate per hour, or `None` if it overflows.
    #[must_use]
    pub fn checked_client_rate(&self, cost: Decimal) -> Option<Decimal> {
        self.client_rate_with(Arith::Checked, cost)
    }

    fn client_rate_with(&self, arith: Arith, cost: Decimal) -> Option<Decimal> {
        match *self {
            Self::Margin(m) if cost > Decimal::ZERO => arith.div(cost, Decimal::ONE - m),
            Self::Margin(_) => Some(Decimal::ZERO),
            Self::Rate(r) => Some(r),
        }
    }
}

/// Overflow handling for decimal arithmetic.
///
/// `Checked` yields `None` on overflow; `Saturating` always yields a value,
/// clamped to the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arith {
    Checked,
    Saturating,
}

impl Arith {
    pub(crate) fn add(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Self::Checked => a.checked_add(b),
            Self::Saturating => Some(a.saturating_add(b)),
        }
    }

    pub(crate) fn sub(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Self::Checked => a.checked_sub(b),
            Self::Saturating => Some(a.saturating_sub(b)),
        }
    }

    pub(crate) fn mul(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Self::Checked => a.checked_mul(b),
            Self::Saturating => Some(a.saturating_mul(b)),
        }
    }

    /// Division; a zero divisor yields zero in saturating mode.
    pub(crate) fn div(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Self::Checked => a.checked_div(b),
            Self::Saturating => Some(a.checked_div(b).unwrap_or_else(|| {
                if b.is_zero() {
                    Decimal::ZERO
                } else if a.is_sign_negative() == b.is_sign_negative() {
                    Decimal::MAX
                } else {
                    Decimal::MIN
                }
            })),
        }
    }
}

/// Check that hours are strictly positive.
pub fn validate_hours(hours: Decimal) -> Result<(), InputError> {
    if hours <= Decimal::ZERO {
        return Err(InputError::NonPositiveHours(hours));
    }
    Ok(())
}

/// Fraction of the client rate retained as profit.
///
/// Zero when the cost is not positive (never undefined).
#[must_use]
pub fn margin(client_rate: Decimal, cost: Decimal) -> Decimal {
    margin_with(Arith::Saturating, client_rate, cost).unwrap_or(Decimal::ZERO)
}

fn margin_with(arith: Arith, client_rate: Decimal, cost: Decimal) -> Option<Decimal> {
    if cost > Decimal::ZERO && !client_rate.is_zero() {
        arith.div(arith.sub(client_rate, cost)?, client_rate)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Derived figures for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuote {
    /// The location these figures are for.
    pub location: Location,
    /// What the role costs us per hour at this location.
    pub cost_per_hour: Decimal,
    /// What we charge the client per hour.
    pub client_rate: Decimal,
    /// What the client pays in total (`hours * client_rate`).
    pub total_cost: Decimal,
    /// What we keep (`total_cost - hours * cost_per_hour`).
    pub profit: Decimal,
    /// `profit` as a fraction of the client charge.
    pub margin: Decimal,
}

/// Figures for all three locations of one role under one pricing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Pricing mode kind, which decides the ranking policy.
    pub mode: ModeKind,
    /// Hours the figures were computed for.
    pub hours: Decimal,
    quotes: [LocationQuote; 3],
}

impl Evaluation {
    /// Quote for one location.
    #[must_use]
    pub const fn quote(&self, location: Location) -> &LocationQuote {
        &self.quotes[location.index()]
    }

    /// Quotes in declaration order.
    #[must_use]
    pub const fn quotes(&self) -> &[LocationQuote; 3] {
        &self.quotes
    }

    /// The best-ranked location's quote.
    #[must_use]
    pub fn best(&self) -> &LocationQuote {
        // Only a strictly better quote replaces the current best.
        let mut best = &self.quotes[0];
        for quote in &self.quotes[1..] {
            if rank(self.mode, quote, best) == Ordering::Less {
                best = quote;
            }
        }
        best
    }

    /// Quotes from best to worst; ties keep declaration order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&LocationQuote> {
        let mut ranked: Vec<_> = self.quotes.iter().collect();
        ranked.sort_by(|a, b| rank(self.mode, a, b));
        ranked
    }

    /// Check whether `location` is the best-ranked location.
    #[must_use]
    pub fn is_best(&self, location: Location) -> bool {
        self.best().location == location
    }
}

/// Ordering where `Less` means "ranks higher".
fn rank(mode: ModeKind, a: &LocationQuote, b: &LocationQuote) -> Ordering {
    match mode {
        ModeKind::Margin => a.total_cost.cmp(&b.total_cost),
        ModeKind::Rate => b.margin.cmp(&a.margin),
    }
}

/// Compute quotes for all locations without validating inputs.
///
/// Callers must have validated `hours` and `mode`; positions stored in a
/// session always have, and their figures are known to be representable.
/// Figures that would overflow saturate instead of panicking.
#[must_use]
pub fn quote_all(role_cost: &RoleCost, hours: Decimal, mode: PricingMode) -> Evaluation {
    quote_all_with(Arith::Saturating, role_cost, hours, mode)
        .unwrap_or_else(|| zero_evaluation(role_cost, hours, mode))
}

/// Compute quotes for all locations, or `None` if any figure overflows.
#[must_use]
pub fn try_quote_all(role_cost: &RoleCost, hours: Decimal, mode: PricingMode) -> Option<Evaluation> {
    quote_all_with(Arith::Checked, role_cost, hours, mode)
}

fn quote_all_with(
    arith: Arith,
    role_cost: &RoleCost,
    hours: Decimal,
    mode: PricingMode,
) -> Option<Evaluation> {
    let [onshore, offshore, nearshore] = Location::ALL.map(|location| {
        let cost_per_hour = role_cost.cost(location);
        let client_rate = mode.client_rate_with(arith, cost_per_hour)?;
        let total_cost = arith.mul(hours, client_rate)?;
        let staffing_cost = arith.mul(hours, cost_per_hour)?;
        Some(LocationQuote {
            location,
            cost_per_hour,
            client_rate,
            total_cost,
            profit: arith.sub(total_cost, staffing_cost)?,
            margin: margin_with(arith, client_rate, cost_per_hour)?,
        })
    });

    Some(Evaluation {
        mode: mode.kind(),
        hours,
        quotes: [onshore?, offshore?, nearshore?],
    })
}

// Saturating arithmetic never yields `None`; this only satisfies the types.
fn zero_evaluation(role_cost: &RoleCost, hours: Decimal, mode: PricingMode) -> Evaluation {
    Evaluation {
        mode: mode.kind(),
        hours,
        quotes: Location::ALL.map(|location| LocationQuote {
            location,
            cost_per_hour: role_cost.cost(location),
            client_rate: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            profit: Decimal::ZERO,
            margin: Decimal::ZERO,
        }),
    }
}

/// Validate inputs and compute quotes for all locations.
///
/// Inputs whose figures are too large to represent are rejected with
/// [`InputError::OutOfRange`].
pub fn evaluate(role_cost: &RoleCost, hours: Decimal, mode: PricingMode) -> Result<Evaluation> {
    validate_hours(hours)?;
    mode.validate()?;
    try_quote_all(role_cost, hours, mode).ok_or_else(|| InputError::OutOfRange.into())
}

/// Look up the input's role and evaluate it.
pub fn calculate(catalog: &RoleCatalog, input: &CalculationInput) -> Result<Evaluation> {
    let role_cost = catalog.lookup(&input.role)?;
    evaluate(role_cost, input.hours, input.mode)
}
