//! Core types for ratecard
//!
//! This crate provides the pricing core of the rate card calculator:
//!
//! - [`Location`] - Onshore, offshore and nearshore cost tiers
//! - [`RoleCost`] - Hourly costs of a role at each location
//! - [`RoleCatalog`] - Lookup table of role costs
//! - [`calculator`] - Per-location client rate, cost, profit and margin, plus ranking
//! - [`PositionLedger`] - Ordered positions with never-reused ids
//! - [`Session`] - A ledger with its pricing-mode lock
//! - [`summarize`] - Aggregate statistics over a ledger
//!
//! # Example
//!
//! ```
//! use ratecard_core::{CalculationInput, Location, RoleCatalog, RoleCost, Session};
//! use rust_decimal_macros::dec;
//!
//! let catalog = RoleCatalog::from_roles([
//!     RoleCost::new("Salesforce Technical Architect", dec!(95), dec!(32), dec!(45)),
//! ]);
//!
//! let mut session = Session::new();
//!
//! // Fixed client rate: which location earns the best margin?
//! let input = CalculationInput::rate("Salesforce Technical Architect", dec!(10), dec!(150));
//! let eval = session.quote(&catalog, &input).unwrap();
//! assert_eq!(eval.best().location, Location::Offshore);
//!
//! session.add_position(&catalog, &input).unwrap();
//! let summary = session.summary();
//! assert_eq!(summary.total_client_charge, dec!(1500));
//! assert_eq!(summary.total_profit, dec!(1180));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod calculator;
pub mod catalog;
pub mod error;
pub mod format;
pub mod ledger;
pub mod location;
pub mod role;
pub mod session;
pub mod summary;

pub use calculator::{Evaluation, LocationQuote, ModeKind, PricingMode, DEFAULT_MARGIN};
pub use catalog::{CatalogWarning, RoleCatalog};
pub use error::{InputError, RateCardError};
pub use format::{format_currency, format_percentage};
pub use ledger::{Position, PositionDraft, PositionId, PositionLedger};
pub use location::{Location, ParseLocationError};
pub use role::RoleCost;
pub use session::{CalculationInput, ModeLock, Session};
pub use summary::{
    summarize, try_summarize, LocationMix, LocationScenario, Summary, NEARLY_OPTIMAL_THRESHOLD,
};

// Re-export commonly used external types
pub use rust_decimal::Decimal;
