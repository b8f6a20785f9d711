//! Data transfer objects for WASM serialization.
//!
//! Money, hours and ratios are decimals and cross the boundary as strings.
//! Inputs accept either strings or plain numbers. Field names are
//! snake_case on both sides, like the core types nested inside them.

use ratecard_core::{
    CalculationInput, Evaluation, Location, LocationQuote, Position, PositionId, PricingMode,
    DEFAULT_MARGIN,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Calculator input from JavaScript.
///
/// At most one of `margin` (a ratio such as `"0.6"`) and `rate` (client
/// rate per hour) may be set; neither means the default margin.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionInput {
    /// Role name.
    pub role: String,
    /// Hours of work.
    pub hours: Decimal,
    /// Desired margin ratio.
    #[serde(default)]
    pub margin: Option<Decimal>,
    /// Fixed client rate per hour.
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Chosen location; absent for a comparison.
    #[serde(default)]
    pub location: Option<Location>,
}

impl PositionInput {
    /// Convert to a core calculator input.
    pub fn to_input(&self) -> Result<CalculationInput, String> {
        let mode = match (self.margin, self.rate) {
            (Some(_), Some(_)) => return Err("set either margin or rate, not both".to_string()),
            (Some(margin), None) => PricingMode::Margin(margin),
            (None, Some(rate)) => PricingMode::Rate(rate),
            (None, None) => PricingMode::Margin(DEFAULT_MARGIN),
        };
        let mut input = CalculationInput::new(self.role.clone(), self.hours, mode);
        input.location = self.location;
        Ok(input)
    }
}

/// Outcome of a catalog load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Number of roles now in the catalog.
    pub role_count: usize,
    /// Name of the source that supplied them.
    pub source: String,
    /// Whether the built-in backup was used.
    pub used_backup: bool,
    /// Data quality notes and fallback reasons.
    pub warnings: Vec<String>,
}

/// A quote for every location.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResult {
    /// `"margin"` or `"rate"`.
    pub mode: String,
    /// Hours quoted.
    pub hours: Decimal,
    /// Per-location results in declaration order.
    pub quotes: Vec<LocationQuote>,
    /// Locations from best to worst.
    pub ranked: Vec<Location>,
    /// The best location.
    pub best: Location,
}

impl From<&Evaluation> for QuoteResult {
    fn from(eval: &Evaluation) -> Self {
        Self {
            mode: eval.mode.to_string(),
            hours: eval.hours,
            quotes: eval.quotes().to_vec(),
            ranked: eval.ranked().iter().map(|q| q.location).collect(),
            best: eval.best().location,
        }
    }
}

/// A position with its current figures.
#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    /// Position id.
    pub id: PositionId,
    /// Role name.
    pub role: String,
    /// Hours.
    pub hours: Decimal,
    /// Pricing mode and parameter.
    pub mode: PricingMode,
    /// Chosen location, if any.
    pub selected: Option<Location>,
    /// Location the figures below are for.
    pub location: Location,
    /// Figures at `location`.
    pub quote: LocationQuote,
    /// All locations.
    pub comparison: QuoteResult,
}

impl From<&Position> for PositionView {
    fn from(position: &Position) -> Self {
        let eval = position.evaluate();
        let quote = position.selected_quote();
        Self {
            id: position.id,
            role: position.role().to_string(),
            hours: position.hours,
            mode: position.mode,
            selected: position.selected,
            location: quote.location,
            quote,
            comparison: QuoteResult::from(&eval),
        }
    }
}
