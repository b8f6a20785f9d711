//! Positions and the ordered ledger that holds them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calculator::{quote_all, Evaluation, LocationQuote, PricingMode};
use crate::error::{RateCardError, Result};
use crate::{Location, RoleCost};

/// Identifier of a position within a ledger.
///
/// Ids are assigned by the ledger, start at 1, strictly increase in
/// creation order and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(u64);

impl PositionId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The inputs of a position before the ledger assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDraft {
    /// Snapshot of the role's costs at creation time.
    pub role_cost: RoleCost,
    /// Hours to staff.
    pub hours: Decimal,
    /// Pricing mode and its parameter.
    pub mode: PricingMode,
    /// Chosen location, or `None` for a comparison across all locations.
    pub selected: Option<Location>,
}

/// One staffing line item.
///
/// A position stores only its inputs. Money figures are recomputed on
/// demand with [`Position::evaluate`], so changing the selected location
/// never leaves stale numbers behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Ledger-assigned id.
    pub id: PositionId,
    /// Snapshot of the role's costs at creation time.
    pub role_cost: RoleCost,
    /// Hours to staff.
    pub hours: Decimal,
    /// Pricing mode and its parameter.
    pub mode: PricingMode,
    /// Chosen location, or `None` for a comparison position.
    pub selected: Option<Location>,
}

impl Position {
    /// Role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role_cost.role
    }

    /// Recompute figures for all three locations.
    #[must_use]
    pub fn evaluate(&self) -> Evaluation {
        quote_all(&self.role_cost, self.hours, self.mode)
    }

    /// Whether this position was added without a location.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        self.selected.is_none()
    }

    /// The selected location, or the best-ranked one for a comparison.
    #[must_use]
    pub fn effective_location(&self) -> Location {
        self.selected
            .unwrap_or_else(|| self.evaluate().best().location)
    }

    /// Figures for the effective location.
    #[must_use]
    pub fn selected_quote(&self) -> LocationQuote {
        let eval = self.evaluate();
        match self.selected {
            Some(location) => *eval.quote(location),
            None => *eval.best(),
        }
    }
}

/// An ordered collection of positions with a monotonically increasing id
/// counter.
///
/// # Examples
///
/// ```
/// use ratecard_core::calculator::PricingMode;
/// use ratecard_core::{PositionDraft, PositionLedger, RoleCost};
/// use rust_decimal_macros::dec;
///
/// let mut ledger = PositionLedger::new();
/// let draft = PositionDraft {
///     role_cost: RoleCost::new("QA Tester", dec!(55), dec!(15), dec!(30)),
///     hours: dec!(40),
///     mode: PricingMode::Margin(dec!(0.5)),
///     selected: None,
/// };
///
/// let first = ledger.add(draft.clone());
/// ledger.clear();
/// let second = ledger.add(draft);
/// assert!(second > first);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: Vec<Position>,
    last_id: u64,
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            last_id: 0,
        }
    }

    /// Append a position and return its newly assigned id.
    pub fn add(&mut self, draft: PositionDraft) -> PositionId {
        self.last_id += 1;
        let id = PositionId(self.last_id);
        self.positions.push(Position {
            id,
            role_cost: draft.role_cost,
            hours: draft.hours,
            mode: draft.mode,
            selected: draft.selected,
        });
        id
    }

    /// Remove a position. Unknown ids are ignored.
    pub fn remove(&mut self, id: PositionId) -> Option<Position> {
        let index = self.positions.iter().position(|p| p.id == id)?;
        Some(self.positions.remove(index))
    }

    /// Remove all positions. The id counter is not reset.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Overwrite the chosen location of a position.
    pub fn select_location(&mut self, id: PositionId, location: Location) -> Result<()> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RateCardError::NotFound(id))?;
        position.selected = Some(location);
        Ok(())
    }

    /// All positions in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Position] {
        &self.positions
    }

    /// Find a position by id.
    #[must_use]
    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The most recently issued id, if any.
    #[must_use]
    pub const fn last_id(&self) -> Option<PositionId> {
        if self.last_id == 0 {
            None
        } else {
            Some(PositionId(self.last_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(role: &str, selected: Option<Location>) -> PositionDraft {
        PositionDraft {
            role_cost: RoleCost::new(role, dec!(100), dec!(34), dec!(47)),
            hours: dec!(10),
            mode: PricingMode::Margin(dec!(0.6)),
            selected,
        }
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut ledger = PositionLedger::new();
        assert_eq!(ledger.last_id(), None);
        let a = ledger.add(draft("A", None));
        let b = ledger.add(draft("B", None));
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(ledger.last_id(), Some(b));
    }

    #[test]
    fn test_insertion_order() {
        let mut ledger = PositionLedger::new();
        ledger.add(draft("A", None));
        ledger.add(draft("B", Some(Location::Onshore)));
        ledger.add(draft("C", None));
        let roles: Vec<_> = ledger.all().iter().map(Position::role).collect();
        assert_eq!(roles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut ledger = PositionLedger::new();
        ledger.add(draft("A", None));
        let before = ledger.all().to_vec();
        assert!(ledger.remove(PositionId::new(99)).is_none());
        assert_eq!(ledger.all(), before.as_slice());
    }

    #[test]
    fn test_remove_never_reuses_id() {
        let mut ledger = PositionLedger::new();
        let a = ledger.add(draft("A", None));
        let removed = ledger.remove(a).unwrap();
        assert_eq!(removed.role(), "A");
        let b = ledger.add(draft("B", None));
        assert!(b > a);
    }

    #[test]
    fn test_clear_keeps_counter() {
        let mut ledger = PositionLedger::new();
        ledger.add(draft("A", None));
        let b = ledger.add(draft("B", None));
        ledger.clear();
        assert!(ledger.is_empty());
        let c = ledger.add(draft("C", None));
        assert!(c > b);
        assert_eq!(c.get(), 3);
    }

    #[test]
    fn test_select_location() {
        let mut ledger = PositionLedger::new();
        let id = ledger.add(draft("A", None));
        assert!(ledger.get(id).unwrap().is_comparison());
        assert_eq!(
            ledger.get(id).unwrap().effective_location(),
            Location::Offshore
        );

        ledger.select_location(id, Location::Nearshore).unwrap();
        let position = ledger.get(id).unwrap();
        assert_eq!(position.selected, Some(Location::Nearshore));
        assert_eq!(position.effective_location(), Location::Nearshore);
        assert_eq!(position.selected_quote().cost_per_hour, dec!(47));

        // Overwrite an explicit choice too
        ledger.select_location(id, Location::Onshore).unwrap();
        assert_eq!(ledger.get(id).unwrap().selected, Some(Location::Onshore));
    }

    #[test]
    fn test_select_location_unknown_id() {
        let mut ledger = PositionLedger::new();
        let err = ledger
            .select_location(PositionId::new(5), Location::Onshore)
            .unwrap_err();
        assert_eq!(err, RateCardError::NotFound(PositionId::new(5)));
    }

    #[test]
    fn test_evaluate_recomputes() {
        let mut ledger = PositionLedger::new();
        let id = ledger.add(draft("A", Some(Location::Onshore)));
        let position = ledger.get(id).unwrap();
        let quote = position.selected_quote();
        assert_eq!(quote.location, Location::Onshore);
        assert_eq!(quote.total_cost, dec!(2500));
        assert_eq!(position.evaluate().best().location, Location::Offshore);
    }
}
