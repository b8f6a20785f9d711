//! A calculation session: one ledger plus the pricing-mode lock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{self, Evaluation, ModeKind, PricingMode};
use crate::error::{InputError, RateCardError, Result};
use crate::ledger::{Position, PositionDraft, PositionId, PositionLedger};
use crate::summary::{summarize, try_summarize, Summary};
use crate::{Location, RoleCatalog};

/// A single user request to price a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Role name, matched exactly against the catalog.
    pub role: String,
    /// Hours to staff; must be positive.
    pub hours: Decimal,
    /// Chosen location, or `None` to compare all three.
    pub location: Option<Location>,
    /// Pricing mode and parameter.
    pub mode: PricingMode,
}

impl CalculationInput {
    /// Create an input.
    pub fn new(role: impl Into<String>, hours: Decimal, mode: PricingMode) -> Self {
        Self {
            role: role.into(),
            hours,
            location: None,
            mode,
        }
    }

    /// Margin-mode input with the given desired margin.
    pub fn margin(role: impl Into<String>, hours: Decimal, desired_margin: Decimal) -> Self {
        Self::new(role, hours, PricingMode::Margin(desired_margin))
    }

    /// Rate-mode input with the given client rate.
    pub fn rate(role: impl Into<String>, hours: Decimal, client_rate: Decimal) -> Self {
        Self::new(role, hours, PricingMode::Rate(client_rate))
    }

    /// Fix the location instead of comparing.
    #[must_use]
    pub const fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Which pricing mode a session has committed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeLock {
    /// No positions yet; any mode is accepted.
    #[default]
    Unset,
    /// Only margin-mode positions are accepted.
    Margin,
    /// Only rate-mode positions are accepted.
    Rate,
}

impl ModeLock {
    /// Check whether a mode is acceptable under this lock.
    pub fn check(self, requested: ModeKind) -> Result<(), InputError> {
        let locked = match self {
            Self::Unset => return Ok(()),
            Self::Margin => ModeKind::Margin,
            Self::Rate => ModeKind::Rate,
        };
        if locked == requested {
            Ok(())
        } else {
            Err(InputError::ModeMismatch { locked, requested })
        }
    }
}

impl From<ModeKind> for ModeLock {
    fn from(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Margin => Self::Margin,
            ModeKind::Rate => Self::Rate,
        }
    }
}

/// Per-user session state, passed explicitly to every operation.
///
/// # Examples
///
/// ```
/// use ratecard_core::{CalculationInput, Location, RoleCatalog, RoleCost, Session};
/// use rust_decimal_macros::dec;
///
/// let catalog = RoleCatalog::from_roles([
///     RoleCost::new("Senior Developer", dec!(85), dec!(28), dec!(40)),
/// ]);
///
/// let mut session = Session::new();
/// let id = session
///     .add_position(&catalog, &CalculationInput::margin("Senior Developer", dec!(100), dec!(0.5)))
///     .unwrap();
/// session.select_location(id, Location::Nearshore).unwrap();
///
/// let summary = session.summary();
/// assert_eq!(summary.total_client_charge, dec!(8000));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    ledger: PositionLedger,
    mode_lock: ModeLock,
}

impl Session {
    /// Start an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode lock.
    #[must_use]
    pub const fn mode_lock(&self) -> ModeLock {
        self.mode_lock
    }

    /// The session's ledger.
    #[must_use]
    pub const fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// Positions in insertion order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        self.ledger.all()
    }

    /// Price an input without adding it.
    pub fn quote(&self, catalog: &RoleCatalog, input: &CalculationInput) -> Result<Evaluation> {
        calculator::calculate(catalog, input)
    }

    /// Validate an input, snapshot its role costs and append it.
    ///
    /// An input whose figures, or whose effect on the session totals, are
    /// too large to represent is rejected with [`InputError::OutOfRange`].
    pub fn add_position(
        &mut self,
        catalog: &RoleCatalog,
        input: &CalculationInput,
    ) -> Result<PositionId> {
        let role_cost = catalog.lookup(&input.role)?;
        calculator::evaluate(role_cost, input.hours, input.mode)?;
        self.mode_lock.check(input.mode.kind())?;

        let mut candidate = self.ledger.all().to_vec();
        candidate.push(Position {
            id: PositionId::new(u64::MAX),
            role_cost: role_cost.clone(),
            hours: input.hours,
            mode: input.mode,
            selected: input.location,
        });
        ensure_summarizable(&candidate)?;

        let id = self.ledger.add(PositionDraft {
            role_cost: role_cost.clone(),
            hours: input.hours,
            mode: input.mode,
            selected: input.location,
        });
        self.mode_lock = input.mode.kind().into();
        Ok(id)
    }

    /// Remove a position; unknown ids are ignored.
    ///
    /// Removing the last position releases the mode lock.
    pub fn remove_position(&mut self, id: PositionId) -> Option<Position> {
        let removed = self.ledger.remove(id);
        if self.ledger.is_empty() {
            self.mode_lock = ModeLock::Unset;
        }
        removed
    }

    /// Choose the location of a position.
    ///
    /// A choice that would push the session totals out of range is
    /// rejected and the previous choice kept.
    pub fn select_location(&mut self, id: PositionId, location: Location) -> Result<()> {
        let mut candidate = self.ledger.all().to_vec();
        let position = candidate
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RateCardError::NotFound(id))?;
        position.selected = Some(location);
        ensure_summarizable(&candidate)?;

        self.ledger.select_location(id, location)
    }

    /// Remove every position and release the mode lock.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.mode_lock = ModeLock::Unset;
    }

    /// Aggregate the ledger.
    #[must_use]
    pub fn summary(&self) -> Summary {
        summarize(self.ledger.all())
    }
}

fn ensure_summarizable(positions: &[Position]) -> Result<(), InputError> {
    try_summarize(positions).map(|_| ()).ok_or(InputError::OutOfRange)
}
