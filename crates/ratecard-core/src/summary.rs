//! Aggregate statistics over a ledger.
//!
//! Every figure is recomputed from the stored position inputs. The average
//! margin is profit-weighted (`total_profit / total_client_charge`) rather
//! than a mean of per-position margins, so small positions do not skew it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{try_quote_all, Arith, ModeKind};
use crate::ledger::Position;
use crate::Location;

/// Foregone profit or client savings at or below this amount counts as
/// "nearly optimal".
pub const NEARLY_OPTIMAL_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Ledger totals as if every position were staffed at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationScenario {
    /// The location every position is moved to.
    pub location: Location,
    /// What the client would pay.
    pub total_client_charge: Decimal,
    /// What staffing would cost us.
    pub total_cost: Decimal,
    /// What we would keep.
    pub total_profit: Decimal,
    /// Profit-weighted margin of the scenario.
    pub average_margin: Decimal,
}

/// How many positions have an explicitly selected location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMix {
    /// Positions selected onshore.
    pub onshore: usize,
    /// Positions selected offshore.
    pub offshore: usize,
    /// Positions selected nearshore.
    pub nearshore: usize,
    /// Comparison positions with no selection yet.
    pub unassigned: usize,
}

impl LocationMix {
    /// Count for one location.
    #[must_use]
    pub const fn count(&self, location: Location) -> usize {
        match location {
            Location::Onshore => self.onshore,
            Location::Offshore => self.offshore,
            Location::Nearshore => self.nearshore,
        }
    }

    fn record(&mut self, selected: Option<Location>) {
        match selected {
            Some(Location::Onshore) => self.onshore += 1,
            Some(Location::Offshore) => self.offshore += 1,
            Some(Location::Nearshore) => self.nearshore += 1,
            None => self.unassigned += 1,
        }
    }
}

/// Aggregate figures for a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of positions.
    pub position_count: usize,
    /// Sum of hours.
    pub total_hours: Decimal,
    /// Client charge at each position's effective location.
    pub total_client_charge: Decimal,
    /// Our staffing cost at each position's effective location.
    pub total_cost: Decimal,
    /// Profit at each position's effective location.
    pub total_profit: Decimal,
    /// `total_profit / total_client_charge`, or zero.
    pub average_margin: Decimal,
    /// Client charge if every position used its best location.
    pub optimal_client_charge: Decimal,
    /// Profit if every position used its best location.
    pub optimal_profit: Decimal,
    /// `optimal_profit - total_profit`.
    pub foregone_profit: Decimal,
    /// `total_client_charge - optimal_client_charge`.
    pub client_savings: Decimal,
    /// One what-if scenario per location, in declaration order.
    pub scenarios: [LocationScenario; 3],
    /// Selected-location counts.
    pub mix: LocationMix,
    /// The pricing mode shared by all positions, if they share one.
    pub mode: Option<ModeKind>,
}

impl Summary {
    /// A summary of nothing: every figure zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            position_count: 0,
            total_hours: Decimal::ZERO,
            total_client_charge: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            average_margin: Decimal::ZERO,
            optimal_client_charge: Decimal::ZERO,
            optimal_profit: Decimal::ZERO,
            foregone_profit: Decimal::ZERO,
            client_savings: Decimal::ZERO,
            scenarios: Location::ALL.map(|location| LocationScenario {
                location,
                total_client_charge: Decimal::ZERO,
                total_cost: Decimal::ZERO,
                total_profit: Decimal::ZERO,
                average_margin: Decimal::ZERO,
            }),
            mix: LocationMix::default(),
            mode: None,
        }
    }

    /// Check if the summary covers no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position_count == 0
    }

    /// Scenario for one location.
    #[must_use]
    pub const fn scenario(&self, location: Location) -> &LocationScenario {
        &self.scenarios[location.index()]
    }

    /// The best all-one-location scenario.
    ///
    /// Margin-mode ledgers rank by the lowest client charge; any other
    /// ledger ranks by the highest margin. Ties keep declaration order.
    /// Returns `None` for an empty ledger.
    #[must_use]
    pub fn best_scenario(&self) -> Option<&LocationScenario> {
        if self.is_empty() {
            return None;
        }
        let mut best = &self.scenarios[0];
        for scenario in &self.scenarios[1..] {
            let better = match self.mode {
                Some(ModeKind::Margin) => {
                    scenario.total_client_charge < best.total_client_charge
                }
                _ => scenario.average_margin > best.average_margin,
            };
            if better {
                best = scenario;
            }
        }
        Some(best)
    }

    /// The all-one-location scenario with the highest client charge.
    ///
    /// Ties keep declaration order. Returns `None` for an empty ledger.
    #[must_use]
    pub fn most_expensive_scenario(&self) -> Option<&LocationScenario> {
        if self.is_empty() {
            return None;
        }
        let mut worst = &self.scenarios[0];
        for scenario in &self.scenarios[1..] {
            if scenario.total_client_charge > worst.total_client_charge {
                worst = scenario;
            }
        }
        Some(worst)
    }

    /// Client charge saved by the best scenario over the most expensive one.
    #[must_use]
    pub fn savings_vs_most_expensive(&self) -> Decimal {
        match (self.most_expensive_scenario(), self.best_scenario()) {
            (Some(worst), Some(best)) => worst
                .total_client_charge
                .saturating_sub(best.total_client_charge),
            _ => Decimal::ZERO,
        }
    }

    /// Whether the current selection is within [`NEARLY_OPTIMAL_THRESHOLD`]
    /// of the best choice, both in profit and in client charge.
    #[must_use]
    pub fn is_nearly_optimal(&self) -> bool {
        self.foregone_profit <= NEARLY_OPTIMAL_THRESHOLD
            && self.client_savings <= NEARLY_OPTIMAL_THRESHOLD
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::empty()
    }
}

fn ratio(arith: Arith, numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        Some(Decimal::ZERO)
    } else {
        arith.div(numerator, denominator)
    }
}

/// Reduce positions into a [`Summary`].
///
/// Comparison positions count at their best-ranked location. An empty
/// slice yields [`Summary::empty`]. Totals that would overflow saturate;
/// a [`Session`](crate::Session) never admits positions whose totals do.
#[must_use]
pub fn summarize(positions: &[Position]) -> Summary {
    summarize_with(Arith::Saturating, positions).unwrap_or_default()
}

/// Reduce positions into a [`Summary`], or `None` if a total overflows.
#[must_use]
pub fn try_summarize(positions: &[Position]) -> Option<Summary> {
    summarize_with(Arith::Checked, positions)
}

fn summarize_with(arith: Arith, positions: &[Position]) -> Option<Summary> {
    let mut summary = Summary::empty();
    let Some(first) = positions.first() else {
        return Some(summary);
    };

    let first_mode = first.mode.kind();
    summary.mode = positions
        .iter()
        .all(|p| p.mode.kind() == first_mode)
        .then_some(first_mode);
    summary.position_count = positions.len();

    let add = |total: &mut Decimal, amount: Decimal| -> Option<()> {
        *total = arith.add(*total, amount)?;
        Some(())
    };

    for position in positions {
        let eval = match arith {
            Arith::Checked => try_quote_all(&position.role_cost, position.hours, position.mode)?,
            Arith::Saturating => position.evaluate(),
        };
        let best = *eval.best();
        let chosen = match position.selected {
            Some(location) => *eval.quote(location),
            None => best,
        };

        add(&mut summary.total_hours, position.hours)?;
        add(&mut summary.total_client_charge, chosen.total_cost)?;
        add(
            &mut summary.total_cost,
            arith.mul(position.hours, chosen.cost_per_hour)?,
        )?;
        add(&mut summary.total_profit, chosen.profit)?;
        add(&mut summary.optimal_client_charge, best.total_cost)?;
        add(&mut summary.optimal_profit, best.profit)?;
        summary.mix.record(position.selected);

        for quote in eval.quotes() {
            let scenario = &mut summary.scenarios[quote.location.index()];
            add(&mut scenario.total_client_charge, quote.total_cost)?;
            add(
                &mut scenario.total_cost,
                arith.mul(position.hours, quote.cost_per_hour)?,
            )?;
            add(&mut scenario.total_profit, quote.profit)?;
        }
    }

    summary.average_margin = ratio(arith, summary.total_profit, summary.total_client_charge)?;
    summary.foregone_profit = arith.sub(summary.optimal_profit, summary.total_profit)?;
    summary.client_savings = arith.sub(summary.total_client_charge, summary.optimal_client_charge)?;
    for scenario in &mut summary.scenarios {
        scenario.average_margin = ratio(arith, scenario.total_profit, scenario.total_client_charge)?;
    }

    Some(summary)
}
