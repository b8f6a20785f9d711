//! Per-role hourly costs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Location;

/// Hourly costs of one role at each staffing location.
///
/// Identity is the role name. Costs are expected to be non-negative, but a
/// negative cost is accepted as-is and surfaced as a data-quality warning by
/// [`RoleCatalog::data_quality_warnings`](crate::RoleCatalog::data_quality_warnings).
///
/// # Examples
///
/// ```
/// use ratecard_core::{Location, RoleCost};
/// use rust_decimal_macros::dec;
///
/// let architect = RoleCost::new("Solution Architect", dec!(100), dec!(34), dec!(47));
/// assert_eq!(architect.cost(Location::Offshore), dec!(34));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleCost {
    /// Role name.
    pub role: String,
    /// Onshore cost per hour.
    pub onshore: Decimal,
    /// Offshore cost per hour.
    pub offshore: Decimal,
    /// Nearshore cost per hour.
    pub nearshore: Decimal,
}

impl RoleCost {
    /// Create a new role cost record.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        onshore: Decimal,
        offshore: Decimal,
        nearshore: Decimal,
    ) -> Self {
        Self {
            role: role.into(),
            onshore,
            offshore,
            nearshore,
        }
    }

    /// Cost per hour at the given location.
    #[must_use]
    pub const fn cost(&self, location: Location) -> Decimal {
        match location {
            Location::Onshore => self.onshore,
            Location::Offshore => self.offshore,
            Location::Nearshore => self.nearshore,
        }
    }

    /// All three costs in declaration order.
    #[must_use]
    pub const fn costs(&self) -> [(Location, Decimal); 3] {
        [
            (Location::Onshore, self.onshore),
            (Location::Offshore, self.offshore),
            (Location::Nearshore, self.nearshore),
        ]
    }

    /// Locations whose cost is negative.
    pub fn negative_costs(&self) -> impl Iterator<Item = (Location, Decimal)> {
        self.costs()
            .into_iter()
            .filter(|(_, cost)| *cost < Decimal::ZERO)
    }
}

impl fmt::Display for RoleCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (onshore {}, offshore {}, nearshore {})",
            self.role, self.onshore, self.offshore, self.nearshore
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cost_by_location() {
        let rc = RoleCost::new("QA Tester", dec!(55), dec!(15), dec!(30));
        assert_eq!(rc.cost(Location::Onshore), dec!(55));
        assert_eq!(rc.cost(Location::Offshore), dec!(15));
        assert_eq!(rc.cost(Location::Nearshore), dec!(30));
    }

    #[test]
    fn test_negative_costs() {
        let rc = RoleCost::new("Odd", dec!(-5), dec!(0), dec!(12));
        let negatives: Vec<_> = rc.negative_costs().collect();
        assert_eq!(negatives, vec![(Location::Onshore, dec!(-5))]);

        let clean = RoleCost::new("Fine", dec!(1), dec!(2), dec!(3));
        assert_eq!(clean.negative_costs().count(), 0);
    }

    #[test]
    fn test_display() {
        let rc = RoleCost::new("PM", dec!(90), dec!(30), dec!(50));
        assert_eq!(
            rc.to_string(),
            "PM (onshore 90, offshore 30, nearshore 50)"
        );
    }
}
