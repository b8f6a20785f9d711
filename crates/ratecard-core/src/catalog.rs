//! The role catalog: role name to per-location costs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{RateCardError, Result};
use crate::{Location, RoleCost};

/// An ordered, read-only table of [`RoleCost`] records keyed by role name.
///
/// Lookups are exact and case-sensitive. Role names are unique: when the
/// same name is inserted twice the first record is kept.
///
/// A catalog is populated once by a loader and then only read. Positions
/// copy the record they were priced from, so replacing the catalog never
/// changes existing positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RoleCost>", into = "Vec<RoleCost>")]
pub struct RoleCatalog {
    roles: Vec<RoleCost>,
    index: HashMap<String, usize>,
}

/// A problem with catalog data that does not prevent calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// A role had the same name as an earlier one and was dropped.
    DuplicateRole(String),
    /// A cost field was negative.
    NegativeCost {
        /// Role name.
        role: String,
        /// Location of the negative cost.
        location: Location,
        /// The cost as loaded.
        cost: Decimal,
    },
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRole(role) => write!(f, "duplicate role '{role}' ignored"),
            Self::NegativeCost {
                role,
                location,
                cost,
            } => write!(f, "role '{role}' has a negative {location} cost ({cost})"),
        }
    }
}

impl RoleCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records, keeping the first of any duplicates.
    pub fn from_roles(roles: impl IntoIterator<Item = RoleCost>) -> Self {
        let mut catalog = Self::new();
        for role in roles {
            catalog.insert(role);
        }
        catalog
    }

    /// Build a catalog and report the duplicates that were dropped.
    pub fn from_roles_with_warnings(
        roles: impl IntoIterator<Item = RoleCost>,
    ) -> (Self, Vec<CatalogWarning>) {
        let mut catalog = Self::new();
        let mut warnings = Vec::new();
        for role in roles {
            let name = role.role.clone();
            if !catalog.insert(role) {
                warnings.push(CatalogWarning::DuplicateRole(name));
            }
        }
        warnings.extend(catalog.data_quality_warnings());
        (catalog, warnings)
    }

    /// Append a record. Returns `false` (and leaves the catalog unchanged)
    /// if a role with the same name already exists.
    pub fn insert(&mut self, role: RoleCost) -> bool {
        if self.index.contains_key(&role.role) {
            return false;
        }
        self.index.insert(role.role.clone(), self.roles.len());
        self.roles.push(role);
        true
    }

    /// Look up a role by exact name.
    pub fn lookup(&self, role: &str) -> Result<&RoleCost> {
        self.get(role)
            .ok_or_else(|| RateCardError::RoleNotFound(role.to_string()))
    }

    /// Look up a role by exact name, returning `None` if absent.
    #[must_use]
    pub fn get(&self, role: &str) -> Option<&RoleCost> {
        self.index.get(role).map(|&i| &self.roles[i])
    }

    /// Check whether a role exists.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.index.contains_key(role)
    }

    /// All records in declaration order.
    #[must_use]
    pub fn roles(&self) -> &[RoleCost] {
        &self.roles
    }

    /// Role names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.role.as_str())
    }

    /// Number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if the catalog has no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// One warning per negative cost field.
    #[must_use]
    pub fn data_quality_warnings(&self) -> Vec<CatalogWarning> {
        self.roles
            .iter()
            .flat_map(|rc| {
                rc.negative_costs()
                    .map(|(location, cost)| CatalogWarning::NegativeCost {
                        role: rc.role.clone(),
                        location,
                        cost,
                    })
            })
            .collect()
    }
}

impl From<Vec<RoleCost>> for RoleCatalog {
    fn from(roles: Vec<RoleCost>) -> Self {
        Self::from_roles(roles)
    }
}

impl From<RoleCatalog> for Vec<RoleCost> {
    fn from(catalog: RoleCatalog) -> Self {
        catalog.roles
    }
}

impl FromIterator<RoleCost> for RoleCatalog {
    fn from_iter<I: IntoIterator<Item = RoleCost>>(iter: I) -> Self {
        Self::from_roles(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> RoleCatalog {
        RoleCatalog::from_roles([
            RoleCost::new("Salesforce Solution Architect", dec!(100), dec!(34), dec!(47)),
            RoleCost::new("Salesforce Technical Architect", dec!(95), dec!(32), dec!(45)),
            RoleCost::new("QA Tester", dec!(55), dec!(15), dec!(30)),
        ])
    }

    #[test]
    fn test_lookup_exact() {
        let catalog = sample();
        let rc = catalog.lookup("QA Tester").unwrap();
        assert_eq!(rc.onshore, dec!(55));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = sample();
        assert_eq!(
            catalog.lookup("qa tester"),
            Err(RateCardError::RoleNotFound("qa tester".to_string()))
        );
    }

    #[test]
    fn test_lookup_missing() {
        let catalog = sample();
        let err = catalog.lookup("nonexistent role").unwrap_err();
        assert_eq!(
            err,
            RateCardError::RoleNotFound("nonexistent role".to_string())
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = RoleCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.names().count(), 0);
        assert!(catalog.lookup("anything").is_err());
    }

    #[test]
    fn test_order_preserved() {
        let names: Vec<_> = sample().names().map(str::to_string).collect();
        assert_eq!(
            names,
            vec![
                "Salesforce Solution Architect",
                "Salesforce Technical Architect",
                "QA Tester"
            ]
        );
    }

    #[test]
    fn test_duplicates_keep_first() {
        let (catalog, warnings) = RoleCatalog::from_roles_with_warnings([
            RoleCost::new("Dev", dec!(80), dec!(20), dec!(40)),
            RoleCost::new("Dev", dec!(1), dec!(1), dec!(1)),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("Dev").unwrap().onshore, dec!(80));
        assert_eq!(warnings, vec![CatalogWarning::DuplicateRole("Dev".into())]);
    }

    #[test]
    fn test_negative_cost_warning() {
        let catalog = RoleCatalog::from_roles([RoleCost::new(
            "Refund",
            dec!(10),
            dec!(-2),
            dec!(5),
        )]);
        let warnings = catalog.data_quality_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].to_string(),
            "role 'Refund' has a negative offshore cost (-2)"
        );
        // Still usable
        assert!(catalog.lookup("Refund").is_ok());
    }

    #[test]
    fn test_serde_as_array() {
        let catalog = sample();
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.starts_with('['));
        let back: RoleCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
        assert!(back.contains("QA Tester"));
    }
}
