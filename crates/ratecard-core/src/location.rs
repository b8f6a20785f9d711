//! Staffing locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the three staffing-location cost tiers for a role.
///
/// Declaration order (onshore, offshore, nearshore) is significant: it is
/// the tie-break order when two locations rank equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Staff located in the client's country.
    Onshore,
    /// Staff located in a distant, lower-cost region.
    Offshore,
    /// Staff located in a nearby region or time zone.
    Nearshore,
}

impl Location {
    /// All locations in declaration order.
    pub const ALL: [Self; 3] = [Self::Onshore, Self::Offshore, Self::Nearshore];

    /// Lowercase identifier, as used in data files and the JS API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Onshore => "onshore",
            Self::Offshore => "offshore",
            Self::Nearshore => "nearshore",
        }
    }

    /// Capitalized name for display.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Onshore => "Onshore",
            Self::Offshore => "Offshore",
            Self::Nearshore => "Nearshore",
        }
    }

    /// Position of this location in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Onshore => 0,
            Self::Offshore => 1,
            Self::Nearshore => 2,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown location '{0}' (expected onshore, offshore or nearshore)")]
pub struct ParseLocationError(pub String);

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onshore" => Ok(Self::Onshore),
            "offshore" => Ok(Self::Offshore),
            "nearshore" => Ok(Self::Nearshore),
            _ => Err(ParseLocationError(s.to_string())),
        }
    }
}
