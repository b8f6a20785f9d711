//! Rate card catalog loading.
//!
//! This crate fills a [`RoleCatalog`] from the rate card spreadsheet and
//! falls back to a built-in table when the spreadsheet is unreachable.
//!
//! # Features
//!
//! - Google Sheets v4 values API (with an API key) or the public `gviz`
//!   endpoint (without one)
//! - CSV files with a header row
//! - Built-in backup data for offline use
//! - A shared [`CatalogStore`] that refreshes on a [`RefreshPolicy`]
//!
//! The `http` feature (on by default) enables [`UreqFetcher`]. Without it
//! the parsers and sources still work with a caller-supplied [`Fetch`].
//!
//! # Example
//!
//! ```
//! use ratecard_loader::{BackupSource, CatalogLoader, CsvFileSource};
//!
//! let loader = CatalogLoader::new(CsvFileSource::new("/no/such/rates.csv"))
//!     .with_backup(BackupSource);
//! let result = loader.load().unwrap();
//! assert!(result.origin.is_backup());
//! assert_eq!(result.catalog.len(), 7);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backup;
pub mod config;
pub mod parse;
pub mod source;
pub mod store;

pub use config::{SheetAccess, SheetsConfig};
pub use parse::{parse_api_values, parse_cost, parse_csv, parse_gviz};
#[cfg(feature = "http")]
pub use source::UreqFetcher;
pub use source::{
    BackupSource, CatalogSource, CsvFileSource, Fetch, PayloadFormat, SheetsSource, StaticSource,
    TextSource,
};
pub use store::{CatalogStore, RefreshPolicy};

use chrono::{DateTime, Utc};
use ratecard_core::{RoleCatalog, RoleCost};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed or returned a non-success status.
    #[error("request to {url} failed: {message}")]
    Http {
        /// The requested URL, without its query string.
        url: String,
        /// Error message from the HTTP client.
        message: String,
    },

    /// The payload could not be parsed.
    #[error("failed to parse {format} data: {message}")]
    Parse {
        /// Payload format.
        format: &'static str,
        /// What went wrong.
        message: String,
    },

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A source returned no roles.
    #[error("{source_name} returned no roles")]
    EmptyCatalog {
        /// Name of the source.
        source_name: String,
    },

    /// Every source failed.
    #[error("rate card data unavailable: {}", .attempts.join("; "))]
    DataSourceUnavailable {
        /// One entry per source tried, with its error.
        attempts: Vec<String>,
    },
}

/// Which source a catalog was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// The configured primary source.
    Primary(String),
    /// The fallback source, after the primary failed.
    Backup(String),
}

impl CatalogOrigin {
    /// Whether the fallback was used.
    #[must_use]
    pub const fn is_backup(&self) -> bool {
        matches!(self, Self::Backup(_))
    }

    /// Name of the source.
    #[must_use]
    pub fn source_name(&self) -> &str {
        match self {
            Self::Primary(name) | Self::Backup(name) => name,
        }
    }
}

impl fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(name) => write!(f, "{name}"),
            Self::Backup(name) => write!(f, "{name} (backup)"),
        }
    }
}

/// A loaded catalog.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// The catalog.
    pub catalog: RoleCatalog,
    /// Where it came from.
    pub origin: CatalogOrigin,
    /// Data quality notes and the primary failure when the backup was used.
    pub warnings: Vec<String>,
    /// When the load completed.
    pub loaded_at: DateTime<Utc>,
}

/// Loads a catalog from a primary source with an optional fallback.
pub struct CatalogLoader {
    primary: Box<dyn CatalogSource>,
    backup: Option<Box<dyn CatalogSource>>,
}

impl CatalogLoader {
    /// Create a loader with no fallback.
    pub fn new(primary: impl CatalogSource + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            backup: None,
        }
    }

    /// Use `backup` when the primary source fails.
    #[must_use]
    pub fn with_backup(mut self, backup: impl CatalogSource + 'static) -> Self {
        self.backup = Some(Box::new(backup));
        self
    }

    /// Remove the fallback.
    #[must_use]
    pub fn without_backup(mut self) -> Self {
        self.backup = None;
        self
    }

    /// Name of the primary source.
    #[must_use]
    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }

    /// Load from the primary source, falling back to the backup.
    ///
    /// A source that succeeds but returns no roles counts as failed.
    pub fn load(&self) -> Result<LoadResult, LoadError> {
        let mut attempts = Vec::new();

        match fetch_roles(self.primary.as_ref()) {
            Ok(roles) => {
                return Ok(build_result(
                    roles,
                    CatalogOrigin::Primary(self.primary.name().to_string()),
                    Vec::new(),
                ));
            }
            Err(e) => {
                warn!(source = self.primary.name(), error = %e, "primary rate card source failed");
                attempts.push(format!("{}: {e}", self.primary.name()));
            }
        }

        if let Some(backup) = &self.backup {
            match fetch_roles(backup.as_ref()) {
                Ok(roles) => {
                    warn!(source = backup.name(), "using backup rate card data");
                    let notice = format!("using backup data ({})", attempts.join("; "));
                    return Ok(build_result(
                        roles,
                        CatalogOrigin::Backup(backup.name().to_string()),
                        vec![notice],
                    ));
                }
                Err(e) => {
                    warn!(source = backup.name(), error = %e, "backup rate card source failed");
                    attempts.push(format!("{}: {e}", backup.name()));
                }
            }
        }

        error!(attempts = attempts.len(), "no rate card source available");
        Err(LoadError::DataSourceUnavailable { attempts })
    }
}

fn fetch_roles(source: &dyn CatalogSource) -> Result<Vec<RoleCost>, LoadError> {
    let roles = source.fetch()?;
    if roles.is_empty() {
        return Err(LoadError::EmptyCatalog {
            source_name: source.name().to_string(),
        });
    }
    debug!(source = source.name(), roles = roles.len(), "fetched roles");
    Ok(roles)
}

fn build_result(
    roles: Vec<RoleCost>,
    origin: CatalogOrigin,
    mut warnings: Vec<String>,
) -> LoadResult {
    let (catalog, catalog_warnings) = RoleCatalog::from_roles_with_warnings(roles);
    for warning in &catalog_warnings {
        warn!(%warning, "rate card data");
    }
    warnings.extend(catalog_warnings.iter().map(ToString::to_string));

    LoadResult {
        catalog,
        origin,
        warnings,
        loaded_at: Utc::now(),
    }
}
