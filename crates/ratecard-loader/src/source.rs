//! Catalog sources.
//!
//! A [`CatalogSource`] produces role records from somewhere: a Google
//! Sheet, a CSV file, the built-in backup table or an in-memory list.

use std::fs;
use std::path::{Path, PathBuf};

use ratecard_core::RoleCost;
use tracing::debug;

use crate::backup::backup_roles;
use crate::config::{SheetAccess, SheetsConfig};
use crate::parse::{parse_api_values, parse_csv, parse_gviz};
use crate::LoadError;

/// Something that can produce role cost records.
pub trait CatalogSource: Send + Sync {
    /// Source name, used in logs and error reports.
    fn name(&self) -> &str;

    /// Fetch all role records.
    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError>;
}

impl<S: CatalogSource + ?Sized> CatalogSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError> {
        (**self).fetch()
    }
}

/// Fetches a URL and returns the response body.
///
/// Implemented by [`UreqFetcher`] when the `http` feature is on; tests
/// and hosts with their own networking supply their own.
pub trait Fetch: Send + Sync {
    /// GET `url` and return the body. Non-success statuses are errors.
    fn get(&self, url: &str) -> Result<String, LoadError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<String, LoadError> + Send + Sync,
{
    fn get(&self, url: &str) -> Result<String, LoadError> {
        self(url)
    }
}

/// Blocking HTTP fetcher backed by `ureq`.
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct UreqFetcher {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl UreqFetcher {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

    /// Create a fetcher with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom overall request timeout.
    #[must_use]
    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

#[cfg(feature = "http")]
impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl Fetch for UreqFetcher {
    fn get(&self, url: &str) -> Result<String, LoadError> {
        let http_error = |e: ureq::Error| LoadError::Http {
            url: redact_query(url).to_string(),
            message: e.to_string(),
        };

        let mut response = self.agent.get(url).call().map_err(http_error)?;
        response.body_mut().read_to_string().map_err(http_error)
    }
}

/// Strip the query string, which may carry an API key.
fn redact_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Google Sheets source, using the values API or the public `gviz`
/// endpoint depending on whether an API key is configured.
pub struct SheetsSource<F = DefaultFetcher> {
    config: SheetsConfig,
    fetcher: F,
}

/// The fetcher [`SheetsSource::new`] uses.
#[cfg(feature = "http")]
pub type DefaultFetcher = UreqFetcher;

/// The fetcher [`SheetsSource::new`] would use; without the `http` feature
/// a fetcher has to be supplied with [`SheetsSource::with_fetcher`].
#[cfg(not(feature = "http"))]
pub type DefaultFetcher = fn(&str) -> Result<String, LoadError>;

#[cfg(feature = "http")]
impl SheetsSource<UreqFetcher> {
    /// Create a source that fetches over HTTP.
    #[must_use]
    pub fn new(config: SheetsConfig) -> Self {
        Self::with_fetcher(config, UreqFetcher::new())
    }
}

impl<F: Fetch> SheetsSource<F> {
    /// Create a source with a custom fetcher.
    pub const fn with_fetcher(config: SheetsConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// The source configuration.
    pub const fn config(&self) -> &SheetsConfig {
        &self.config
    }
}

impl<F: Fetch> CatalogSource for SheetsSource<F> {
    fn name(&self) -> &str {
        match self.config.access() {
            SheetAccess::Api => "google sheets api",
            SheetAccess::Public => "google sheets (public)",
        }
    }

    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError> {
        self.config.validate()?;
        let url = self.config.source_url();
        debug!(url = redact_query(&url), "fetching rate card sheet");

        let body = self.fetcher.get(&url)?;
        PayloadFormat::from(self.config.access()).parse(&body)
    }
}

/// Formats a fetched rate card body can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Sheets v4 `values` JSON.
    ApiValues,
    /// Public `gviz` callback.
    Gviz,
    /// CSV with a header row.
    Csv,
}

impl PayloadFormat {
    /// Parse `body` in this format.
    pub fn parse(self, body: &str) -> Result<Vec<RoleCost>, LoadError> {
        match self {
            Self::ApiValues => parse_api_values(body),
            Self::Gviz => parse_gviz(body),
            Self::Csv => parse_csv(body),
        }
    }
}

impl From<SheetAccess> for PayloadFormat {
    fn from(access: SheetAccess) -> Self {
        match access {
            SheetAccess::Api => Self::ApiValues,
            SheetAccess::Public => Self::Gviz,
        }
    }
}

/// A body that was fetched elsewhere, parsed on [`fetch`](CatalogSource::fetch).
///
/// Lets hosts with their own networking (a browser, for one) reuse the
/// loader's parsing and fallback.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    format: PayloadFormat,
    body: String,
}

impl TextSource {
    /// Create a named source over `body`.
    pub fn new(name: impl Into<String>, format: PayloadFormat, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format,
            body: body.into(),
        }
    }
}

impl CatalogSource for TextSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError> {
        self.format.parse(&self.body)
    }
}

/// A CSV file on disk, with a header row.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    name: String,
}

impl CsvFileSource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("csv file {}", path.display());
        Self { path, name }
    }

    /// The file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError> {
        let text = fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_csv(&text)
    }
}

/// The built-in backup table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupSource;

impl CatalogSource for BackupSource {
    fn name(&self) -> &str {
        "built-in backup"
    }

    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError> {
        Ok(backup_roles())
    }
}

/// A fixed list of records.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    roles: Vec<RoleCost>,
}

impl StaticSource {
    /// Create a named source over `roles`.
    pub fn new(name: impl Into<String>, roles: Vec<RoleCost>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }
}

impl CatalogSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RoleCost>, LoadError> {
        Ok(self.roles.clone())
    }
}
