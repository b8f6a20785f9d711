//! Spreadsheet source configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::store::RefreshPolicy;
use crate::LoadError;

/// Default name of the sheet tab holding the rate card.
pub const DEFAULT_SHEET_NAME: &str = "Rate Card Data";

/// Default auto-refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 60;

/// How the spreadsheet is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetAccess {
    /// Sheets v4 values API, authenticated with an API key.
    Api,
    /// Public `gviz` JSON endpoint for sheets shared by link.
    Public,
}

/// Configuration for the Google Sheets catalog source.
///
/// Missing fields take their defaults, so a config file only needs the
/// sheet id:
///
/// ```json
/// { "sheet_id": "1abc123xyz" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// The spreadsheet id from the sheet URL.
    pub sheet_id: String,
    /// Optional API key; empty or absent means public access.
    pub api_key: Option<String>,
    /// Name of the sheet tab.
    pub sheet_name: String,
    /// Seconds between automatic refreshes.
    pub refresh_interval_secs: u64,
    /// Whether to refresh automatically.
    pub auto_refresh: bool,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            api_key: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            auto_refresh: true,
        }
    }
}

impl SheetsConfig {
    /// Configuration for a sheet, with defaults for everything else.
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            ..Self::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the sheet tab name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the refresh interval.
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_secs = interval.as_secs();
        self
    }

    /// Enable or disable automatic refresh.
    pub const fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Config(e.to_string()))
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// The API key, if one is set and non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Which endpoint will be used.
    #[must_use]
    pub fn access(&self) -> SheetAccess {
        if self.api_key().is_some() {
            SheetAccess::Api
        } else {
            SheetAccess::Public
        }
    }

    /// Check that the configuration can be used to fetch data.
    ///
    /// Refresh settings are not checked; see [`refresh_policy`](Self::refresh_policy).
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.sheet_id.trim().is_empty() {
            return Err(LoadError::Config("sheet_id is not set".to_string()));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(LoadError::Config("sheet_name is empty".to_string()));
        }
        Ok(())
    }

    /// URL of the sheet data for the configured access mode.
    #[must_use]
    pub fn source_url(&self) -> String {
        let id = urlencoding::encode(self.sheet_id.trim());
        let sheet = urlencoding::encode(&self.sheet_name);
        match self.api_key() {
            Some(key) => format!(
                "https://sheets.googleapis.com/v4/spreadsheets/{id}/values/{sheet}?key={}",
                urlencoding::encode(key)
            ),
            None => format!(
                "https://docs.google.com/spreadsheets/d/{id}/gviz/tq?tqx=out:json&sheet={sheet}"
            ),
        }
    }

    /// Refresh schedule described by this configuration.
    ///
    /// A zero interval means the default interval.
    #[must_use]
    pub const fn refresh_policy(&self) -> RefreshPolicy {
        let secs = if self.refresh_interval_secs == 0 {
            DEFAULT_REFRESH_SECS
        } else {
            self.refresh_interval_secs
        };
        RefreshPolicy {
            enabled: self.auto_refresh,
            interval: Duration::from_secs(secs),
        }
    }
}
