//! Catalog source selection shared by all commands.

use anyhow::{Context, Result};
use clap::Args;
use ratecard_loader::{
    BackupSource, CatalogLoader, CsvFileSource, LoadResult, RefreshPolicy, SheetsConfig,
    SheetsSource,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Where to read the rate card from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Sheets configuration file (JSON). Defaults to
    /// `<config dir>/ratecard/config.json` when that file exists.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Google Sheet id, overriding the configuration file.
    #[arg(long, value_name = "ID")]
    pub sheet_id: Option<String>,

    /// Sheet tab name, overriding the configuration file.
    #[arg(long, value_name = "NAME")]
    pub sheet_name: Option<String>,

    /// Sheets API key, overriding the configuration file.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Read roles from a CSV file instead of a sheet.
    #[arg(long, value_name = "FILE", conflicts_with = "offline")]
    pub csv: Option<PathBuf>,

    /// Use only the built-in rate card.
    #[arg(long)]
    pub offline: bool,

    /// Fail instead of falling back to the built-in rate card.
    #[arg(long)]
    pub no_backup: bool,

    /// Show debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl SourceArgs {
    /// The sheet configuration after command-line overrides, or `None` when
    /// no sheet is configured anywhere.
    pub fn sheets_config(&self) -> Result<Option<SheetsConfig>> {
        let path = self
            .config
            .clone()
            .or_else(|| default_config_path().filter(|p| p.exists()));

        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "reading sheets configuration");
                Some(
                    SheetsConfig::from_file(&path)
                        .with_context(|| format!("failed to load {}", path.display()))?,
                )
            }
            None => None,
        };

        if let Some(id) = &self.sheet_id {
            config.get_or_insert_with(SheetsConfig::default).sheet_id.clone_from(id);
        }
        if let Some(config) = config.as_mut() {
            if let Some(name) = &self.sheet_name {
                config.sheet_name.clone_from(name);
            }
            if let Some(key) = &self.api_key {
                config.api_key = Some(key.clone());
            }
        }

        Ok(config)
    }

    /// Build the loader these arguments describe.
    pub fn loader(&self) -> Result<CatalogLoader> {
        let loader = if self.offline {
            return Ok(CatalogLoader::new(BackupSource));
        } else if let Some(path) = &self.csv {
            CatalogLoader::new(CsvFileSource::new(path))
        } else if let Some(config) = self.sheets_config()? {
            CatalogLoader::new(SheetsSource::new(config))
        } else {
            info!("no sheet configured; using the built-in rate card");
            return Ok(CatalogLoader::new(BackupSource));
        };

        Ok(if self.no_backup {
            loader
        } else {
            loader.with_backup(BackupSource)
        })
    }

    /// Refresh schedule from the sheet configuration, or the default.
    pub fn refresh_policy(&self) -> Result<RefreshPolicy> {
        Ok(self
            .sheets_config()?
            .map(|c| c.refresh_policy())
            .unwrap_or_default())
    }

    /// Load the catalog.
    pub fn load(&self) -> Result<LoadResult> {
        self.loader()?.load().context("failed to load rate card")
    }
}

/// Default location of the sheets configuration file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ratecard").join("config.json"))
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
