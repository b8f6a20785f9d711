//! Shared, refreshable catalog.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use ratecard_core::RoleCatalog;
use tracing::{info, warn};

use crate::{CatalogLoader, CatalogOrigin, LoadError, LoadResult};

/// When to reload the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Whether automatic refresh is on.
    pub enabled: bool,
    /// Time between refreshes.
    pub interval: Duration,
}

impl RefreshPolicy {
    /// Never refresh automatically.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            interval: Duration::ZERO,
        }
    }

    /// Refresh every `interval`.
    #[must_use]
    pub const fn every(interval: Duration) -> Self {
        Self {
            enabled: true,
            interval,
        }
    }

    /// Time of the next refresh after a load at `last`.
    #[must_use]
    pub fn next_refresh(&self, last: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.enabled {
            return None;
        }
        let interval = chrono::Duration::from_std(self.interval).ok()?;
        last.checked_add_signed(interval)
    }

    /// Whether a refresh is due at `now`. Something never loaded is
    /// always due.
    #[must_use]
    pub fn is_due(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            None => true,
            Some(last) => self.next_refresh(last).is_some_and(|next| now >= next),
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::every(Duration::from_secs(crate::config::DEFAULT_REFRESH_SECS))
    }
}

#[derive(Debug, Default)]
struct StoreState {
    catalog: Arc<RoleCatalog>,
    origin: Option<CatalogOrigin>,
    loaded_at: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// The current catalog, shared between readers and a refresher.
///
/// Readers take an [`Arc`] snapshot and keep using it while a refresh
/// swaps in a new catalog. A failed refresh leaves the previous catalog in
/// place.
#[derive(Debug, Default)]
pub struct CatalogStore {
    state: RwLock<StoreState>,
}

impl CatalogStore {
    /// Create a store holding an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a completed load.
    #[must_use]
    pub fn from_load(result: LoadResult) -> Self {
        let store = Self::new();
        store.install(result);
        store
    }

    /// The current catalog.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RoleCatalog> {
        Arc::clone(&self.state.read().catalog)
    }

    /// Where the current catalog came from, if anything has been loaded.
    #[must_use]
    pub fn origin(&self) -> Option<CatalogOrigin> {
        self.state.read().origin.clone()
    }

    /// When the current catalog was loaded.
    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().loaded_at
    }

    /// Message of the most recent failed refresh, cleared by a success.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Reload through `loader` and install the result.
    ///
    /// On failure the previous catalog stays current and the error is
    /// both recorded and returned.
    pub fn refresh(&self, loader: &CatalogLoader) -> Result<Arc<RoleCatalog>, LoadError> {
        match loader.load() {
            Ok(result) => {
                info!(
                    roles = result.catalog.len(),
                    origin = %result.origin,
                    "rate card refreshed"
                );
                Ok(self.install(result))
            }
            Err(e) => {
                warn!(error = %e, "rate card refresh failed; keeping previous data");
                self.state.write().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// When a scheduled refresh was last attempted, successful or not.
    #[must_use]
    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_attempt
    }

    /// Refresh if `policy` says one is due at `now`. Returns `None` when
    /// nothing was attempted.
    ///
    /// The schedule runs from the later of the last load and the last
    /// attempt, so a failing source is retried once per interval.
    pub fn refresh_if_due(
        &self,
        loader: &CatalogLoader,
        policy: &RefreshPolicy,
        now: DateTime<Utc>,
    ) -> Option<Result<Arc<RoleCatalog>, LoadError>> {
        let last = {
            let state = self.state.read();
            state.loaded_at.max(state.last_attempt)
        };
        if !policy.is_due(last, now) {
            return None;
        }
        self.state.write().last_attempt = Some(now);
        Some(self.refresh(loader))
    }

    fn install(&self, result: LoadResult) -> Arc<RoleCatalog> {
        let catalog = Arc::new(result.catalog);
        let mut state = self.state.write();
        state.catalog = Arc::clone(&catalog);
        state.origin = Some(result.origin);
        state.loaded_at = Some(result.loaded_at);
        state.last_error = None;
        catalog
    }
}
