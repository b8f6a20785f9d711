//! Rate Card WASM Bindings.
//!
//! This crate provides WebAssembly bindings for using the rate card
//! calculator from JavaScript/TypeScript. The page fetches the spreadsheet
//! itself and hands the response body to a `RateCardSession`.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { RateCardSession, formatCurrency } from '@ratecard/wasm';
//!
//! await init();
//!
//! const session = new RateCardSession();
//! const body = await fetch(sheetUrl).then(r => r.text()).catch(() => '');
//! const report = session.loadGviz(body);   // falls back to built-in data
//!
//! const quote = session.quote({ role: 'QA Tester', hours: '40', rate: '120' });
//! console.log(quote.best, quote.quotes);
//!
//! session.addPosition({ role: 'QA Tester', hours: '40', rate: '120', location: 'nearshore' });
//! const summary = session.summary();
//! console.log(formatCurrency(summary.total_client_charge));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

use std::str::FromStr;

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use ratecard_core::{
    format_currency, format_percentage, Location, ModeLock, PositionId, RoleCatalog, Session,
    Summary,
};
use ratecard_loader::{BackupSource, CatalogLoader, PayloadFormat, TextSource};
use types::{LoadReport, PositionInput, PositionView, QuoteResult};

// =============================================================================
// TypeScript Type Definitions
// =============================================================================

#[wasm_bindgen(typescript_custom_section)]
const TS_TYPES: &'static str = r#"
/** Staffing location. */
export type Location = 'onshore' | 'offshore' | 'nearshore';

/** Input for quote() and addPosition(). Decimals may be strings or numbers. */
export interface PositionInput {
    role: string;
    hours: string | number;
    margin?: string | number;
    rate?: string | number;
    location?: Location;
}

/** Hourly costs of a role. */
export interface RoleCost {
    role: string;
    onshore: string;
    offshore: string;
    nearshore: string;
}

/** Figures for one location. */
export interface LocationQuote {
    location: Location;
    cost_per_hour: string;
    client_rate: string;
    total_cost: string;
    profit: string;
    margin: string;
}

/** Result of loading a catalog. */
export interface LoadReport {
    role_count: number;
    source: string;
    used_backup: boolean;
    warnings: string[];
}

/** Every location priced for one input. */
export interface QuoteResult {
    mode: 'margin' | 'rate';
    hours: string;
    quotes: LocationQuote[];
    ranked: Location[];
    best: Location;
}

/** Pricing mode with its parameter. */
export type PricingMode =
    | { mode: 'margin'; value: string }
    | { mode: 'rate'; value: string };

/** A ledger position with its current figures. */
export interface PositionView {
    id: number;
    role: string;
    hours: string;
    mode: PricingMode;
    selected: Location | null;
    location: Location;
    quote: LocationQuote;
    comparison: QuoteResult;
}

/** Ledger totals with every position moved to one location. */
export interface LocationScenario {
    location: Location;
    total_client_charge: string;
    total_cost: string;
    total_profit: string;
    average_margin: string;
}

/** Selected-location counts. */
export interface LocationMix {
    onshore: number;
    offshore: number;
    nearshore: number;
    unassigned: number;
}

/** Aggregate figures for the ledger. */
export interface Summary {
    position_count: number;
    total_hours: string;
    total_client_charge: string;
    total_cost: string;
    total_profit: string;
    average_margin: string;
    optimal_client_charge: string;
    optimal_profit: string;
    foregone_profit: string;
    client_savings: string;
    scenarios: LocationScenario[];
    mix: LocationMix;
    mode: 'margin' | 'rate' | null;
}
"#;

// =============================================================================
// Initialization
// =============================================================================

/// Initialize the WASM module.
///
/// This sets up panic hooks for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// =============================================================================
// Internal Helpers
// =============================================================================

/// Serialize a value to `JsValue` using JSON-compatible settings.
///
/// This ensures:
/// - `None` serializes as `null` (not `undefined`)
/// - Maps serialize as plain objects (not ES2015 `Map`)
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

fn from_js(value: JsValue) -> Result<PositionInput, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn js_error(message: impl std::fmt::Display) -> JsError {
    JsError::new(&message.to_string())
}

fn parse_decimal(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("invalid number '{value}': {e}"))
}

// =============================================================================
// Public API
// =============================================================================

/// Get version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format a decimal string as dollars, e.g. `"1234.5"` → `"$1,234.50"`.
#[wasm_bindgen(js_name = "formatCurrency")]
pub fn format_currency_js(value: &str) -> Result<String, JsError> {
    parse_decimal(value).map(format_currency).map_err(js_error)
}

/// Format a ratio string as a percentage, e.g. `"0.3667"` → `"36.7%"`.
#[wasm_bindgen(js_name = "formatPercentage")]
pub fn format_percentage_js(value: &str) -> Result<String, JsError> {
    parse_decimal(value).map(format_percentage).map_err(js_error)
}

/// A calculator session: the role catalog, the position ledger and the
/// pricing-mode lock.
///
/// ```javascript
/// const session = new RateCardSession();
/// session.loadBackup();
/// const id = session.addPosition({ role: 'Senior Developer', hours: 100, margin: '0.5' });
/// session.selectLocation(id, 'nearshore');
/// ```
#[wasm_bindgen]
pub struct RateCardSession {
    catalog: RoleCatalog,
    session: Session,
}

impl Default for RateCardSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl RateCardSession {
    /// Create a session with an empty catalog.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            catalog: RoleCatalog::new(),
            session: Session::new(),
        }
    }

    /// Load the built-in rate card.
    #[wasm_bindgen(js_name = "loadBackup")]
    pub fn load_backup(&mut self) -> Result<JsValue, JsError> {
        let report = self
            .load_from(CatalogLoader::new(BackupSource))
            .map_err(js_error)?;
        to_js(&report)
    }

    /// Load a Sheets v4 `values` response, falling back to the built-in
    /// rate card if it cannot be used.
    #[wasm_bindgen(js_name = "loadApiValues")]
    pub fn load_api_values(&mut self, body: &str) -> Result<JsValue, JsError> {
        let report = self
            .load_body(PayloadFormat::ApiValues, body)
            .map_err(js_error)?;
        to_js(&report)
    }

    /// Load a public `gviz` response, falling back to the built-in rate
    /// card if it cannot be used.
    #[wasm_bindgen(js_name = "loadGviz")]
    pub fn load_gviz(&mut self, body: &str) -> Result<JsValue, JsError> {
        let report = self.load_body(PayloadFormat::Gviz, body).map_err(js_error)?;
        to_js(&report)
    }

    /// Load CSV text with a header row, falling back to the built-in rate
    /// card if it cannot be used.
    #[wasm_bindgen(js_name = "loadCsv")]
    pub fn load_csv(&mut self, body: &str) -> Result<JsValue, JsError> {
        let report = self.load_body(PayloadFormat::Csv, body).map_err(js_error)?;
        to_js(&report)
    }

    /// All roles in catalog order.
    #[wasm_bindgen]
    pub fn roles(&self) -> Result<JsValue, JsError> {
        to_js(&self.catalog.roles())
    }

    /// Quote a role at every location without adding it.
    #[wasm_bindgen]
    pub fn quote(&self, input: JsValue) -> Result<JsValue, JsError> {
        let result = self.quote_input(&from_js(input)?).map_err(js_error)?;
        to_js(&result)
    }

    /// Add a position and return its id.
    #[wasm_bindgen(js_name = "addPosition")]
    pub fn add_position(&mut self, input: JsValue) -> Result<u32, JsError> {
        let id = self.add_input(&from_js(input)?).map_err(js_error)?;
        u32::try_from(id.get()).map_err(|_| js_error("position id out of range"))
    }

    /// Remove a position. Returns `false` if the id is unknown.
    #[wasm_bindgen(js_name = "removePosition")]
    pub fn remove_position(&mut self, id: u32) -> bool {
        self.session
            .remove_position(PositionId::new(u64::from(id)))
            .is_some()
    }

    /// Choose the location of a position.
    #[wasm_bindgen(js_name = "selectLocation")]
    pub fn select_location(&mut self, id: u32, location: &str) -> Result<(), JsError> {
        let location = Location::from_str(location).map_err(js_error)?;
        self.session
            .select_location(PositionId::new(u64::from(id)), location)
            .map_err(js_error)
    }

    /// Remove every position and release the mode lock.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// All positions with their current figures.
    #[wasm_bindgen]
    pub fn positions(&self) -> Result<JsValue, JsError> {
        to_js(&self.position_views())
    }

    /// Aggregate statistics over all positions.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsError> {
        to_js(&self.summary_inner())
    }

    /// The pricing-mode lock: `"unset"`, `"margin"` or `"rate"`.
    #[wasm_bindgen(js_name = "modeLock")]
    pub fn mode_lock(&self) -> String {
        match self.session.mode_lock() {
            ModeLock::Unset => "unset",
            ModeLock::Margin => "margin",
            ModeLock::Rate => "rate",
        }
        .to_string()
    }
}

// Native implementations, kept apart from the bindings so they can be
// tested without a JavaScript host.
impl RateCardSession {
    fn load_body(&mut self, format: PayloadFormat, body: &str) -> Result<LoadReport, String> {
        let loader = CatalogLoader::new(TextSource::new("google sheet", format, body))
            .with_backup(BackupSource);
        self.load_from(loader)
    }

    fn load_from(&mut self, loader: CatalogLoader) -> Result<LoadReport, String> {
        let result = loader.load().map_err(|e| e.to_string())?;
        let report = LoadReport {
            role_count: result.catalog.len(),
            source: result.origin.source_name().to_string(),
            used_backup: result.origin.is_backup(),
            warnings: result.warnings,
        };
        self.catalog = result.catalog;
        Ok(report)
    }

    fn quote_input(&self, input: &PositionInput) -> Result<QuoteResult, String> {
        let input = input.to_input()?;
        let eval = self
            .session
            .quote(&self.catalog, &input)
            .map_err(|e| e.to_string())?;
        Ok(QuoteResult::from(&eval))
    }

    fn add_input(&mut self, input: &PositionInput) -> Result<PositionId, String> {
        let input = input.to_input()?;
        self.session
            .add_position(&self.catalog, &input)
            .map_err(|e| e.to_string())
    }

    fn position_views(&self) -> Vec<PositionView> {
        self.session.positions().iter().map(PositionView::from).collect()
    }

    fn summary_inner(&self) -> Summary {
        self.session.summary()
    }

    #[cfg(test)]
    fn role_names(&self) -> Vec<String> {
        self.catalog.names().map(str::to_string).collect()
    }
}
