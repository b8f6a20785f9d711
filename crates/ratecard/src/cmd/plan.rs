//! Plan command: run a staffing plan through a session and summarize it.
//!
//! A plan is a JSON file:
//!
//! ```json
//! {
//!   "positions": [
//!     { "role": "Senior Developer", "hours": 120, "margin": 55, "location": "nearshore" },
//!     { "role": "QA Tester", "hours": 80 }
//!   ]
//! }
//! ```
//!
//! `margin` is a percentage and `rate` a client rate per hour; at most one
//! may be given, and neither means the default 60% margin. A position
//! without a `location` is a comparison and counts at its best location.

use crate::cmd::completions::ShellType;
use crate::cmd::source::{init_tracing, SourceArgs};
use crate::render;
use anyhow::{bail, Context, Result};
use clap::Parser;
use ratecard_core::{
    CalculationInput, Location, Position, PricingMode, Session, Summary, DEFAULT_MARGIN,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

/// Run a staffing plan and print its summary.
#[derive(Parser, Debug)]
#[command(name = "ratecard-plan", version, about = "Run a staffing plan and summarize it")]
pub struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    #[command(flatten)]
    pub plan_args: PlanArgs,
}

/// Plan-specific arguments.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// The plan file (JSON)
    #[arg(value_name = "FILE", required_unless_present = "generate_completions")]
    pub file: Option<PathBuf>,

    /// Print positions and summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Stop at the first position that cannot be added.
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// A staffing plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Positions in the order they are added.
    pub positions: Vec<PlanEntry>,
}

/// One planned position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanEntry {
    /// Role name.
    pub role: String,
    /// Hours of work.
    pub hours: Decimal,
    /// Target margin in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Decimal>,
    /// Fixed client rate per hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    /// Chosen location; absent for a comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl PlanEntry {
    /// The calculator input for this entry.
    pub fn input(&self) -> Result<CalculationInput> {
        let mode = match (self.margin, self.rate) {
            (Some(_), Some(_)) => bail!("give either margin or rate, not both"),
            (Some(percent), None) => PricingMode::Margin(percent / Decimal::ONE_HUNDRED),
            (None, Some(rate)) => PricingMode::Rate(rate),
            (None, None) => PricingMode::Margin(DEFAULT_MARGIN),
        };
        let mut input = CalculationInput::new(self.role.clone(), self.hours, mode);
        input.location = self.location;
        Ok(input)
    }
}

impl Plan {
    /// Read a plan file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid plan {}", path.display()))
    }
}

/// Result of running a plan.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    /// Positions that were added.
    pub positions: Vec<Position>,
    /// Aggregate over the added positions.
    pub summary: Summary,
    /// One message per entry that was skipped.
    pub skipped: Vec<String>,
}

/// Main entry point for the plan command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, "ratecard-plan");
        return ExitCode::SUCCESS;
    }

    init_tracing(args.plan_args.source.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args.plan_args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run the plan command.
pub fn run<W: Write>(args: &PlanArgs, writer: &mut W) -> Result<()> {
    let file = args.file.as_deref().context("a plan file is required")?;
    let plan = Plan::from_file(file)?;
    let loaded = args.source.load()?;

    let report = execute(&plan, &loaded.catalog, args.strict)?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    render::write_positions(writer, &report.positions)?;
    writeln!(writer)?;
    render::write_summary(writer, &report.summary)?;
    for message in &report.skipped {
        writeln!(writer, "skipped: {message}")?;
    }
    Ok(())
}

/// Add every plan entry to a fresh session.
///
/// Entries that cannot be added are skipped and reported, or abort the
/// run when `strict` is set.
pub fn execute(
    plan: &Plan,
    catalog: &ratecard_core::RoleCatalog,
    strict: bool,
) -> Result<PlanReport> {
    let mut session = Session::new();
    let mut skipped = Vec::new();

    for (n, entry) in plan.positions.iter().enumerate() {
        let added = entry
            .input()
            .and_then(|input| {
                session
                    .add_position(catalog, &input)
                    .map_err(anyhow::Error::from)
            })
            .with_context(|| format!("position {} ({})", n + 1, entry.role));

        if let Err(e) = added {
            if strict {
                return Err(e);
            }
            let message = format!("{e:#}");
            warn!(error = %message, "skipping plan entry");
            skipped.push(message);
        }
    }

    Ok(PlanReport {
        positions: session.positions().to_vec(),
        summary: session.summary(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratecard_core::{RoleCatalog, RoleCost};
    use rust_decimal_macros::dec;

    fn catalog() -> RoleCatalog {
        RoleCatalog::from_roles([
            RoleCost::new("Dev", dec!(85), dec!(28), dec!(40)),
            RoleCost::new("QA", dec!(55), dec!(15), dec!(30)),
        ])
    }

    fn plan(json: &str) -> Plan {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_entry_input() {
        let plan = plan(
            r#"{"positions": [
                {"role": "Dev", "hours": 10, "margin": 50, "location": "onshore"},
                {"role": "QA", "hours": "7.5"}
            ]}"#,
        );
        let first = plan.positions[0].input().unwrap();
        assert_eq!(first.mode, PricingMode::Margin(dec!(0.5)));
        assert_eq!(first.location, Some(Location::Onshore));
        let second = plan.positions[1].input().unwrap();
        assert_eq!(second.hours, dec!(7.5));
        assert_eq!(second.mode, PricingMode::Margin(DEFAULT_MARGIN));
        assert_eq!(second.location, None);
    }

    #[test]
    fn test_margin_and_rate_rejected() {
        let plan = plan(r#"{"positions": [{"role": "Dev", "hours": 1, "margin": 50, "rate": 90}]}"#);
        assert!(plan.positions[0].input().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Plan, _> =
            serde_json::from_str(r#"{"positions": [{"role": "Dev", "hours": 1, "hrs": 2}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_skips_bad_entries() {
        let plan = plan(
            r#"{"positions": [
                {"role": "Dev", "hours": 10, "margin": 50, "location": "onshore"},
                {"role": "Nobody", "hours": 10},
                {"role": "QA", "hours": 10, "rate": 100},
                {"role": "QA", "hours": 10, "location": "offshore"}
            ]}"#,
        );
        let report = execute(&plan, &catalog(), false).unwrap();

        assert_eq!(report.positions.len(), 2);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].contains("position 2 (Nobody)"));
        assert!(report.skipped[1].contains("locked to margin mode"));
        // Dev onshore 1700 + QA offshore 15 / 0.4 * 10 = 375
        assert_eq!(report.summary.total_client_charge, dec!(2075));
    }

    #[test]
    fn test_execute_strict() {
        let plan = plan(r#"{"positions": [{"role": "Nobody", "hours": 10}]}"#);
        let err = execute(&plan, &catalog(), true).unwrap_err();
        assert!(format!("{err:#}").contains("role not found: Nobody"));
    }

    #[test]
    fn test_plan_args_parsing() {
        let args = Args::parse_from(["ratecard-plan", "plan.json", "--json", "--offline"]);
        assert_eq!(args.plan_args.file, Some(PathBuf::from("plan.json")));
        assert!(args.plan_args.json);
        assert!(!args.plan_args.strict);
        assert!(args.plan_args.source.offline);
    }
}
