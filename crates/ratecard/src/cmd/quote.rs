//! Quote command: price one role at every location.

use crate::cmd::completions::ShellType;
use crate::cmd::source::{init_tracing, SourceArgs};
use crate::render;
use anyhow::{Context, Result};
use clap::Parser;
use ratecard_core::{CalculationInput, Location, PricingMode, Session, DEFAULT_MARGIN};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;

/// Price a role at every location and recommend one.
#[derive(Parser, Debug)]
#[command(name = "ratecard-quote", version, about = "Price a role at every location")]
pub struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    #[command(flatten)]
    pub quote_args: QuoteArgs,
}

/// Quote-specific arguments.
#[derive(Parser, Debug)]
pub struct QuoteArgs {
    /// Role name, as listed by ratecard-roles.
    #[arg(short, long, required_unless_present = "generate_completions")]
    pub role: Option<String>,

    /// Hours of work.
    #[arg(short = 'H', long, required_unless_present = "generate_completions")]
    pub hours: Option<Decimal>,

    /// Target margin in percent (e.g. 60). Defaults to 60.
    #[arg(short, long, value_name = "PCT", conflicts_with = "rate")]
    pub margin: Option<Decimal>,

    /// Fixed client rate per hour.
    #[arg(long, value_name = "AMOUNT")]
    pub rate: Option<Decimal>,

    /// Location to compare against the recommendation.
    #[arg(short, long)]
    pub location: Option<Location>,

    /// Print the quote as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl QuoteArgs {
    /// The pricing mode requested on the command line.
    #[must_use]
    pub fn pricing_mode(&self) -> PricingMode {
        match (self.rate, self.margin) {
            (Some(rate), _) => PricingMode::Rate(rate),
            (None, Some(percent)) => PricingMode::Margin(percent / Decimal::ONE_HUNDRED),
            (None, None) => PricingMode::Margin(DEFAULT_MARGIN),
        }
    }
}

#[derive(Serialize)]
struct QuoteOutput<'a> {
    role: &'a str,
    input: &'a CalculationInput,
    evaluation: &'a ratecard_core::Evaluation,
    best: Location,
}

/// Main entry point for the quote command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, "ratecard-quote");
        return ExitCode::SUCCESS;
    }

    init_tracing(args.quote_args.source.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args.quote_args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run the quote command.
pub fn run<W: Write>(args: &QuoteArgs, writer: &mut W) -> Result<()> {
    let role = args.role.as_deref().context("--role is required")?;
    let hours = args.hours.context("--hours is required")?;

    let loaded = args.source.load()?;
    let mut input = CalculationInput::new(role, hours, args.pricing_mode());
    input.location = args.location;

    let eval = Session::new()
        .quote(&loaded.catalog, &input)
        .with_context(|| format!("cannot quote {role}"))?;

    if args.json {
        let output = QuoteOutput {
            role,
            input: &input,
            evaluation: &eval,
            best: eval.best().location,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        return Ok(());
    }

    render::write_evaluation(writer, role, input.mode, &eval, input.location)?;
    writeln!(writer)?;
    render::write_recommendation(writer, &eval, input.location)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offline(args: &[&str]) -> QuoteArgs {
        let mut argv = vec!["ratecard-quote", "--offline"];
        argv.extend_from_slice(args);
        Args::parse_from(argv).quote_args
    }

    #[test]
    fn test_quote_args_parsing() {
        let args = offline(&["--role", "QA Tester", "--hours", "40"]);
        assert_eq!(args.role.as_deref(), Some("QA Tester"));
        assert_eq!(args.hours, Some(dec!(40)));
        assert_eq!(args.pricing_mode(), PricingMode::Margin(dec!(0.60)));
        assert!(args.source.offline);
    }

    #[test]
    fn test_margin_is_a_percentage() {
        let args = offline(&["-r", "QA Tester", "-H", "40", "-m", "35", "-l", "nearshore"]);
        assert_eq!(args.pricing_mode(), PricingMode::Margin(dec!(0.35)));
        assert_eq!(args.location, Some(Location::Nearshore));
    }

    #[test]
    fn test_rate_conflicts_with_margin() {
        let result = Args::try_parse_from([
            "ratecard-quote", "-r", "QA", "-H", "1", "--margin", "50", "--rate", "100",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_role_required() {
        assert!(Args::try_parse_from(["ratecard-quote", "--hours", "10"]).is_err());
        assert!(Args::try_parse_from(["ratecard-quote", "--generate-completions", "bash"]).is_ok());
    }

    #[test]
    fn test_run_rate_quote() {
        let args = offline(&[
            "--role",
            "Salesforce Technical Architect",
            "--hours",
            "10",
            "--rate",
            "150",
        ]);
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Offshore has the highest margin (78.7%)"));
        assert!(text.contains("36.7%"));
        assert!(text.contains("70.0%"));
    }

    #[test]
    fn test_run_json() {
        let args = offline(&["--role", "Senior Developer", "--hours", "100", "--json"]);
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["best"], "offshore");
        assert_eq!(value["role"], "Senior Developer");
    }

    #[test]
    fn test_unknown_role() {
        let args = offline(&["--role", "Astronaut", "--hours", "1"]);
        let err = run(&args, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("role not found: Astronaut"));
    }

    #[test]
    fn test_invalid_hours() {
        let args = offline(&["--role", "QA Tester", "--hours", "0"]);
        assert!(run(&args, &mut Vec::new()).is_err());
    }
}
