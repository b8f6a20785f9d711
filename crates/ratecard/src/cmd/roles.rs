//! Roles command: list the catalog, optionally re-loading it on a schedule.

use crate::cmd::completions::ShellType;
use crate::cmd::source::{init_tracing, SourceArgs};
use crate::render;
use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use ratecard_loader::{CatalogStore, RefreshPolicy};
use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// List the rate card roles and their hourly costs.
#[derive(Parser, Debug)]
#[command(name = "ratecard-roles", version, about = "List rate card roles")]
pub struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    #[command(flatten)]
    pub roles_args: RolesArgs,
}

/// Roles-specific arguments.
#[derive(Parser, Debug)]
pub struct RolesArgs {
    /// Keep running and re-list the roles on every refresh.
    #[arg(short, long)]
    pub watch: bool,

    /// Print the catalog as JSON.
    #[arg(long, conflicts_with = "watch")]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Main entry point for the roles command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, "ratecard-roles");
        return ExitCode::SUCCESS;
    }

    init_tracing(args.roles_args.source.verbose);

    let mut stdout = io::stdout().lock();
    let result = if args.roles_args.watch {
        watch(&args.roles_args, &mut stdout)
    } else {
        run(&args.roles_args, &mut stdout)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// List the catalog once.
pub fn run<W: Write>(args: &RolesArgs, writer: &mut W) -> Result<()> {
    let loaded = args.source.load()?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &loaded.catalog)?;
        writeln!(writer)?;
        return Ok(());
    }

    render::write_roles(
        writer,
        &loaded.catalog,
        Some(&loaded.origin),
        Some(loaded.loaded_at),
    )?;
    Ok(())
}

/// Re-list the catalog every time the refresh policy says it is due.
///
/// A failed refresh keeps showing the previous catalog. Runs until the
/// process is interrupted.
pub fn watch<W: Write>(args: &RolesArgs, writer: &mut W) -> Result<()> {
    let loader = args.source.loader()?;
    let policy = watch_policy(args.source.refresh_policy()?);
    let store = CatalogStore::new();
    debug!(interval = ?policy.interval, "watching rate card");

    loop {
        match store.refresh_if_due(&loader, &policy, Utc::now()) {
            Some(Ok(catalog)) => {
                writeln!(writer)?;
                render::write_roles(writer, &catalog, store.origin().as_ref(), store.loaded_at())?;
                writer.flush()?;
            }
            Some(Err(e)) => {
                writeln!(writer, "refresh failed, keeping previous data: {e}")?;
                writer.flush()?;
            }
            None => {}
        }
        thread::sleep(Duration::from_secs(1));
    }
}

/// `--watch` always refreshes, at the configured interval.
fn watch_policy(configured: RefreshPolicy) -> RefreshPolicy {
    let interval = if configured.interval.is_zero() {
        RefreshPolicy::default().interval
    } else {
        configured.interval
    };
    RefreshPolicy::every(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_args_parsing() {
        let args = Args::parse_from(["ratecard-roles", "--watch", "--sheet-id", "abc"]);
        assert!(args.roles_args.watch);
        assert_eq!(args.roles_args.source.sheet_id.as_deref(), Some("abc"));
        assert!(Args::try_parse_from(["ratecard-roles", "--watch", "--json"]).is_err());
    }

    #[test]
    fn test_run_offline() {
        let args = Args::parse_from(["ratecard-roles", "--offline"]).roles_args;
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Marketing Cloud Specialist"));
        assert!(text.contains("7 roles from built-in backup"));
    }

    #[test]
    fn test_run_json() {
        let args = Args::parse_from(["ratecard-roles", "--offline", "--json"]).roles_args;
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        let roles: Vec<ratecard_core::RoleCost> = serde_json::from_slice(&out).unwrap();
        assert_eq!(roles.len(), 7);
    }

    #[test]
    fn test_watch_policy() {
        let policy = watch_policy(RefreshPolicy::disabled());
        assert!(policy.enabled);
        assert_eq!(policy.interval, Duration::from_secs(60));

        let policy = watch_policy(RefreshPolicy {
            enabled: false,
            interval: Duration::from_secs(5),
        });
        assert!(policy.enabled);
        assert_eq!(policy.interval, Duration::from_secs(5));
    }
}
