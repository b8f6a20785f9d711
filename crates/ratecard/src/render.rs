//! Plain-text rendering of quotes, positions and summaries.

use chrono::{DateTime, Utc};
use ratecard_core::{
    format_currency, format_percentage, Evaluation, Location, ModeKind, Position, PricingMode,
    RoleCatalog, Summary,
};
use ratecard_loader::CatalogOrigin;
use rust_decimal::Decimal;
use std::io::{self, Write};

/// Write the catalog as a table.
pub fn write_roles<W: Write>(
    writer: &mut W,
    catalog: &RoleCatalog,
    origin: Option<&CatalogOrigin>,
    loaded_at: Option<DateTime<Utc>>,
) -> io::Result<()> {
    let width = catalog
        .names()
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max("Role".len());

    writeln!(
        writer,
        "{:<width$}  {:>10}  {:>10}  {:>10}",
        "Role", "Onshore", "Offshore", "Nearshore"
    )?;
    for role in catalog.roles() {
        writeln!(
            writer,
            "{:<width$}  {:>10}  {:>10}  {:>10}",
            role.role,
            format_currency(role.onshore),
            format_currency(role.offshore),
            format_currency(role.nearshore),
        )?;
    }

    if let Some(origin) = origin {
        write!(writer, "\n{} roles from {origin}", catalog.len())?;
        if let Some(at) = loaded_at {
            write!(writer, ", updated {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write the per-location table for one evaluation, marking the best
/// location and the selected one.
pub fn write_evaluation<W: Write>(
    writer: &mut W,
    role: &str,
    mode: PricingMode,
    eval: &Evaluation,
    selected: Option<Location>,
) -> io::Result<()> {
    writeln!(writer, "{role}, {} hours, {}", eval.hours.normalize(), mode_parameter(mode))?;
    writeln!(
        writer,
        "  {:<10} {:>10} {:>12} {:>14} {:>14} {:>8}",
        "Location", "Cost/hr", "Client rate", "Client total", "Profit", "Margin"
    )?;
    for quote in eval.quotes() {
        let mut marks = Vec::new();
        if eval.is_best(quote.location) {
            marks.push("best");
        }
        if selected == Some(quote.location) {
            marks.push("selected");
        }
        let marks = if marks.is_empty() {
            String::new()
        } else {
            format!("  ({})", marks.join(", "))
        };
        writeln!(
            writer,
            "  {:<10} {:>10} {:>12} {:>14} {:>14} {:>8}{marks}",
            quote.location.display_name(),
            format_currency(quote.cost_per_hour),
            format_currency(quote.client_rate),
            format_currency(quote.total_cost),
            format_currency(quote.profit),
            format_percentage(quote.margin),
        )?;
    }
    Ok(())
}

/// Write the recommendation line for an evaluation, plus the gain from
/// switching when a different location is selected.
pub fn write_recommendation<W: Write>(
    writer: &mut W,
    eval: &Evaluation,
    selected: Option<Location>,
) -> io::Result<()> {
    let best = eval.best();
    match eval.mode {
        ModeKind::Margin => writeln!(
            writer,
            "Recommendation: {} has the lowest client charge ({}) at {} margin, earning {} profit.",
            best.location.display_name(),
            format_currency(best.total_cost),
            format_percentage(best.margin),
            format_currency(best.profit),
        )?,
        ModeKind::Rate => writeln!(
            writer,
            "Recommendation: {} has the highest margin ({}), earning {} profit.",
            best.location.display_name(),
            format_percentage(best.margin),
            format_currency(best.profit),
        )?,
    }

    if let Some(current) = selected.filter(|l| *l != best.location) {
        let current = eval.quote(current);
        match eval.mode {
            ModeKind::Margin => writeln!(
                writer,
                "Switching from {} to {} saves the client {}.",
                current.location.display_name(),
                best.location.display_name(),
                format_currency(current.total_cost - best.total_cost),
            )?,
            ModeKind::Rate => writeln!(
                writer,
                "Switching from {} to {} adds {} profit ({} points of margin).",
                current.location.display_name(),
                best.location.display_name(),
                format_currency(best.profit - current.profit),
                format_points(best.margin - current.margin),
            )?,
        }
    }
    Ok(())
}

/// Write one line per position.
pub fn write_positions<W: Write>(writer: &mut W, positions: &[Position]) -> io::Result<()> {
    for position in positions {
        let quote = position.selected_quote();
        let location = if position.is_comparison() {
            format!("best: {}", quote.location.display_name())
        } else {
            quote.location.display_name().to_string()
        };
        writeln!(
            writer,
            "{:>4}  {}  {}h  {}  {}  charge {}  profit {}  margin {}",
            position.id.to_string(),
            position.role(),
            position.hours.normalize(),
            mode_parameter(position.mode),
            location,
            format_currency(quote.total_cost),
            format_currency(quote.profit),
            format_percentage(quote.margin),
        )?;
    }
    Ok(())
}

/// Write the aggregate summary.
pub fn write_summary<W: Write>(writer: &mut W, summary: &Summary) -> io::Result<()> {
    if summary.is_empty() {
        return writeln!(writer, "No positions.");
    }

    writeln!(writer, "Positions:       {}", summary.position_count)?;
    writeln!(writer, "Total hours:     {}", summary.total_hours.normalize())?;
    writeln!(writer, "Client charge:   {}", format_currency(summary.total_client_charge))?;
    writeln!(writer, "Cost:            {}", format_currency(summary.total_cost))?;
    writeln!(writer, "Profit:          {}", format_currency(summary.total_profit))?;
    writeln!(writer, "Average margin:  {}", format_percentage(summary.average_margin))?;
    writeln!(
        writer,
        "Mix:             onshore {}, offshore {}, nearshore {}, comparison {}",
        summary.mix.onshore, summary.mix.offshore, summary.mix.nearshore, summary.mix.unassigned
    )?;

    writeln!(writer)?;
    writeln!(
        writer,
        "  {:<14} {:>14} {:>14} {:>8}",
        "Scenario", "Client charge", "Profit", "Margin"
    )?;
    let best = summary.best_scenario().map(|s| s.location);
    for scenario in &summary.scenarios {
        let mark = if best == Some(scenario.location) { "  (best)" } else { "" };
        writeln!(
            writer,
            "  {:<14} {:>14} {:>14} {:>8}{mark}",
            format!("All {}", scenario.location.as_str()),
            format_currency(scenario.total_client_charge),
            format_currency(scenario.total_profit),
            format_percentage(scenario.average_margin),
        )?;
    }
    if let Some(worst) = summary.most_expensive_scenario() {
        writeln!(
            writer,
            "Savings vs most expensive (all {}): {}",
            worst.location.as_str(),
            format_currency(summary.savings_vs_most_expensive()),
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "At each position's best location: charge {}, profit {}",
        format_currency(summary.optimal_client_charge),
        format_currency(summary.optimal_profit),
    )?;
    if summary.is_nearly_optimal() {
        writeln!(writer, "The current selection is at or near optimal.")?;
    } else {
        if summary.foregone_profit > Decimal::ZERO {
            writeln!(
                writer,
                "Best locations would add {} profit.",
                format_currency(summary.foregone_profit)
            )?;
        }
        if summary.client_savings > Decimal::ZERO {
            writeln!(
                writer,
                "Best locations would save the client {}.",
                format_currency(summary.client_savings)
            )?;
        }
    }
    Ok(())
}

fn mode_parameter(mode: PricingMode) -> String {
    match mode {
        PricingMode::Margin(m) => format!("margin {}", format_percentage(m)),
        PricingMode::Rate(r) => format!("rate {}/hr", format_currency(r)),
    }
}

fn format_points(ratio: Decimal) -> String {
    let text = format_percentage(ratio);
    text.trim_end_matches('%').to_string()
}
