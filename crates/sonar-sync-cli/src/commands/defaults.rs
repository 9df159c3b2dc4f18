//! Defaults command: which exported rules Codacy cannot enable, and how many
//! catalog patterns lie outside the export

use colored::Colorize;
use serde::Serialize;

use sonar_sync_core::{Reconciliation, preview};

use super::check::check;
use super::print_json;
use crate::context::CommandContext;
use crate::error::Result;

/// Number of missing rules listed before the rest is summarized
const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct DefaultsReport {
    #[serde(flatten)]
    pub reconciliation: Reconciliation,
    /// Catalog patterns not in the export; a fresh standard may enable them
    pub possibly_enabled_by_default: usize,
}

impl From<Reconciliation> for DefaultsReport {
    fn from(reconciliation: Reconciliation) -> Self {
        Self {
            possibly_enabled_by_default: reconciliation.extra_remote.len(),
            reconciliation,
        }
    }
}

/// Run the defaults command
pub fn run_defaults(ctx: &CommandContext, json: bool) -> Result<()> {
    let rules = ctx.load_rules()?;
    let client = ctx.client()?;

    if !json {
        println!("{} Analyzing default pattern coverage...", "=>".blue().bold());
    }

    let report = DefaultsReport::from(check(
        &client,
        &ctx.settings().sonar.tool_uuid,
        &ctx.prefix(),
        &rules,
    )?);

    if json {
        return print_json(&report);
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &DefaultsReport) {
    let result = &report.reconciliation;

    println!();
    println!("   Rules in XML:        {}", result.xml_total);
    println!("   Patterns in Codacy:  {}", result.remote_total);
    println!("   Matching:            {}", result.matching.len());

    if !result.missing_remote.is_empty() {
        println!();
        println!(
            "{} {} XML rules are not available in Codacy:",
            "WARN".yellow().bold(),
            result.missing_remote.len()
        );
        for line in preview_lines(&report.reconciliation) {
            println!("   {}", line);
        }
    }

    println!();
    println!(
        "{} {} Codacy patterns are not in the XML and may be enabled by default.",
        "=>".blue().bold(),
        report.possibly_enabled_by_default
    );
}

/// First missing keys, then `... and N more`
fn preview_lines(result: &Reconciliation) -> Vec<String> {
    let (shown, hidden) = preview(&result.missing_remote, PREVIEW_LIMIT);
    let mut lines: Vec<String> = shown.iter().map(|key| format!("- {}", key)).collect();
    if hidden > 0 {
        lines.push(format!("... and {} more", hidden));
    }
    lines
}
