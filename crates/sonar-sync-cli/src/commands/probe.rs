//! Probe-defaults command: what a brand-new coding standard enables
//!
//! Creates a standard, reads its enabled tool and pattern counts, switches
//! every tool off and reads the counts again. The standard stays a draft.

use colored::Colorize;
use serde::Serialize;

use sonar_sync_core::api::{CodingStandardMeta, NewCodingStandard};
use sonar_sync_core::config::StandardSettings;
use sonar_sync_core::import::disable_standard_tools;
use sonar_sync_core::{CodacyApi, StandardId};

use super::print_json;
use crate::context::CommandContext;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub standard_id: StandardId,
    pub standard_name: String,
    pub initial: CodingStandardMeta,
    pub tools_disabled: usize,
    pub disable_failures: Vec<String>,
    pub after_disable: CodingStandardMeta,
}

pub fn probe(api: &dyn CodacyApi, standard: &StandardSettings, name: &str) -> Result<ProbeReport> {
    let created = api.create_coding_standard(&NewCodingStandard {
        name: name.to_string(),
        languages: standard.languages.clone(),
    })?;
    tracing::info!(standard_id = created.id, name, "Created probe standard");

    let initial = standard_meta(api, created.id)?;
    let disabled = disable_standard_tools(api, created.id)?;
    let after_disable = standard_meta(api, created.id)?;

    Ok(ProbeReport {
        standard_id: created.id,
        standard_name: name.to_string(),
        initial,
        tools_disabled: disabled.disabled,
        disable_failures: disabled.failures,
        after_disable,
    })
}

/// Current counters of a standard, read from the organization listing
fn standard_meta(api: &dyn CodacyApi, standard_id: StandardId) -> Result<CodingStandardMeta> {
    api.list_coding_standards()?
        .into_iter()
        .find(|s| s.id == standard_id)
        .map(|s| s.meta)
        .ok_or_else(|| {
            CliError::user(format!(
                "Coding standard {} not found after creation",
                standard_id
            ))
        })
}

/// Run the probe-defaults command
pub fn run_probe(ctx: &CommandContext, name: &str, json: bool) -> Result<()> {
    ctx.organization()?;
    let client = ctx.client()?;

    if !json {
        println!(
            "{} Creating coding standard {}...",
            "=>".blue().bold(),
            name.cyan()
        );
    }

    let report = probe(&client, &ctx.settings().standard, name)?;

    if json {
        return print_json(&report);
    }

    println!(
        "{} Created coding standard with id {}",
        "OK".green().bold(),
        report.standard_id
    );
    print_meta("Initially", &report.initial);
    println!(
        "{} Disabled {} tools",
        "=>".blue().bold(),
        report.tools_disabled
    );
    for uuid in &report.disable_failures {
        println!("   {} Could not disable tool {}", "WARN".yellow().bold(), uuid);
    }
    print_meta("After disabling", &report.after_disable);

    Ok(())
}

fn print_meta(label: &str, meta: &CodingStandardMeta) {
    println!(
        "   {}: {} enabled tools, {} enabled patterns",
        label, meta.enabled_tools_count, meta.enabled_patterns_count
    );
}
