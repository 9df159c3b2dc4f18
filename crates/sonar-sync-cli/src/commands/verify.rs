//! Verify command: XML rules vs the patterns enabled in a coding standard

use colored::Colorize;
use serde::Serialize;

use sonar_sync_core::rules::RuleSet;
use sonar_sync_core::{
    CodacyApi, PatternPrefix, Reconciliation, StandardId, fetch_enabled_rule_keys,
};

use super::{print_json, print_keys, print_summary};
use crate::context::CommandContext;
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub standard_id: StandardId,
    #[serde(flatten)]
    pub reconciliation: Reconciliation,
    /// Percentage of XML rules enabled; absent for an empty export
    pub success_rate: Option<f64>,
}

pub fn verify(
    api: &dyn CodacyApi,
    standard_id: StandardId,
    tool_uuid: &str,
    prefix: &PatternPrefix,
    rules: &RuleSet,
) -> Result<VerifyReport> {
    let enabled = fetch_enabled_rule_keys(api, standard_id, tool_uuid, prefix)?;
    let reconciliation = Reconciliation::compute(&rules.keys(), &enabled);
    Ok(VerifyReport {
        standard_id,
        success_rate: reconciliation.success_rate(),
        reconciliation,
    })
}

/// Run the verify command
pub fn run_verify(ctx: &CommandContext, standard_id: StandardId, json: bool) -> Result<()> {
    let rules = ctx.load_rules()?;
    let client = ctx.client()?;

    if !json {
        println!(
            "{} Verifying coding standard {}...",
            "=>".blue().bold(),
            standard_id.to_string().cyan()
        );
    }

    let report = verify(
        &client,
        standard_id,
        &ctx.settings().sonar.tool_uuid,
        &ctx.prefix(),
        &rules,
    )?;

    if json {
        return print_json(&report);
    }

    let result = &report.reconciliation;
    print_keys("Not enabled in the standard", &"-".yellow().to_string(), &result.missing_remote);
    print_keys("Enabled but not in the XML", &"+".red().to_string(), &result.extra_remote);
    print_summary(result, "Enabled in standard");
    println!("   Success rate:        {}", format_rate(report.success_rate));

    println!();
    if result.is_in_sync() {
        println!(
            "{} The standard enables exactly the XML rules.",
            "OK".green().bold()
        );
    } else {
        println!(
            "{} The standard differs from the XML rules.",
            "WARN".yellow().bold()
        );
    }

    Ok(())
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", rate),
        None => "n/a (no rules in XML)".to_string(),
    }
}
