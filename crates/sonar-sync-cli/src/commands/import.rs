//! Import command: create a coding standard enabling exactly the XML rules

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use sonar_sync_core::config::Settings;
use sonar_sync_core::import::{ImportOutcome, ImportPlan, Importer};
use sonar_sync_core::report::{ReportContext, ReportPaths, write_import_reports};
use sonar_sync_core::rules::RuleSet;
use sonar_sync_core::{CodacyApi, PatternPrefix, fetch_pattern_ids};

use super::print_json;
use crate::context::CommandContext;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Overrides the configured standard name
    pub standard_name: Option<String>,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub total_rules: usize,
    pub imported: usize,
    pub skipped: usize,
    pub unmapped: usize,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ImportOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<ReportPaths>,
}

/// Match the export against the SonarC# catalog
pub fn plan_import(api: &dyn CodacyApi, settings: &Settings, rules: &RuleSet) -> Result<ImportPlan> {
    let available = fetch_pattern_ids(api, &settings.sonar.tool_uuid)?;
    let prefix = PatternPrefix::new(settings.sonar.pattern_prefix.clone());
    Ok(ImportPlan::build(
        rules,
        &available,
        &settings.sonar.repositories,
        &prefix,
    ))
}

/// Plan, then (unless dry-running) import and write the reports
///
/// `output_dir` must already be absolute or relative to the process
/// working directory.
pub fn import(
    api: &dyn CodacyApi,
    settings: &Settings,
    organization: &str,
    rules: &RuleSet,
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let mut plan = plan_import(api, settings, rules)?;
    let mut summary = ImportSummary {
        total_rules: rules.len(),
        imported: plan.enabled.len(),
        skipped: plan.skipped.len(),
        unmapped: plan.unmapped().count(),
        dry_run: options.dry_run,
        outcome: None,
        reports: None,
    };

    if options.dry_run {
        tracing::info!(imported = summary.imported, "Dry run, no standard created");
        return Ok(summary);
    }

    let mut standard = settings.standard.clone();
    if let Some(name) = &options.standard_name {
        standard.name = name.clone();
    }

    let outcome = Importer::new(api, &standard).run(&plan)?;
    if plan.skip_tools(&outcome.unknown_tools) > 0 {
        summary.imported = plan.enabled.len();
        summary.skipped = plan.skipped.len();
    }
    let report_ctx = ReportContext::now(outcome.standard_name.clone(), organization);
    summary.reports = Some(write_import_reports(&options.output_dir, &plan, &report_ctx)?);
    summary.outcome = Some(outcome);
    Ok(summary)
}

/// Run the import command
pub fn run_import(ctx: &CommandContext, options: &ImportOptions) -> Result<()> {
    let organization = ctx.organization()?;
    let rules = ctx.load_rules()?;
    let client = ctx.client()?;

    if !options.json {
        println!(
            "{} Importing {} XML rules into {}...",
            "=>".blue().bold(),
            rules.len(),
            organization.cyan()
        );
    }

    let options = ImportOptions {
        output_dir: ctx.resolve_path(&options.output_dir),
        ..options.clone()
    };
    let summary = import(&client, ctx.settings(), organization, &rules, &options)?;

    if options.json {
        return print_json(&summary);
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    if let Some(outcome) = &summary.outcome {
        println!();
        println!(
            "{} Created coding standard {} (id {})",
            "OK".green().bold(),
            outcome.standard_name.cyan(),
            outcome.standard_id
        );
        if let Some(requested) = &outcome.requested_name {
            println!("   {} was taken, used a unique name instead", requested);
        }
        for tool in &outcome.tools {
            println!(
                "   {}: {} enabled, {} disabled",
                tool.tool_name, tool.enabled, tool.disabled
            );
        }
        for tool in &outcome.unknown_tools {
            println!("   {} Tool {} not found in Codacy", "WARN".yellow().bold(), tool);
        }
        for uuid in &outcome.disable_failures {
            println!("   {} Could not disable tool {}", "WARN".yellow().bold(), uuid);
        }
    } else if summary.dry_run {
        println!();
        println!("{} Dry run: nothing was changed in Codacy.", "=>".blue().bold());
    }

    println!();
    println!("{}", "Summary".bold());
    println!("   Total XML rules:     {}", summary.total_rules);
    println!("   Imported:            {}", summary.imported);
    println!("   Skipped:             {}", summary.skipped);
    if summary.unmapped > 0 {
        println!("   Unknown repository:  {}", summary.unmapped);
    }

    if let Some(reports) = &summary.reports {
        println!();
        println!("   Skipped rules:       {}", reports.skipped.display());
        println!("   Enabled patterns:    {}", reports.enabled.display());
    }
}
