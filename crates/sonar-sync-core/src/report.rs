//! JSON reports written after an import
//!
//! Two files per run, sharing a `YYYYmmdd_HHMMSS` stamp:
//! `skipped_rules_<stamp>.json` and `enabled_patterns_<stamp>.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::import::{ImportPlan, PlannedRule, SkippedRule};
use crate::Result;

const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const SUMMARY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Where and for whom the reports are written
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub coding_standard: String,
    pub organization: String,
    pub generated_at: DateTime<Local>,
}

impl ReportContext {
    pub fn now(coding_standard: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            coding_standard: coding_standard.into(),
            organization: organization.into(),
            generated_at: Local::now(),
        }
    }

    fn file_stamp(&self) -> String {
        self.generated_at.format(FILE_STAMP_FORMAT).to_string()
    }

    fn timestamp(&self) -> String {
        self.generated_at.format(SUMMARY_TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSummary {
    pub total_skipped: usize,
    pub coding_standard: String,
    pub organization: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub rule_key: String,
    pub pattern_id: String,
    pub repository_key: String,
    pub priority: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRulesReport {
    pub summary: SkippedSummary,
    pub skipped_rules: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledSummary {
    pub total_enabled: usize,
    pub coding_standard: String,
    pub organization: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledEntry {
    pub rule_key: String,
    pub pattern_id: String,
    pub repository_key: String,
    pub priority: Option<String>,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledPatternsReport {
    pub summary: EnabledSummary,
    pub enabled_patterns: Vec<EnabledEntry>,
}

impl SkippedRulesReport {
    pub fn from_plan(plan: &ImportPlan, ctx: &ReportContext) -> Self {
        let skipped_rules: Vec<SkippedEntry> = plan.skipped.iter().map(SkippedEntry::from).collect();
        Self {
            summary: SkippedSummary {
                total_skipped: skipped_rules.len(),
                coding_standard: ctx.coding_standard.clone(),
                organization: ctx.organization.clone(),
                timestamp: ctx.timestamp(),
            },
            skipped_rules,
        }
    }
}

impl EnabledPatternsReport {
    pub fn from_plan(plan: &ImportPlan, ctx: &ReportContext) -> Self {
        let enabled_patterns: Vec<EnabledEntry> =
            plan.enabled.iter().map(EnabledEntry::from).collect();
        Self {
            summary: EnabledSummary {
                total_enabled: enabled_patterns.len(),
                coding_standard: ctx.coding_standard.clone(),
                organization: ctx.organization.clone(),
                timestamp: ctx.timestamp(),
            },
            enabled_patterns,
        }
    }
}

impl From<&SkippedRule> for SkippedEntry {
    fn from(skipped: &SkippedRule) -> Self {
        Self {
            rule_key: skipped.rule.key.clone(),
            pattern_id: skipped.pattern_id.clone(),
            repository_key: skipped.rule.repository_key.clone(),
            priority: skipped.rule.priority.clone(),
            reason: skipped.reason.to_string(),
        }
    }
}

impl From<&PlannedRule> for EnabledEntry {
    fn from(planned: &PlannedRule) -> Self {
        Self {
            rule_key: planned.rule.key.clone(),
            pattern_id: planned.pattern_id.clone(),
            repository_key: planned.rule.repository_key.clone(),
            priority: planned.rule.priority.clone(),
            parameters: planned.rule.parameters.clone(),
        }
    }
}

/// Paths of the files written by [`write_import_reports`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub skipped: PathBuf,
    pub enabled: PathBuf,
}

/// Write both reports into `dir`, creating it if needed
pub fn write_import_reports(dir: &Path, plan: &ImportPlan, ctx: &ReportContext) -> Result<ReportPaths> {
    fs::create_dir_all(dir)?;
    let stamp = ctx.file_stamp();

    let skipped = dir.join(format!("skipped_rules_{}.json", stamp));
    write_json(&skipped, &SkippedRulesReport::from_plan(plan, ctx))?;

    let enabled = dir.join(format!("enabled_patterns_{}.json", stamp));
    write_json(&enabled, &EnabledPatternsReport::from_plan(plan, ctx))?;

    tracing::debug!(skipped = %skipped.display(), enabled = %enabled.display(), "Wrote import reports");
    Ok(ReportPaths { skipped, enabled })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}
