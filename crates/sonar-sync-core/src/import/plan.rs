//! Import planning: which exported rules become which Codacy patterns

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::{PatternParameter, PatternPrefix, PatternSetting};
use crate::rules::{RuleSet, SonarRule};

/// Why an exported rule is not imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The rule's repository key has no Codacy tool mapping
    UnknownRepository,
    /// The tool catalog has no pattern for the rule
    PatternUnavailable,
    /// An earlier entry of the export already enables the pattern
    Duplicate,
    /// The mapped tool is missing from the Codacy tool list
    ToolNotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRepository => write!(f, "Unknown repository key"),
            Self::PatternUnavailable => write!(f, "Pattern not available in Codacy"),
            Self::Duplicate => write!(f, "Duplicate rule key"),
            Self::ToolNotFound => write!(f, "Tool not found in Codacy"),
        }
    }
}

/// A rule that will be enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRule {
    pub rule: SonarRule,
    pub pattern_id: String,
    pub tool_name: String,
}

/// A rule that will not be enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub rule: SonarRule,
    pub pattern_id: String,
    pub reason: SkipReason,
}

/// Patterns to enable, grouped per Codacy tool name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub enabled: Vec<PlannedRule>,
    pub skipped: Vec<SkippedRule>,
}

impl ImportPlan {
    /// Match every exported rule against the tool mapping and the catalog
    ///
    /// `available` holds full pattern ids (prefix included). A rule key
    /// listed twice in the export is planned once; later entries are
    /// skipped as duplicates, so every exported rule lands in exactly one
    /// of `enabled` and `skipped`.
    pub fn build(
        rules: &RuleSet,
        available: &BTreeSet<String>,
        repositories: &BTreeMap<String, String>,
        prefix: &PatternPrefix,
    ) -> Self {
        let mut plan = Self::default();
        let mut planned = BTreeSet::new();

        for rule in rules {
            let pattern_id = prefix.apply(&rule.key);

            let Some(tool_name) = repositories.get(&rule.repository_key) else {
                tracing::warn!(
                    repository = %rule.repository_key,
                    rule = %rule.key,
                    "Unknown repository key"
                );
                plan.skipped.push(SkippedRule {
                    rule: rule.clone(),
                    pattern_id,
                    reason: SkipReason::UnknownRepository,
                });
                continue;
            };

            if !available.contains(&pattern_id) {
                plan.skipped.push(SkippedRule {
                    rule: rule.clone(),
                    pattern_id,
                    reason: SkipReason::PatternUnavailable,
                });
                continue;
            }

            if !planned.insert(pattern_id.clone()) {
                tracing::debug!(rule = %rule.key, "Rule listed twice in export, keeping first");
                plan.skipped.push(SkippedRule {
                    rule: rule.clone(),
                    pattern_id,
                    reason: SkipReason::Duplicate,
                });
                continue;
            }

            plan.enabled.push(PlannedRule {
                rule: rule.clone(),
                pattern_id,
                tool_name: tool_name.clone(),
            });
        }

        plan
    }

    /// Move the rules of `tool_names` from `enabled` to `skipped`
    ///
    /// Called after an import with the tools Codacy did not list, since no
    /// pattern of theirs was sent. Returns how many rules moved.
    pub fn skip_tools(&mut self, tool_names: &[String]) -> usize {
        if tool_names.is_empty() {
            return 0;
        }
        let (missing, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.enabled)
            .into_iter()
            .partition(|planned| tool_names.contains(&planned.tool_name));
        self.enabled = kept;

        let moved = missing.len();
        self.skipped.extend(missing.into_iter().map(|planned| SkippedRule {
            rule: planned.rule,
            pattern_id: planned.pattern_id,
            reason: SkipReason::ToolNotFound,
        }));
        moved
    }

    /// Tool name -> pattern settings, in export order
    pub fn patterns_by_tool(&self) -> BTreeMap<&str, Vec<PatternSetting>> {
        let mut grouped: BTreeMap<&str, Vec<PatternSetting>> = BTreeMap::new();
        for planned in &self.enabled {
            grouped
                .entry(planned.tool_name.as_str())
                .or_default()
                .push(pattern_setting(planned));
        }
        grouped
    }

    /// Rules skipped because their pattern is missing from the catalog
    pub fn unavailable(&self) -> impl Iterator<Item = &SkippedRule> {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::PatternUnavailable)
    }

    /// Rules skipped because their repository has no tool mapping
    pub fn unmapped(&self) -> impl Iterator<Item = &SkippedRule> {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::UnknownRepository)
    }
}

fn pattern_setting(planned: &PlannedRule) -> PatternSetting {
    PatternSetting {
        id: planned.pattern_id.clone(),
        enabled: true,
        parameters: planned
            .rule
            .parameters
            .iter()
            .map(|(name, value)| PatternParameter {
                name: name.clone(),
                value: value.clone(),
            })
            .collect(),
    }
}
