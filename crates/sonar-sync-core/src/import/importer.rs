//! Coding-standard creation and configuration

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::plan::ImportPlan;
use crate::api::{
    CodacyApi, NewCodingStandard, PatternSetting, StandardId, ToolUpdate, fetch_pattern_ids,
};
use crate::config::StandardSettings;
use crate::Result;

/// Result of configuring one tool in the new standard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutcome {
    pub tool_name: String,
    pub tool_uuid: String,
    /// Patterns sent as enabled
    pub enabled: usize,
    /// Catalog patterns sent as explicitly disabled
    pub disabled: usize,
}

/// What an import run did on the remote side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub standard_id: StandardId,
    /// Name the standard was created with
    pub standard_name: String,
    /// Requested name, when it had to be made unique
    pub requested_name: Option<String>,
    /// Tools switched off before enabling the selection
    pub tools_disabled: usize,
    /// Tool UUIDs that could not be switched off
    pub disable_failures: Vec<String>,
    pub tools: Vec<ToolOutcome>,
    /// Tool names from the plan absent from the Codacy catalog
    pub unknown_tools: Vec<String>,
}

impl ImportOutcome {
    pub fn enabled_patterns(&self) -> usize {
        self.tools.iter().map(|t| t.enabled).sum()
    }
}

/// First free name among `base`, `base (1)`, `base (2)`, ...
pub fn unique_standard_name(base: &str, existing: &BTreeSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{} ({})", base, n))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Outcome of switching off every tool of a standard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisabledTools {
    pub disabled: usize,
    /// Tool UUIDs whose update was rejected
    pub failures: Vec<String>,
}

/// Switch off every tool of a standard, leaving pattern settings alone
///
/// A rejected update is logged and recorded; only listing the tools is fatal.
pub fn disable_standard_tools(api: &dyn CodacyApi, standard_id: StandardId) -> Result<DisabledTools> {
    let tools = api.list_coding_standard_tools(standard_id)?;
    let mut outcome = DisabledTools::default();

    for tool in tools.iter().filter(|t| !t.uuid.is_empty()) {
        match api.update_coding_standard_tool(standard_id, &tool.uuid, &ToolUpdate::disable_tool()) {
            Ok(()) => outcome.disabled += 1,
            Err(e) => {
                tracing::warn!(tool_uuid = %tool.uuid, error = %e, "Could not disable tool");
                outcome.failures.push(tool.uuid.clone());
            }
        }
    }

    tracing::info!(disabled = outcome.disabled, "Disabled coding standard tools");
    Ok(outcome)
}

/// Creates a coding standard that enables exactly the planned patterns
///
/// The sequence is fixed: resolve tool UUIDs, create the standard under a
/// unique name, switch every tool off, enable the planned patterns per tool
/// (all other catalog patterns explicitly disabled), promote the draft.
pub struct Importer<'a> {
    api: &'a dyn CodacyApi,
    standard: &'a StandardSettings,
}

impl<'a> Importer<'a> {
    pub fn new(api: &'a dyn CodacyApi, standard: &'a StandardSettings) -> Self {
        Self { api, standard }
    }

    pub fn run(&self, plan: &ImportPlan) -> Result<ImportOutcome> {
        let tool_uuids = self.tool_uuids()?;

        let name = self.choose_name();
        let requested_name = (name != self.standard.name).then(|| self.standard.name.clone());
        let standard_id = self.create_standard(&name)?;

        let DisabledTools {
            disabled: tools_disabled,
            failures: disable_failures,
        } = disable_standard_tools(self.api, standard_id)?;

        let mut tools = Vec::new();
        let mut unknown_tools = Vec::new();
        for (tool_name, patterns) in plan.patterns_by_tool() {
            let Some(tool_uuid) = tool_uuids.get(&tool_name.to_lowercase()) else {
                tracing::warn!(tool = tool_name, "Could not find Codacy tool");
                unknown_tools.push(tool_name.to_string());
                continue;
            };
            tools.push(self.enable_tool_patterns(standard_id, tool_name, tool_uuid, patterns)?);
        }

        tracing::info!(standard_id, "Promoting coding standard");
        self.api.promote_coding_standard(standard_id)?;

        Ok(ImportOutcome {
            standard_id,
            standard_name: name,
            requested_name,
            tools_disabled,
            disable_failures,
            tools,
            unknown_tools,
        })
    }

    /// Lowercased tool name -> UUID
    fn tool_uuids(&self) -> Result<BTreeMap<String, String>> {
        let tools = self.api.list_tools()?;
        tracing::info!(count = tools.len(), "Retrieved available tools");
        Ok(tools
            .into_iter()
            .filter(|t| !t.uuid.is_empty())
            .map(|t| (t.name.to_lowercase(), t.uuid))
            .collect())
    }

    fn choose_name(&self) -> String {
        match self.api.list_coding_standards() {
            Ok(standards) => {
                let existing: BTreeSet<String> = standards.into_iter().map(|s| s.name).collect();
                let name = unique_standard_name(&self.standard.name, &existing);
                if name != self.standard.name {
                    tracing::info!(requested = %self.standard.name, chosen = %name, "Standard name already exists");
                }
                name
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not check existing standard names");
                self.standard.name.clone()
            }
        }
    }

    fn create_standard(&self, name: &str) -> Result<StandardId> {
        let request = NewCodingStandard {
            name: name.to_string(),
            languages: self.standard.languages.clone(),
        };
        let created = self.api.create_coding_standard(&request)?;
        tracing::info!(standard_id = created.id, name, "Created coding standard");
        Ok(created.id)
    }

    fn enable_tool_patterns(
        &self,
        standard_id: StandardId,
        tool_name: &str,
        tool_uuid: &str,
        selected: Vec<PatternSetting>,
    ) -> Result<ToolOutcome> {
        let catalog = fetch_pattern_ids(self.api, tool_uuid)?;
        let selected_ids: BTreeSet<&str> = selected.iter().map(|p| p.id.as_str()).collect();
        let others: Vec<PatternSetting> = catalog
            .iter()
            .filter(|id| !selected_ids.contains(id.as_str()))
            .map(PatternSetting::disabled)
            .collect();

        let enabled = selected.len();
        let disabled = others.len();
        tracing::info!(tool = tool_name, enabled, disabled, "Enabling tool patterns");

        let mut patterns = selected;
        patterns.extend(others);
        let update = ToolUpdate {
            enabled: true,
            patterns,
        };
        self.api
            .update_coding_standard_tool(standard_id, tool_uuid, &update)?;

        Ok(ToolOutcome {
            tool_name: tool_name.to_string(),
            tool_uuid: tool_uuid.to_string(),
            enabled,
            disabled,
        })
    }
}
