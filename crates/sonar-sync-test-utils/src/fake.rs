//! In-memory Codacy organization.
//!
//! [`FakeCodacy`] keeps a tool catalog, coding standards and their tool
//! configurations, applies updates the way the real API does, and records
//! every call so tests can assert on the request sequence.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use sonar_sync_core::api::{
    CodacyApi, CodingStandard, CodingStandardMeta, CodingStandardTool, NewCodingStandard, Pattern,
    PatternState, StandardId, Tool, ToolUpdate,
};
use sonar_sync_core::config::{DEFAULT_PATTERN_PREFIX, SONAR_CSHARP_TOOL_NAME, SONAR_CSHARP_TOOL_UUID};
use sonar_sync_core::{Error, Result};

/// First id handed out by `create_coding_standard`.
pub const FIRST_STANDARD_ID: StandardId = 1000;

/// Kind of API operation, used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    ListTools,
    ListToolPatterns,
    ListCodingStandards,
    CreateCodingStandard,
    ListCodingStandardTools,
    GetCodingStandardTool,
    UpdateCodingStandardTool,
    PromoteCodingStandard,
}

/// One recorded call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListTools,
    ListToolPatterns(String),
    ListCodingStandards,
    CreateCodingStandard(NewCodingStandard),
    ListCodingStandardTools(StandardId),
    GetCodingStandardTool(StandardId, String),
    UpdateCodingStandardTool(StandardId, String, ToolUpdate),
    PromoteCodingStandard(StandardId),
}

impl ApiCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListTools => Operation::ListTools,
            Self::ListToolPatterns(_) => Operation::ListToolPatterns,
            Self::ListCodingStandards => Operation::ListCodingStandards,
            Self::CreateCodingStandard(_) => Operation::CreateCodingStandard,
            Self::ListCodingStandardTools(_) => Operation::ListCodingStandardTools,
            Self::GetCodingStandardTool(..) => Operation::GetCodingStandardTool,
            Self::UpdateCodingStandardTool(..) => Operation::UpdateCodingStandardTool,
            Self::PromoteCodingStandard(_) => Operation::PromoteCodingStandard,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    tools: Vec<Tool>,
    catalog: BTreeMap<String, Vec<Pattern>>,
    standards: Vec<CodingStandard>,
    standard_tools: BTreeMap<StandardId, BTreeMap<String, CodingStandardTool>>,
    next_id: StandardId,
    calls: Vec<ApiCall>,
    failing: BTreeSet<Operation>,
    failing_disables: BTreeSet<String>,
}

/// In-memory [`CodacyApi`].
///
/// # Example
///
/// ```rust,no_run
/// use sonar_sync_test_utils::FakeCodacy;
///
/// let api = FakeCodacy::sonar_csharp(&["S107", "S1144"]);
/// assert_eq!(api.calls().len(), 0);
/// ```
#[derive(Debug)]
pub struct FakeCodacy {
    state: RefCell<State>,
}

impl Default for FakeCodacy {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCodacy {
    /// An organization with no tools and no standards.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                next_id: FIRST_STANDARD_ID,
                ..State::default()
            }),
        }
    }

    /// The SonarC# tool with the given rule keys in its catalog.
    pub fn sonar_csharp(rule_keys: &[&str]) -> Self {
        let ids: Vec<String> = rule_keys
            .iter()
            .map(|key| format!("{DEFAULT_PATTERN_PREFIX}{key}"))
            .collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        Self::new()
            .with_tool(SONAR_CSHARP_TOOL_NAME, SONAR_CSHARP_TOOL_UUID)
            .with_patterns(SONAR_CSHARP_TOOL_UUID, &ids)
    }

    pub fn with_tool(self, name: &str, uuid: &str) -> Self {
        self.state.borrow_mut().tools.push(Tool {
            uuid: uuid.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Add pattern ids (full ids, prefix included) to a tool's catalog.
    pub fn with_patterns(self, tool_uuid: &str, ids: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .catalog
            .entry(tool_uuid.to_string())
            .or_default()
            .extend(ids.iter().map(|id| pattern(id)));
        self
    }

    pub fn with_standard(self, id: StandardId, name: &str) -> Self {
        self.state.borrow_mut().standards.push(standard(id, name));
        self
    }

    /// Configure a tool of an existing standard with the given enabled and
    /// disabled pattern ids.
    pub fn with_standard_tool(
        self,
        standard_id: StandardId,
        tool_uuid: &str,
        enabled: &[&str],
        disabled: &[&str],
    ) -> Self {
        let patterns = enabled
            .iter()
            .map(|id| (id, true))
            .chain(disabled.iter().map(|id| (id, false)))
            .map(|(id, enabled)| PatternState {
                id: id.to_string(),
                enabled,
            })
            .collect();
        self.state
            .borrow_mut()
            .standard_tools
            .entry(standard_id)
            .or_default()
            .insert(
                tool_uuid.to_string(),
                CodingStandardTool {
                    uuid: tool_uuid.to_string(),
                    is_enabled: Some(true),
                    patterns,
                },
            );
        self
    }

    /// Make every call of `operation` fail with HTTP 500.
    pub fn fail_on(self, operation: Operation) -> Self {
        self.state.borrow_mut().failing.insert(operation);
        self
    }

    /// Make only the tool-disabling update of `tool_uuid` fail.
    pub fn fail_disable(self, tool_uuid: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_disables
            .insert(tool_uuid.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.borrow().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(ApiCall::operation)
            .collect()
    }

    pub fn standard(&self, id: StandardId) -> Option<CodingStandard> {
        self.state
            .borrow()
            .standards
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Last update sent for a tool of a standard.
    pub fn last_update(&self, standard_id: StandardId, tool_uuid: &str) -> Option<ToolUpdate> {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                ApiCall::UpdateCodingStandardTool(id, uuid, update)
                    if *id == standard_id && uuid == tool_uuid =>
                {
                    Some(update.clone())
                }
                _ => None,
            })
    }

    /// Whether a tool is switched on in a standard.
    pub fn tool_enabled(&self, standard_id: StandardId, tool_uuid: &str) -> Option<bool> {
        self.state
            .borrow()
            .standard_tools
            .get(&standard_id)
            .and_then(|tools| tools.get(tool_uuid))
            .and_then(|tool| tool.is_enabled)
    }

    /// Pattern ids currently enabled for a tool of a standard.
    pub fn enabled_patterns(&self, standard_id: StandardId, tool_uuid: &str) -> BTreeSet<String> {
        self.state
            .borrow()
            .standard_tools
            .get(&standard_id)
            .and_then(|tools| tools.get(tool_uuid))
            .map(|tool| tool.enabled_pattern_ids().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: ApiCall) -> Result<()> {
        let operation = call.operation();
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(injected(operation));
        }
        Ok(())
    }
}

impl CodacyApi for FakeCodacy {
    fn list_tools(&self) -> Result<Vec<Tool>> {
        self.record(ApiCall::ListTools)?;
        Ok(self.state.borrow().tools.clone())
    }

    fn list_tool_patterns(&self, tool_uuid: &str) -> Result<Vec<Pattern>> {
        self.record(ApiCall::ListToolPatterns(tool_uuid.to_string()))?;
        self.state
            .borrow()
            .catalog
            .get(tool_uuid)
            .cloned()
            .ok_or_else(|| not_found(&format!("tools/{tool_uuid}/patterns")))
    }

    fn list_coding_standards(&self) -> Result<Vec<CodingStandard>> {
        self.record(ApiCall::ListCodingStandards)?;
        let state = self.state.borrow();
        Ok(state
            .standards
            .iter()
            .map(|standard| {
                let mut listed = standard.clone();
                if let Some(tools) = state.standard_tools.get(&standard.id) {
                    listed.meta = meta(tools.values());
                }
                listed
            })
            .collect())
    }

    fn create_coding_standard(&self, request: &NewCodingStandard) -> Result<CodingStandard> {
        self.record(ApiCall::CreateCodingStandard(request.clone()))?;
        let mut state = self.state.borrow_mut();

        let id = state.next_id;
        state.next_id += 1;

        let mut created = standard(id, &request.name);
        created.languages = request.languages.clone();

        // New standards start with every catalog tool on and all patterns enabled
        let tools = state
            .tools
            .iter()
            .map(|tool| {
                let patterns = state
                    .catalog
                    .get(&tool.uuid)
                    .map(|catalog| {
                        catalog
                            .iter()
                            .map(|p| PatternState {
                                id: p.id.clone(),
                                enabled: true,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let configured = CodingStandardTool {
                    uuid: tool.uuid.clone(),
                    is_enabled: Some(true),
                    patterns,
                };
                (tool.uuid.clone(), configured)
            })
            .collect();
        state.standard_tools.insert(id, tools);
        state.standards.push(created.clone());
        Ok(created)
    }

    fn list_coding_standard_tools(&self, standard_id: StandardId) -> Result<Vec<CodingStandardTool>> {
        self.record(ApiCall::ListCodingStandardTools(standard_id))?;
        self.state
            .borrow()
            .standard_tools
            .get(&standard_id)
            .map(|tools| tools.values().cloned().collect())
            .ok_or_else(|| not_found(&format!("coding-standards/{standard_id}/tools")))
    }

    fn get_coding_standard_tool(
        &self,
        standard_id: StandardId,
        tool_uuid: &str,
    ) -> Result<CodingStandardTool> {
        self.record(ApiCall::GetCodingStandardTool(
            standard_id,
            tool_uuid.to_string(),
        ))?;
        self.state
            .borrow()
            .standard_tools
            .get(&standard_id)
            .and_then(|tools| tools.get(tool_uuid))
            .cloned()
            .ok_or_else(|| not_found(&format!("coding-standards/{standard_id}/tools/{tool_uuid}")))
    }

    fn update_coding_standard_tool(
        &self,
        standard_id: StandardId,
        tool_uuid: &str,
        update: &ToolUpdate,
    ) -> Result<()> {
        self.record(ApiCall::UpdateCodingStandardTool(
            standard_id,
            tool_uuid.to_string(),
            update.clone(),
        ))?;
        let mut state = self.state.borrow_mut();
        if !update.enabled && state.failing_disables.contains(tool_uuid) {
            return Err(injected(Operation::UpdateCodingStandardTool));
        }

        let tool = state
            .standard_tools
            .get_mut(&standard_id)
            .and_then(|tools| tools.get_mut(tool_uuid))
            .ok_or_else(|| not_found(&format!("coding-standards/{standard_id}/tools/{tool_uuid}")))?;

        tool.is_enabled = Some(update.enabled);
        for setting in &update.patterns {
            match tool.patterns.iter_mut().find(|p| p.id == setting.id) {
                Some(existing) => existing.enabled = setting.enabled,
                None => tool.patterns.push(PatternState {
                    id: setting.id.clone(),
                    enabled: setting.enabled,
                }),
            }
        }
        Ok(())
    }

    fn promote_coding_standard(&self, standard_id: StandardId) -> Result<()> {
        self.record(ApiCall::PromoteCodingStandard(standard_id))?;
        let mut state = self.state.borrow_mut();
        let standard = state
            .standards
            .iter_mut()
            .find(|s| s.id == standard_id)
            .ok_or_else(|| not_found(&format!("coding-standards/{standard_id}/promote")))?;
        standard.is_draft = Some(false);
        Ok(())
    }
}

fn pattern(id: &str) -> Pattern {
    Pattern {
        id: id.to_string(),
        title: None,
        category: None,
        severity_level: None,
        enabled: None,
    }
}

fn standard(id: StandardId, name: &str) -> CodingStandard {
    CodingStandard {
        id,
        name: name.to_string(),
        is_draft: Some(true),
        languages: Vec::new(),
        meta: CodingStandardMeta::default(),
    }
}

/// Counts derived the way Codacy reports them: enabled tools and the
/// enabled patterns of those tools.
fn meta<'a>(tools: impl Iterator<Item = &'a CodingStandardTool>) -> CodingStandardMeta {
    let mut meta = CodingStandardMeta::default();
    for tool in tools.filter(|t| t.is_enabled == Some(true)) {
        meta.enabled_tools_count += 1;
        meta.enabled_patterns_count += tool.enabled_pattern_ids().count() as u32;
    }
    meta
}

fn injected(operation: Operation) -> Error {
    Error::Api {
        status: 500,
        url: format!("fake://{operation:?}"),
        body: "injected failure".to_string(),
    }
}

fn not_found(path: &str) -> Error {
    Error::Api {
        status: 404,
        url: format!("fake://{path}"),
        body: r#"{"error":"Not found"}"#.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_standard_enables_catalog() {
        let api = FakeCodacy::sonar_csharp(&["S1", "S2"]);
        let created = api
            .create_coding_standard(&NewCodingStandard {
                name: "X".to_string(),
                languages: vec!["CSharp".to_string()],
            })
            .unwrap();

        assert_eq!(created.id, FIRST_STANDARD_ID);
        assert_eq!(api.enabled_patterns(created.id, SONAR_CSHARP_TOOL_UUID).len(), 2);

        let listed = api.list_coding_standards().unwrap();
        assert_eq!(listed[0].meta.enabled_tools_count, 1);
        assert_eq!(listed[0].meta.enabled_patterns_count, 2);
    }

    #[test]
    fn test_fail_on_records_then_fails() {
        let api = FakeCodacy::new().fail_on(Operation::ListTools);
        assert!(api.list_tools().is_err());
        assert_eq!(api.operations(), vec![Operation::ListTools]);
    }
}
