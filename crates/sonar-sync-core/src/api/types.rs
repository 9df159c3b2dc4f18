//! Wire types of the Codacy v3 API

use serde::{Deserialize, Serialize};

/// Numeric identifier of a coding standard
pub type StandardId = u64;

/// `{ "data": [...], "pagination": { "cursor": ... } }`
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    pub fn next_cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.cursor.as_deref())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub cursor: Option<String>,
    /// Item count across all pages, when the server reports it
    pub total: Option<u64>,
}

/// `{ "data": {...} }`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Analysis tool from the global catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

/// Pattern (analyzer rule) from a tool's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub severity_level: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingStandardMeta {
    #[serde(default)]
    pub enabled_tools_count: u32,
    #[serde(default)]
    pub enabled_patterns_count: u32,
}

/// Coding standard of an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingStandard {
    pub id: StandardId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_draft: Option<bool>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub meta: CodingStandardMeta,
}

/// Body of `POST .../coding-standards`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCodingStandard {
    pub name: String,
    pub languages: Vec<String>,
}

/// Enabled state of one pattern inside a coding standard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternState {
    pub id: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Tool entry of a coding standard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingStandardTool {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub patterns: Vec<PatternState>,
}

impl CodingStandardTool {
    /// Ids of the patterns marked enabled
    pub fn enabled_pattern_ids(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternParameter {
    pub name: String,
    pub value: String,
}

/// One pattern in a tool update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSetting {
    pub id: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<PatternParameter>,
}

impl PatternSetting {
    pub fn disabled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: false,
            parameters: Vec::new(),
        }
    }
}

/// Body of `PATCH .../coding-standards/{id}/tools/{uuid}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUpdate {
    pub enabled: bool,
    pub patterns: Vec<PatternSetting>,
}

impl ToolUpdate {
    /// Turns a tool off and leaves its patterns untouched
    pub fn disable_tool() -> Self {
        Self {
            enabled: false,
            patterns: Vec::new(),
        }
    }
}
