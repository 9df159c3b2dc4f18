//! Codacy API access
//!
//! [`CodacyApi`] is the seam every workflow is written against.
//! [`HttpCodacyClient`] is the production implementation; tests use an
//! in-memory fake.

mod client;
mod pagination;
mod pattern;
mod types;

use std::collections::BTreeSet;

pub use client::HttpCodacyClient;
pub use pagination::collect_pages;
pub use pattern::PatternPrefix;
pub use types::{
    CodingStandard, CodingStandardMeta, CodingStandardTool, Envelope, NewCodingStandard, Page,
    Pagination, Pattern, PatternParameter, PatternSetting, PatternState, StandardId, Tool,
    ToolUpdate,
};

use crate::Result;

/// Operations sonar-sync needs from the Codacy API
///
/// Organization-scoped calls act on the organization the implementation
/// was configured with. List operations return every page.
pub trait CodacyApi {
    /// `GET /tools`
    fn list_tools(&self) -> Result<Vec<Tool>>;

    /// `GET /tools/{uuid}/patterns`
    fn list_tool_patterns(&self, tool_uuid: &str) -> Result<Vec<Pattern>>;

    /// `GET /organizations/{provider}/{org}/coding-standards`
    fn list_coding_standards(&self) -> Result<Vec<CodingStandard>>;

    /// `POST /organizations/{provider}/{org}/coding-standards`
    fn create_coding_standard(&self, request: &NewCodingStandard) -> Result<CodingStandard>;

    /// `GET .../coding-standards/{id}/tools`
    fn list_coding_standard_tools(&self, standard_id: StandardId) -> Result<Vec<CodingStandardTool>>;

    /// `GET .../coding-standards/{id}/tools/{uuid}`
    fn get_coding_standard_tool(
        &self,
        standard_id: StandardId,
        tool_uuid: &str,
    ) -> Result<CodingStandardTool>;

    /// `PATCH .../coding-standards/{id}/tools/{uuid}`
    fn update_coding_standard_tool(
        &self,
        standard_id: StandardId,
        tool_uuid: &str,
        update: &ToolUpdate,
    ) -> Result<()>;

    /// `POST .../coding-standards/{id}/promote`
    fn promote_coding_standard(&self, standard_id: StandardId) -> Result<()>;
}

/// All pattern ids of a tool's catalog
pub fn fetch_pattern_ids(api: &dyn CodacyApi, tool_uuid: &str) -> Result<BTreeSet<String>> {
    let ids: BTreeSet<String> = api
        .list_tool_patterns(tool_uuid)?
        .into_iter()
        .map(|p| p.id)
        .filter(|id| !id.is_empty())
        .collect();
    tracing::debug!(tool_uuid, count = ids.len(), "Retrieved available patterns");
    Ok(ids)
}

/// Rule keys available in a tool's catalog (prefix stripped)
pub fn fetch_rule_keys(
    api: &dyn CodacyApi,
    tool_uuid: &str,
    prefix: &PatternPrefix,
) -> Result<BTreeSet<String>> {
    let ids = fetch_pattern_ids(api, tool_uuid)?;
    Ok(prefix.rule_keys(ids.iter().map(String::as_str)))
}

/// Rule keys enabled for a tool inside a coding standard (prefix stripped)
pub fn fetch_enabled_rule_keys(
    api: &dyn CodacyApi,
    standard_id: StandardId,
    tool_uuid: &str,
    prefix: &PatternPrefix,
) -> Result<BTreeSet<String>> {
    let tool = api.get_coding_standard_tool(standard_id, tool_uuid)?;
    Ok(prefix.rule_keys(tool.enabled_pattern_ids()))
}
