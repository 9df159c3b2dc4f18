//! Importing an exported rule list as a Codacy coding standard
//!
//! [`ImportPlan`] decides rule by rule what gets enabled; [`Importer`]
//! replays the plan against the API.

mod importer;
mod plan;

pub use importer::{
    DisabledTools, ImportOutcome, Importer, ToolOutcome, disable_standard_tools,
    unique_standard_name,
};
pub use plan::{ImportPlan, PlannedRule, SkipReason, SkippedRule};
