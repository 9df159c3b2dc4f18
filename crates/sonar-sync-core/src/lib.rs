//! Core library for sonar-sync
//!
//! Keeps a Codacy organization in line with a SonarQube quality-profile
//! export:
//!
//! - **Rules**: parsing the exported XML into a [`RuleSet`]
//! - **API**: the [`CodacyApi`] seam and its HTTP implementation
//! - **Reconciliation**: set differences between exported keys and remote patterns
//! - **Import**: planning and creating a coding standard that enables exactly
//!   the exported rules, plus JSON reports of what was enabled and skipped
//!
//! # Example
//!
//! ```ignore
//! use sonar_sync_core::{Reconciliation, load_rules};
//!
//! let rules = load_rules("csharp_sonarqube_rules.xml".as_ref())?;
//! let remote = fetch_rule_keys(&client, &settings.sonar.tool_uuid, &prefix)?;
//! let result = Reconciliation::compute(&rules.keys(), &remote);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod rules;

pub use api::{
    CodacyApi, HttpCodacyClient, PatternPrefix, StandardId, fetch_enabled_rule_keys,
    fetch_pattern_ids, fetch_rule_keys,
};
pub use config::{ApiToken, ConfigResolver, Settings, SettingsLayer};
pub use error::{Error, Result};
pub use import::{ImportOutcome, ImportPlan, Importer, SkipReason};
pub use reconcile::{Reconciliation, preview};
pub use report::{ReportContext, ReportPaths, write_import_reports};
pub use rules::{RuleSet, SonarRule, load_rules, parse_rules_str};
