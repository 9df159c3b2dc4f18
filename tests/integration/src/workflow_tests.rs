//! Workflow Integration Tests
//!
//! End-to-end scenarios across the core library: export parsing, catalog
//! reconciliation, import, reports and verification of the created standard,
//! all against the in-memory organization.

use std::collections::BTreeSet;
use std::path::Path;

use pretty_assertions::assert_eq;
use regex::Regex;
use sonar_sync_core::config::{ConfigResolver, SONAR_CSHARP_TOOL_UUID, Settings};
use sonar_sync_core::import::{ImportPlan, Importer};
use sonar_sync_core::report::{ReportContext, write_import_reports};
use sonar_sync_core::{
    PatternPrefix, Reconciliation, RuleSet, fetch_enabled_rule_keys, fetch_pattern_ids,
    fetch_rule_keys, load_rules,
};
use sonar_sync_test_utils::{FakeCodacy, ProfileBuilder, TestWorkspace};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn profile() -> ProfileBuilder {
    ProfileBuilder::new()
        .csharp(&["S100", "S107"])
        .rule_with_params("csharpsquid", "S138", &[("max", "80"), ("countNonpublicMethods", "true")])
        .rule("roslyn.sonaranalyzer.security.cs", "S2076")
        .csharp(&["S9999"])
        .rule("vbnet", "S1")
}

fn catalog() -> FakeCodacy {
    FakeCodacy::sonar_csharp(&["S100", "S107", "S138", "S2076", "S3776"])
}

fn prefix(settings: &Settings) -> PatternPrefix {
    PatternPrefix::new(settings.sonar.pattern_prefix.clone())
}

fn resolve(ws: &TestWorkspace) -> Settings {
    ConfigResolver::with_global_config_dir(ws.root(), ws.path("global"))
        .resolve()
        .unwrap()
}

fn build_plan(api: &FakeCodacy, settings: &Settings, rules: &RuleSet) -> ImportPlan {
    let available = fetch_pattern_ids(api, &settings.sonar.tool_uuid).unwrap();
    ImportPlan::build(rules, &available, &settings.sonar.repositories, &prefix(settings))
}

fn file_name(path: &Path) -> &str {
    path.file_name().unwrap().to_str().unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_check_then_import_then_verify() {
    let ws = TestWorkspace::new();
    let xml = ws.write_profile(&profile());
    let settings = resolve(&ws);
    let rules = load_rules(&xml).unwrap();
    let api = catalog();

    // Catalog check
    let remote = fetch_rule_keys(&api, &settings.sonar.tool_uuid, &prefix(&settings)).unwrap();
    let check = Reconciliation::compute(&rules.keys(), &remote);
    let missing: Vec<&str> = check.missing_remote.iter().map(String::as_str).collect();
    assert_eq!(missing, vec!["S1", "S9999"]);
    let extra: Vec<&str> = check.extra_remote.iter().map(String::as_str).collect();
    assert_eq!(extra, vec!["S3776"]);

    // Import
    let plan = build_plan(&api, &settings, &rules);
    let outcome = Importer::new(&api, &settings.standard).run(&plan).unwrap();
    assert_eq!(outcome.enabled_patterns(), 4);

    // Verify the created standard
    let enabled = fetch_enabled_rule_keys(
        &api,
        outcome.standard_id,
        SONAR_CSHARP_TOOL_UUID,
        &prefix(&settings),
    )
    .unwrap();
    let planned: BTreeSet<String> = plan.enabled.iter().map(|p| p.rule.key.clone()).collect();
    assert_eq!(enabled, planned);

    let verify = Reconciliation::compute(&rules.keys(), &enabled);
    assert!(verify.extra_remote.is_empty());
    assert_eq!(verify.matching.len(), 4);
    assert_eq!(verify.success_rate(), Some(4.0 / 6.0 * 100.0));
}

#[test]
fn test_reports_written_with_timestamped_names() {
    let ws = TestWorkspace::new();
    let xml = ws.write_profile(&profile());
    let settings = resolve(&ws);
    let rules = load_rules(&xml).unwrap();
    let api = catalog();

    let plan = build_plan(&api, &settings, &rules);
    let outcome = Importer::new(&api, &settings.standard).run(&plan).unwrap();
    let ctx = ReportContext::now(outcome.standard_name.clone(), "acme");
    let paths = write_import_reports(&ws.path("reports"), &plan, &ctx).unwrap();

    let skipped_name = Regex::new(r"^skipped_rules_\d{8}_\d{6}\.json$").unwrap();
    let enabled_name = Regex::new(r"^enabled_patterns_\d{8}_\d{6}\.json$").unwrap();
    assert!(skipped_name.is_match(file_name(&paths.skipped)));
    assert!(enabled_name.is_match(file_name(&paths.enabled)));

    let skipped = ws.read_report("reports", "skipped_rules_");
    let timestamp = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}$").unwrap();
    assert!(timestamp.is_match(skipped["summary"]["timestamp"].as_str().unwrap()));
    assert_eq!(skipped["summary"]["total_skipped"], 2);
    assert_eq!(skipped["summary"]["coding_standard"], "Imported Sonar Rules");

    let reasons: Vec<&str> = skipped["skipped_rules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["reason"].as_str().unwrap())
        .collect();
    assert_eq!(reasons, vec!["Pattern not available in Codacy", "Unknown repository key"]);

    let enabled = ws.read_report("reports", "enabled_patterns_");
    assert_eq!(enabled["summary"]["total_enabled"], 4);
    assert_eq!(enabled["enabled_patterns"][2]["rule_key"], "S138");
    assert_eq!(enabled["enabled_patterns"][2]["parameters"]["max"], "80");
    assert_eq!(enabled["enabled_patterns"][2]["parameters"]["countNonpublicMethods"], "true");
}

#[test]
fn test_project_config_changes_mapping_and_name() {
    let ws = TestWorkspace::new();
    let xml = ws.write_profile(&profile());
    ws.write_config(
        r#"
[sonar.repositories]
vbnet = "SonarVB"

[standard]
name = "Acme C#"
"#,
    );
    let settings = resolve(&ws);
    let rules = load_rules(&xml).unwrap();
    let api = catalog();

    assert_eq!(settings.sonar.repositories["csharpsquid"], "SonarC#");
    assert_eq!(settings.sonar.repositories["vbnet"], "SonarVB");

    let plan = build_plan(&api, &settings, &rules);
    // vbnet is mapped now but its pattern is not in the SonarC# catalog
    assert_eq!(plan.unmapped().count(), 0);
    assert_eq!(plan.unavailable().count(), 2);

    let outcome = Importer::new(&api, &settings.standard).run(&plan).unwrap();
    assert_eq!(outcome.standard_name, "Acme C#");
}

#[test]
fn test_second_import_gets_unique_name() {
    let ws = TestWorkspace::new();
    let xml = ws.write_profile(&profile());
    let settings = resolve(&ws);
    let rules = load_rules(&xml).unwrap();
    let api = catalog();
    let plan = build_plan(&api, &settings, &rules);

    let first = Importer::new(&api, &settings.standard).run(&plan).unwrap();
    let second = Importer::new(&api, &settings.standard).run(&plan).unwrap();

    assert_eq!(first.standard_name, "Imported Sonar Rules");
    assert_eq!(second.standard_name, "Imported Sonar Rules (1)");
    assert_ne!(first.standard_id, second.standard_id);
}

#[test]
fn test_empty_profile_imports_nothing() {
    let ws = TestWorkspace::new();
    let xml = ws.write_profile(&ProfileBuilder::new());
    let settings = resolve(&ws);
    let rules = load_rules(&xml).unwrap();
    let api = catalog();

    assert!(rules.is_empty());
    let plan = build_plan(&api, &settings, &rules);
    assert!(plan.enabled.is_empty());

    let check = Reconciliation::compute(&rules.keys(), &BTreeSet::new());
    assert_eq!(check.success_rate(), None);
}
