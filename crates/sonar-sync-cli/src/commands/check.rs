//! Check command: XML rules vs the full SonarC# pattern catalog

use colored::Colorize;

use sonar_sync_core::rules::RuleSet;
use sonar_sync_core::{CodacyApi, PatternPrefix, Reconciliation, fetch_rule_keys};

use super::{print_json, print_keys, print_summary};
use crate::context::CommandContext;
use crate::error::Result;

/// Reconcile the export against every pattern the tool offers
pub fn check(
    api: &dyn CodacyApi,
    tool_uuid: &str,
    prefix: &PatternPrefix,
    rules: &RuleSet,
) -> Result<Reconciliation> {
    let remote = fetch_rule_keys(api, tool_uuid, prefix)?;
    Ok(Reconciliation::compute(&rules.keys(), &remote))
}

/// Run the check command
pub fn run_check(ctx: &CommandContext, json: bool) -> Result<()> {
    let rules = ctx.load_rules()?;
    let client = ctx.client()?;

    if !json {
        println!(
            "{} Comparing {} XML rules with the Codacy catalog...",
            "=>".blue().bold(),
            rules.keys().len()
        );
    }

    let result = check(&client, &ctx.settings().sonar.tool_uuid, &ctx.prefix(), &rules)?;

    if json {
        return print_json(&result);
    }

    print_keys("Missing from Codacy", &"-".yellow().to_string(), &result.missing_remote);
    print_keys("Only in Codacy", &"+".green().to_string(), &result.extra_remote);
    print_summary(&result, "Patterns in Codacy");

    println!();
    if result.is_in_sync() {
        println!("{} XML rules and Codacy patterns match.", "OK".green().bold());
    } else if result.missing_remote.is_empty() {
        println!("{} Every XML rule is available in Codacy.", "OK".green().bold());
    } else {
        println!(
            "{} {} XML rules have no Codacy pattern.",
            "WARN".yellow().bold(),
            result.missing_remote.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonar_sync_core::config::SONAR_CSHARP_TOOL_UUID;
    use sonar_sync_core::parse_rules_str;
    use sonar_sync_test_utils::{FakeCodacy, Operation, ProfileBuilder};
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_check_strips_prefix_and_compares() {
        let api = FakeCodacy::sonar_csharp(&["S100", "S107", "S2076"]);
        let rules = parse_rules_str(&ProfileBuilder::new().csharp(&["S107", "S4000"]).to_xml()).unwrap();

        let result = check(
            &api,
            SONAR_CSHARP_TOOL_UUID,
            &PatternPrefix::new("SonarCSharp_"),
            &rules,
        )
        .unwrap();

        assert_eq!(result.missing_remote, set(&["S4000"]));
        assert_eq!(result.extra_remote, set(&["S100", "S2076"]));
        assert_eq!(result.matching, set(&["S107"]));
    }

    #[test]
    fn test_check_propagates_api_failure() {
        let api = FakeCodacy::sonar_csharp(&["S107"]).fail_on(Operation::ListToolPatterns);
        let rules = parse_rules_str(&ProfileBuilder::new().csharp(&["S107"]).to_xml()).unwrap();

        let err = check(
            &api,
            SONAR_CSHARP_TOOL_UUID,
            &PatternPrefix::new("SonarCSharp_"),
            &rules,
        )
        .unwrap_err();

        assert!(err.to_string().contains("500"));
    }
}
