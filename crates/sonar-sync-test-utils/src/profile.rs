//! [`ProfileBuilder`] for SonarQube quality-profile exports.

use std::fs;
use std::path::Path;

const CSHARP_REPOSITORY: &str = "csharpsquid";

#[derive(Debug, Clone)]
struct RuleSpec {
    repository_key: String,
    key: String,
    priority: Option<String>,
    parameters: Vec<(String, String)>,
}

/// Builds the XML text of a profile export.
///
/// # Example
///
/// ```rust,no_run
/// use sonar_sync_test_utils::ProfileBuilder;
///
/// let xml = ProfileBuilder::new()
///     .csharp(&["S107", "S1144"])
///     .rule_with_params("csharpsquid", "S138", &[("max", "80")])
///     .to_xml();
/// assert!(xml.contains("<key>S138</key>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    rules: Vec<RuleSpec>,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `csharpsquid` rule with priority `MAJOR` per key.
    pub fn csharp(mut self, keys: &[&str]) -> Self {
        for key in keys {
            self = self.rule(CSHARP_REPOSITORY, key);
        }
        self
    }

    pub fn rule(self, repository_key: &str, key: &str) -> Self {
        self.rule_with_params(repository_key, key, &[])
    }

    pub fn rule_with_params(
        mut self,
        repository_key: &str,
        key: &str,
        parameters: &[(&str, &str)],
    ) -> Self {
        self.rules.push(RuleSpec {
            repository_key: repository_key.to_string(),
            key: key.to_string(),
            priority: Some("MAJOR".to_string()),
            parameters: parameters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version='1.0' encoding='UTF-8'?>\n<profile>\n  <name>Sonar way</name>\n  <language>cs</language>\n  <rules>\n",
        );
        for rule in &self.rules {
            xml.push_str("    <rule>\n");
            xml.push_str(&format!(
                "      <repositoryKey>{}</repositoryKey>\n",
                escape(&rule.repository_key)
            ));
            xml.push_str(&format!("      <key>{}</key>\n", escape(&rule.key)));
            if let Some(priority) = &rule.priority {
                xml.push_str(&format!("      <priority>{}</priority>\n", escape(priority)));
            }
            if !rule.parameters.is_empty() {
                xml.push_str("      <parameters>\n");
                for (key, value) in &rule.parameters {
                    xml.push_str(&format!(
                        "        <parameter>\n          <key>{}</key>\n          <value>{}</value>\n        </parameter>\n",
                        escape(key),
                        escape(value)
                    ));
                }
                xml.push_str("      </parameters>\n");
            }
            xml.push_str("    </rule>\n");
        }
        xml.push_str("  </rules>\n</profile>\n");
        xml
    }

    pub fn write(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, self.to_xml())
            .unwrap_or_else(|e| panic!("Could not write profile {}: {}", path.display(), e));
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_sync_core::parse_rules_str;

    #[test]
    fn test_builder_output_parses() {
        let xml = ProfileBuilder::new()
            .csharp(&["S107", "S1144"])
            .rule_with_params("csharpsquid", "S138", &[("max", "a<b")])
            .to_xml();

        let rules = parse_rules_str(&xml).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.rules()[2].parameters["max"], "a<b");
    }
}
