//! SonarQube quality-profile export parsing
//!
//! A profile export lists `<rule>` elements, each carrying a `repositoryKey`,
//! a `key`, a `priority` and optional `<parameters>`:
//!
//! ```xml
//! <profile>
//!   <rules>
//!     <rule>
//!       <repositoryKey>csharpsquid</repositoryKey>
//!       <key>S107</key>
//!       <priority>MAJOR</priority>
//!       <parameters>
//!         <parameter><key>max</key><value>7</value></parameter>
//!       </parameters>
//!     </rule>
//!   </rules>
//! </profile>
//! ```
//!
//! Rules are recognised at any depth. Element prefixes are ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single rule from the SonarQube export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonarRule {
    /// Analyzer repository, e.g. `csharpsquid`
    pub repository_key: String,
    /// Rule key, e.g. `S107`
    pub key: String,
    /// Severity as exported (`BLOCKER`, `MAJOR`, ...)
    pub priority: Option<String>,
    /// Rule parameters keyed by parameter name
    pub parameters: BTreeMap<String, String>,
}

/// All rules parsed from one export, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<SonarRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<SonarRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SonarRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct rule keys, sorted
    pub fn keys(&self) -> BTreeSet<String> {
        self.rules.iter().map(|r| r.key.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SonarRule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a SonarRule;
    type IntoIter = std::slice::Iter<'a, SonarRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Load and parse a profile export from disk
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::RulesFileNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;

    tracing::debug!(path = %path.display(), "Parsing SonarQube rule export");
    let rules = parse_rules_str(&content)?;
    tracing::debug!(count = rules.len(), "Parsed SonarQube rules");
    Ok(rules)
}

/// Parse a profile export held in memory
pub fn parse_rules_str(xml: &str) -> Result<RuleSet> {
    let mut reader = Reader::from_str(xml);
    let mut parser = ProfileParser::default();

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                parser.saw_element = true;
                parser.handle_start(&String::from_utf8_lossy(e.local_name().as_ref()));
            }
            Ok(Event::Empty(e)) => {
                parser.saw_element = true;
                parser.handle_empty(&String::from_utf8_lossy(e.local_name().as_ref()));
            }
            Ok(Event::End(e)) => {
                parser.handle_end(&String::from_utf8_lossy(e.local_name().as_ref()));
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| Error::xml(err, position))?;
                parser.handle_text(&text);
            }
            Ok(Event::CData(e)) => {
                parser.handle_text(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(Error::xml(err, position)),
        }
    }

    let end = reader.buffer_position() as u64;
    if parser.current.is_some() {
        return Err(Error::xml("unexpected end of document inside <rule>", end));
    }
    if !parser.saw_element {
        return Err(Error::xml("document has no root element", end));
    }

    Ok(RuleSet::new(parser.rules))
}

#[derive(Debug, Default)]
struct RuleAccum {
    repository_key: String,
    key: String,
    priority: String,
    parameters: BTreeMap<String, String>,
    param: Option<ParamAccum>,
}

#[derive(Debug, Default)]
struct ParamAccum {
    key: String,
    value: String,
}

impl RuleAccum {
    fn into_rule(self) -> Option<SonarRule> {
        let key = self.key.trim();
        if key.is_empty() {
            return None;
        }
        let priority = self.priority.trim();
        Some(SonarRule {
            repository_key: self.repository_key.trim().to_string(),
            key: key.to_string(),
            priority: (!priority.is_empty()).then(|| priority.to_string()),
            parameters: self.parameters,
        })
    }
}

/// Event-driven state machine over the profile document
#[derive(Debug, Default)]
struct ProfileParser {
    rules: Vec<SonarRule>,
    current: Option<RuleAccum>,
    /// Element names opened inside the current `<rule>`
    path: Vec<String>,
    saw_element: bool,
}

impl ProfileParser {
    fn handle_start(&mut self, name: &str) {
        match self.current {
            None if name == "rule" => {
                self.current = Some(RuleAccum::default());
                self.path.clear();
            }
            None => {}
            Some(ref mut rule) => {
                if name == "parameter" && self.path == ["parameters"] {
                    rule.param = Some(ParamAccum::default());
                }
                self.path.push(name.to_string());
            }
        }
    }

    fn handle_empty(&mut self, name: &str) {
        if self.current.is_none() && name == "rule" {
            tracing::debug!("Skipping <rule/> without a key");
        }
    }

    fn handle_text(&mut self, text: &str) {
        let Some(rule) = self.current.as_mut() else {
            return;
        };
        let path: Vec<&str> = self.path.iter().map(String::as_str).collect();
        match path.as_slice() {
            ["repositoryKey"] => rule.repository_key.push_str(text),
            ["key"] => rule.key.push_str(text),
            ["priority"] => rule.priority.push_str(text),
            ["parameters", "parameter", "key"] => {
                if let Some(param) = rule.param.as_mut() {
                    param.key.push_str(text);
                }
            }
            ["parameters", "parameter", "value"] => {
                if let Some(param) = rule.param.as_mut() {
                    param.value.push_str(text);
                }
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &str) {
        let Some(rule) = self.current.as_mut() else {
            return;
        };

        if self.path.is_empty() {
            if name == "rule" {
                self.finish_rule();
            }
            return;
        }

        self.path.pop();
        if name == "parameter" && self.path == ["parameters"] {
            if let Some(param) = rule.param.take() {
                let key = param.key.trim();
                if key.is_empty() {
                    tracing::debug!("Ignoring rule parameter without a key");
                } else {
                    rule.parameters
                        .insert(key.to_string(), param.value.trim().to_string());
                }
            }
        }
    }

    fn finish_rule(&mut self) {
        let Some(accum) = self.current.take() else {
            return;
        };
        let repository = accum.repository_key.trim().to_string();
        match accum.into_rule() {
            Some(rule) => self.rules.push(rule),
            None => tracing::debug!(repository = %repository, "Skipping rule without a key"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROFILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<profile>
  <name>Sonar way</name>
  <language>cs</language>
  <rules>
    <rule>
      <repositoryKey>csharpsquid</repositoryKey>
      <key>S107</key>
      <type>CODE_SMELL</type>
      <priority>MAJOR</priority>
      <parameters>
        <parameter>
          <key>max</key>
          <value>7</value>
        </parameter>
      </parameters>
    </rule>
    <rule>
      <repositoryKey>roslyn.sonaranalyzer.security.cs</repositoryKey>
      <key>S2076</key>
      <priority>CRITICAL</priority>
      <parameters/>
    </rule>
  </rules>
</profile>
"#;

    #[test]
    fn test_parse_profile_rules() {
        let rules = parse_rules_str(PROFILE).unwrap();
        assert_eq!(rules.len(), 2);

        let first = &rules.rules()[0];
        assert_eq!(first.repository_key, "csharpsquid");
        assert_eq!(first.key, "S107");
        assert_eq!(first.priority.as_deref(), Some("MAJOR"));
        assert_eq!(first.parameters.get("max").map(String::as_str), Some("7"));

        let second = &rules.rules()[1];
        assert_eq!(second.repository_key, "roslyn.sonaranalyzer.security.cs");
        assert!(second.parameters.is_empty());
    }

    #[test]
    fn test_parameter_key_does_not_override_rule_key() {
        let rules = parse_rules_str(PROFILE).unwrap();
        assert_eq!(
            rules.keys().into_iter().collect::<Vec<_>>(),
            vec!["S107".to_string(), "S2076".to_string()]
        );
    }

    #[test]
    fn test_rule_without_key_is_skipped() {
        let xml = "<profile><rules><rule><repositoryKey>csharpsquid</repositoryKey></rule>\
                   <rule><key>S1</key></rule><rule/></rules></profile>";
        let rules = parse_rules_str(xml).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].key, "S1");
        assert_eq!(rules.rules()[0].priority, None);
    }

    #[test]
    fn test_duplicate_keys_collapse_in_key_set() {
        let xml = "<profile><rule><key>S1</key></rule><rule><key>S1</key></rule></profile>";
        let rules = parse_rules_str(xml).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.keys().len(), 1);
    }

    #[test]
    fn test_empty_profile_has_no_rules() {
        let rules = parse_rules_str("<profile><rules/></profile>").unwrap();
        assert!(rules.is_empty());
        assert!(rules.keys().is_empty());
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let xml = "<profile><rule><key>S&amp;1</key>\
                   <parameters><parameter><key>format</key><value>^[a-z]&lt;</value></parameter></parameters>\
                   </rule></profile>";
        let rules = parse_rules_str(xml).unwrap();
        assert_eq!(rules.rules()[0].key, "S&1");
        assert_eq!(rules.rules()[0].parameters["format"], "^[a-z]<");
    }

    #[test]
    fn test_empty_parameter_value_is_empty_string() {
        let xml = "<profile><rule><key>S1</key><parameters><parameter><key>p</key><value/></parameter>\
                   </parameters></rule></profile>";
        let rules = parse_rules_str(xml).unwrap();
        assert_eq!(rules.rules()[0].parameters["p"], "");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse_rules_str("<profile><rule><key>S1</key></rul></profile>");
        assert!(matches!(result, Err(Error::Xml { .. })));
    }

    #[test]
    fn test_truncated_rule_is_an_error() {
        let result = parse_rules_str("<profile><rule><key>S1</key>");
        assert!(matches!(result, Err(Error::Xml { .. })));
    }

    #[test]
    fn test_non_xml_is_an_error() {
        assert!(matches!(parse_rules_str(""), Err(Error::Xml { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = load_rules(&temp.path().join("absent.xml"));
        assert!(matches!(result, Err(Error::RulesFileNotFound { .. })));
    }
}
