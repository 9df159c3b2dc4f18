//! Mapping between Sonar rule keys and prefixed Codacy pattern ids

use std::collections::BTreeSet;

/// The fixed prefix Codacy puts in front of a rule key, e.g. `SonarCSharp_`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternPrefix(String);

impl PatternPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rule key of a pattern id, if the id carries this prefix
    pub fn strip<'a>(&self, pattern_id: &'a str) -> Option<&'a str> {
        pattern_id
            .strip_prefix(self.0.as_str())
            .filter(|key| !key.is_empty())
    }

    /// Pattern id for a rule key
    pub fn apply(&self, rule_key: &str) -> String {
        format!("{}{}", self.0, rule_key)
    }

    /// Rule keys of all prefixed ids; other ids are dropped
    pub fn rule_keys<'a, I>(&self, pattern_ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        pattern_ids
            .into_iter()
            .filter_map(|id| self.strip(id))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SonarCSharp_S107", Some("S107"))]
    #[case("SonarCSharp_", None)]
    #[case("SonarVB_S107", None)]
    #[case("S107", None)]
    #[case("SonarCSharp_SonarCSharp_S1", Some("SonarCSharp_S1"))]
    fn test_strip(#[case] id: &str, #[case] expected: Option<&str>) {
        let prefix = PatternPrefix::new("SonarCSharp_");
        assert_eq!(prefix.strip(id), expected);
    }

    #[test]
    fn test_apply() {
        assert_eq!(PatternPrefix::new("SonarCSharp_").apply("S107"), "SonarCSharp_S107");
    }

    #[test]
    fn test_rule_keys_drops_foreign_ids() {
        let prefix = PatternPrefix::new("SonarCSharp_");
        let keys = prefix.rule_keys(["SonarCSharp_S2", "Other_S3", "SonarCSharp_S1", "SonarCSharp_S2"]);
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["S1", "S2"]);
    }
}
