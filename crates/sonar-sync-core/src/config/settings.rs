//! Effective settings and the partial layers they are built from
//!
//! Every layer (global file, project file, command-line flags) is a
//! [`SettingsLayer`] whose fields are all optional. Layers are applied in
//! order on top of [`Settings::default`], later layers winning.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://app.codacy.com/api/v3";
pub const DEFAULT_PROVIDER: &str = "gh";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// UUID of the SonarC# tool in the Codacy catalog
pub const SONAR_CSHARP_TOOL_UUID: &str = "8954dff3-f19c-429c-ac76-c45fa5e73b62";
pub const SONAR_CSHARP_TOOL_NAME: &str = "SonarC#";
pub const DEFAULT_PATTERN_PREFIX: &str = "SonarCSharp_";
pub const DEFAULT_XML_FILE: &str = "csharp_sonarqube_rules.xml";
pub const DEFAULT_STANDARD_NAME: &str = "Imported Sonar Rules";

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    /// Git provider segment of organization URLs (`gh`, `gl`, `bb`)
    pub provider: String,
    pub organization: Option<String>,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            provider: DEFAULT_PROVIDER.to_string(),
            organization: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Where the rules come from and how they map onto Codacy patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonarSettings {
    pub xml_file: PathBuf,
    /// Catalog tool whose patterns are reconciled against the export
    pub tool_uuid: String,
    /// Prefix Codacy puts in front of Sonar rule keys
    pub pattern_prefix: String,
    /// SonarQube repository key -> Codacy tool name
    pub repositories: BTreeMap<String, String>,
}

impl Default for SonarSettings {
    fn default() -> Self {
        let repositories = ["csharpsquid", "roslyn.sonaranalyzer.security.cs"]
            .into_iter()
            .map(|repo| (repo.to_string(), SONAR_CSHARP_TOOL_NAME.to_string()))
            .collect();
        Self {
            xml_file: PathBuf::from(DEFAULT_XML_FILE),
            tool_uuid: SONAR_CSHARP_TOOL_UUID.to_string(),
            pattern_prefix: DEFAULT_PATTERN_PREFIX.to_string(),
            repositories,
        }
    }
}

/// Coding standard created by `import`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardSettings {
    pub name: String,
    pub languages: Vec<String>,
}

impl Default for StandardSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_STANDARD_NAME.to_string(),
            languages: vec!["CSharp".to_string()],
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub sonar: SonarSettings,
    pub standard: StandardSettings,
}

impl Settings {
    /// Overlay a layer; values present in `layer` replace current ones,
    /// repository mappings are merged key by key
    pub fn apply(&mut self, layer: SettingsLayer) {
        let SettingsLayer { api, sonar, standard } = layer;

        if let Some(base_url) = api.base_url {
            self.api.base_url = base_url;
        }
        if let Some(provider) = api.provider {
            self.api.provider = provider;
        }
        if let Some(organization) = api.organization {
            self.api.organization = Some(organization);
        }
        if let Some(timeout) = api.timeout_secs {
            self.api.timeout_secs = timeout;
        }

        if let Some(xml_file) = sonar.xml_file {
            self.sonar.xml_file = xml_file;
        }
        if let Some(tool_uuid) = sonar.tool_uuid {
            self.sonar.tool_uuid = tool_uuid;
        }
        if let Some(prefix) = sonar.pattern_prefix {
            self.sonar.pattern_prefix = prefix;
        }
        self.sonar.repositories.extend(sonar.repositories);

        if let Some(name) = standard.name {
            self.standard.name = name;
        }
        if let Some(languages) = standard.languages {
            self.standard.languages = languages;
        }
    }
}

/// A partial settings source, as written in `sonar-sync.toml`
///
/// ```toml
/// [api]
/// organization = "acme"
///
/// [sonar]
/// xml_file = "rules/csharp.xml"
///
/// [sonar.repositories]
/// "roslyn.sonaranalyzer.security.cs" = "SonarC#"
///
/// [standard]
/// name = "Acme C#"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    #[serde(default)]
    pub api: ApiLayer,
    #[serde(default)]
    pub sonar: SonarLayer,
    #[serde(default)]
    pub standard: StandardLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiLayer {
    pub base_url: Option<String>,
    pub provider: Option<String>,
    pub organization: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SonarLayer {
    pub xml_file: Option<PathBuf>,
    pub tool_uuid: Option<String>,
    pub pattern_prefix: Option<String>,
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardLayer {
    pub name: Option<String>,
    pub languages: Option<Vec<String>>,
}

impl SettingsLayer {
    pub fn parse(content: &str) -> Result<Self> {
        let layer: SettingsLayer = toml::from_str(content)?;
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_sonar_csharp() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.sonar.tool_uuid, SONAR_CSHARP_TOOL_UUID);
        assert_eq!(settings.sonar.repositories["csharpsquid"], "SonarC#");
        assert_eq!(
            settings.sonar.repositories["roslyn.sonaranalyzer.security.cs"],
            "SonarC#"
        );
        assert_eq!(settings.standard.languages, vec!["CSharp"]);
        assert_eq!(settings.api.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_apply_overrides_only_present_values() {
        let mut settings = Settings::default();
        let layer = SettingsLayer::parse(
            r#"
[api]
organization = "acme"

[sonar.repositories]
vbnet = "SonarVB"
"#,
        )
        .unwrap();

        settings.apply(layer);

        assert_eq!(settings.api.organization.as_deref(), Some("acme"));
        assert_eq!(settings.api.provider, DEFAULT_PROVIDER);
        assert_eq!(settings.sonar.repositories.len(), 3);
        assert_eq!(settings.sonar.repositories["vbnet"], "SonarVB");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(SettingsLayer::parse("[api]\norganisation = \"typo\"\n").is_err());
    }
}
