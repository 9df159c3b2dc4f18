//! Configuration resolution with layered overrides
//!
//! The `ConfigResolver` loads settings from a hierarchy of TOML files,
//! with later sources overriding earlier ones:
//!
//! 1. Global defaults (`<config_dir>/sonar-sync/config.toml`)
//! 2. Project config (`./sonar-sync.toml`), or an explicit `--config` file
//!
//! Command-line flags are applied by the caller as a final layer.

use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{Settings, SettingsLayer};
use crate::{Error, Result};

/// File name of the per-project configuration
pub const PROJECT_CONFIG_FILE: &str = "sonar-sync.toml";

/// Resolves settings by merging configuration files
pub struct ConfigResolver {
    /// Directory holding the project config (usually the working directory)
    root: PathBuf,

    /// Explicit config file replacing the project layer
    explicit_config: Option<PathBuf>,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform-appropriate directory is used via `dirs::config_dir()`.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver for the given project directory
    ///
    /// Uses the platform-appropriate global config directory:
    /// - Linux: `~/.config/sonar-sync/`
    /// - macOS: `~/Library/Application Support/sonar-sync/`
    /// - Windows: `%APPDATA%\sonar-sync\`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            explicit_config: None,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    ///
    /// Useful for tests that must not read the real user config.
    pub fn with_global_config_dir(root: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            root: root.into(),
            explicit_config: None,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    /// Use `path` instead of `./sonar-sync.toml`; a missing file is an error
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_config = Some(path.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("sonar-sync"))
    }

    /// Path of the project layer that `resolve` will read
    pub fn project_config_path(&self) -> PathBuf {
        match self.explicit_config {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.root.join(path),
            None => self.root.join(PROJECT_CONFIG_FILE),
        }
    }

    /// Resolve settings from defaults and all present files
    ///
    /// Missing layers are skipped silently, except an explicit config file.
    /// Invalid TOML in any layer produces an error.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        // Layer 1 - Global defaults
        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join("config.toml");
            if global_config_path.is_file() {
                tracing::debug!(?global_config_path, "Loading global config (layer 1)");
                settings.apply(read_layer(&global_config_path)?);
            } else {
                tracing::debug!(?global_config_path, "No global config found (layer 1), skipping");
            }
        }

        // Layer 2 - Project config
        let project_config_path = self.project_config_path();
        if project_config_path.is_file() {
            tracing::debug!(?project_config_path, "Loading project config (layer 2)");
            settings.apply(read_layer(&project_config_path)?);
        } else if self.explicit_config.is_some() {
            return Err(Error::ConfigNotFound {
                path: project_config_path,
            });
        }

        Ok(settings)
    }
}

fn read_layer(path: &Path) -> Result<SettingsLayer> {
    let content = fs::read_to_string(path)?;
    SettingsLayer::parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DEFAULT_STANDARD_NAME;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_without_files_gives_defaults() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let resolver =
            ConfigResolver::with_global_config_dir(project.path(), global.path().to_path_buf());

        let settings = resolver.resolve().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_project_layer_overrides_global_layer() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            global.path().join("config.toml"),
            "[api]\norganization = \"global-org\"\nprovider = \"gl\"\n",
        )
        .unwrap();
        fs::write(
            project.path().join(PROJECT_CONFIG_FILE),
            "[api]\norganization = \"project-org\"\n",
        )
        .unwrap();

        let resolver =
            ConfigResolver::with_global_config_dir(project.path(), global.path().to_path_buf());
        let settings = resolver.resolve().unwrap();

        assert_eq!(settings.api.organization.as_deref(), Some("project-org"));
        assert_eq!(settings.api.provider, "gl");
        assert_eq!(settings.standard.name, DEFAULT_STANDARD_NAME);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let resolver =
            ConfigResolver::with_global_config_dir(project.path(), global.path().to_path_buf())
                .with_config_file("custom.toml");

        let result = resolver.resolve();
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(project.path().join(PROJECT_CONFIG_FILE), "[api\n").unwrap();

        let resolver =
            ConfigResolver::with_global_config_dir(project.path(), global.path().to_path_buf());
        assert!(matches!(resolver.resolve(), Err(Error::TomlDe(_))));
    }
}
