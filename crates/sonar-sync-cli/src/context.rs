//! Per-invocation command context
//!
//! Resolves settings once (config files, then flags) and hands out what the
//! commands need: the rule export, the API client and the organization.

use std::path::{Path, PathBuf};

use sonar_sync_core::config::{ApiToken, ConfigResolver, Settings};
use sonar_sync_core::rules::{RuleSet, load_rules};
use sonar_sync_core::{Error, HttpCodacyClient, PatternPrefix};

use crate::cli::GlobalArgs;
use crate::error::Result;

pub struct CommandContext {
    root: PathBuf,
    settings: Settings,
    api_token: Option<String>,
}

impl CommandContext {
    /// Build the context for a run started in `root`
    pub fn from_args(root: &Path, args: &GlobalArgs) -> Result<Self> {
        Self::with_resolver(ConfigResolver::new(root), root, args)
    }

    /// Like [`from_args`](Self::from_args), reading the global layer from
    /// `global_config_dir` instead of the platform config directory
    pub fn from_args_with_global_dir(
        root: &Path,
        global_config_dir: PathBuf,
        args: &GlobalArgs,
    ) -> Result<Self> {
        Self::with_resolver(
            ConfigResolver::with_global_config_dir(root, global_config_dir),
            root,
            args,
        )
    }

    fn with_resolver(mut resolver: ConfigResolver, root: &Path, args: &GlobalArgs) -> Result<Self> {
        if let Some(config) = &args.config {
            resolver = resolver.with_config_file(config);
        }
        let mut settings = resolver.resolve()?;
        settings.apply(args.layer());

        tracing::debug!(?settings, "Resolved settings");
        Ok(Self {
            root: root.to_path_buf(),
            settings,
            api_token: args.api_token.clone(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prefix(&self) -> PatternPrefix {
        PatternPrefix::new(self.settings.sonar.pattern_prefix.clone())
    }

    /// `path` relative to the working directory unless already absolute
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn load_rules(&self) -> Result<RuleSet> {
        let path = self.resolve_path(&self.settings.sonar.xml_file);
        Ok(load_rules(&path)?)
    }

    pub fn organization(&self) -> Result<&str> {
        Ok(self
            .settings
            .api
            .organization
            .as_deref()
            .ok_or(Error::MissingOrganization)?)
    }

    /// HTTP client authenticated with the discovered token
    pub fn client(&self) -> Result<HttpCodacyClient> {
        let token = ApiToken::discover(self.api_token.as_deref(), &self.root)?;
        Ok(HttpCodacyClient::new(&self.settings.api, &token)?)
    }
}
