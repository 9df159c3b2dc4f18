//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sonar_sync_core::config::{ApiLayer, SettingsLayer, SonarLayer, StandardLayer, TOKEN_ENV_VAR};

/// sonar-sync - Keep Codacy coding standards in line with a SonarQube rule export
#[derive(Parser, Debug)]
#[command(name = "sonar-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every command; they override configuration files
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Codacy API token
    #[arg(long, global = true, env = TOKEN_ENV_VAR, hide_env_values = true)]
    pub api_token: Option<String>,

    /// SonarQube quality-profile export
    #[arg(long, global = true, value_name = "PATH")]
    pub xml_file: Option<PathBuf>,

    /// Codacy organization name
    #[arg(long, global = true)]
    pub organization: Option<String>,

    /// Git provider of the organization (gh, gl, bb)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Codacy API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Configuration file used instead of ./sonar-sync.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// The flag values as the topmost settings layer
    pub fn layer(&self) -> SettingsLayer {
        SettingsLayer {
            api: ApiLayer {
                base_url: self.base_url.clone(),
                provider: self.provider.clone(),
                organization: self.organization.clone(),
                timeout_secs: None,
            },
            sonar: SonarLayer {
                xml_file: self.xml_file.clone(),
                ..SonarLayer::default()
            },
            standard: StandardLayer::default(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compare the XML rules with every pattern of the SonarC# catalog
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show which XML rules are missing from the catalog and how many
    /// catalog patterns are not in the XML
    Defaults {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Compare the XML rules with the patterns enabled in a coding standard
    Verify {
        /// Coding standard to inspect
        #[arg(long)]
        standard_id: u64,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create a coding standard enabling exactly the XML rules
    ///
    /// Writes skipped_rules_<timestamp>.json and
    /// enabled_patterns_<timestamp>.json into the output directory.
    ///
    /// Examples:
    ///   sonar-sync import --organization acme
    ///   sonar-sync import --standard-name "Acme C#" --output-dir reports
    ///   sonar-sync import --dry-run
    Import {
        /// Name of the new standard (made unique if taken)
        #[arg(long)]
        standard_name: Option<String>,

        /// Directory receiving the JSON reports
        #[arg(long, default_value = ".", value_name = "DIR")]
        output_dir: PathBuf,

        /// Print the plan without changing anything remotely
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create a throwaway standard and report its enabled tool and pattern
    /// counts before and after disabling every tool
    ProbeDefaults {
        /// Name of the standard to create
        #[arg(long, default_value = "Minimal Test")]
        standard_name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
