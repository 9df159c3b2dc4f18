//! Error types for sonar-sync-core

use std::path::PathBuf;

/// Result type for sonar-sync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sonar-sync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Explicitly requested configuration file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// SonarQube rule export does not exist
    #[error("XML file not found: {path}")]
    RulesFileNotFound { path: PathBuf },

    /// The rule export is not well-formed XML
    #[error("Error parsing XML file at byte {position}: {message}")]
    Xml { message: String, position: u64 },

    /// No API token could be resolved from any source
    #[error(
        "Codacy API token is required. Set it via:\n  \
         1. --api-token argument\n  \
         2. CODACY_API_TOKEN environment variable\n  \
         3. CODACY_API_TOKEN in .env file"
    )]
    MissingToken,

    /// The API token contains characters that cannot be sent in a header
    #[error("API token contains characters that are not valid in an HTTP header")]
    InvalidToken,

    /// An organization-scoped endpoint was called without an organization
    #[error("An organization is required (use --organization or set api.organization)")]
    MissingOrganization,

    /// The configured base URL cannot carry path segments
    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },

    /// The remote API answered with a non-success status
    #[error("HTTP {status} from {url}: {body}")]
    Api { status: u16, url: String, body: String },

    /// Transport-level HTTP failure (connect, timeout, decoding)
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Build an `Xml` error from a quick-xml failure at the given reader position
    pub(crate) fn xml(err: impl std::fmt::Display, position: u64) -> Self {
        Self::Xml {
            message: err.to_string(),
            position,
        }
    }
}
