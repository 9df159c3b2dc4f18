//! Configuration for sonar-sync
//!
//! - [`Settings`]: resolved values (API endpoint, Sonar tool mapping, standard)
//! - [`ConfigResolver`]: layered TOML loading
//! - [`ApiToken`]: token discovery from flags, environment and `.env`

mod resolver;
mod settings;
mod token;

pub use resolver::{ConfigResolver, PROJECT_CONFIG_FILE};
pub use settings::{
    ApiLayer, ApiSettings, DEFAULT_BASE_URL, DEFAULT_PATTERN_PREFIX, DEFAULT_PROVIDER,
    DEFAULT_STANDARD_NAME, DEFAULT_TIMEOUT_SECS, DEFAULT_XML_FILE, SONAR_CSHARP_TOOL_NAME,
    SONAR_CSHARP_TOOL_UUID, Settings, SettingsLayer, SonarLayer, SonarSettings, StandardLayer,
    StandardSettings,
};
pub use token::{ApiToken, DOTENV_FILE, TOKEN_ENV_VAR, load_dotenv, parse_dotenv, resolve_token};
