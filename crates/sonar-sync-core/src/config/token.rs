//! API token discovery
//!
//! Priority: command-line argument > `CODACY_API_TOKEN` environment variable >
//! `CODACY_API_TOKEN` in a `.env` file. The process environment is only read.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::{Error, Result};

pub const TOKEN_ENV_VAR: &str = "CODACY_API_TOKEN";
pub const DOTENV_FILE: &str = ".env";

/// A Codacy API token; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Resolve the token for a run started in `dir`
    pub fn discover(cli_token: Option<&str>, dir: &Path) -> Result<Self> {
        let env_token = std::env::var(TOKEN_ENV_VAR).ok();
        let dotenv = load_dotenv(&dir.join(DOTENV_FILE))?;
        resolve_token(cli_token, env_token.as_deref(), &dotenv)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Pick the first non-blank token in priority order
pub fn resolve_token(
    cli_token: Option<&str>,
    env_token: Option<&str>,
    dotenv: &BTreeMap<String, String>,
) -> Result<ApiToken> {
    let dotenv_token = dotenv.get(TOKEN_ENV_VAR).map(String::as_str);

    [cli_token, env_token, dotenv_token]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(ApiToken::new)
        .ok_or(Error::MissingToken)
}

/// Read a `.env` file; a missing file yields an empty map
pub fn load_dotenv(path: &Path) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Ok(parse_dotenv(&content))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments
pub fn parse_dotenv(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dotenv_with(token: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(TOKEN_ENV_VAR.to_string(), token.to_string())])
    }

    #[rstest]
    #[case(Some("cli"), Some("env"), "dotenv", "cli")]
    #[case(None, Some("env"), "dotenv", "env")]
    #[case(None, None, "dotenv", "dotenv")]
    #[case(Some("  "), Some("env"), "dotenv", "env")]
    fn test_token_priority(
        #[case] cli: Option<&str>,
        #[case] env: Option<&str>,
        #[case] dotenv: &str,
        #[case] expected: &str,
    ) {
        let token = resolve_token(cli, env, &dotenv_with(dotenv)).unwrap();
        assert_eq!(token.expose(), expected);
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let result = resolve_token(None, None, &BTreeMap::new());
        assert!(matches!(result, Err(Error::MissingToken)));
    }

    #[test]
    fn test_missing_token_message_lists_sources() {
        let message = Error::MissingToken.to_string();
        assert!(message.contains("--api-token"));
        assert!(message.contains("CODACY_API_TOKEN environment variable"));
        assert!(message.contains(".env"));
    }

    #[test]
    fn test_parse_dotenv() {
        let parsed = parse_dotenv(
            "# Codacy\n\nCODACY_API_TOKEN = abc123\nexport OTHER=\"quoted value\"\nBROKEN LINE\nURL=a=b\n",
        );
        assert_eq!(parsed["CODACY_API_TOKEN"], "abc123");
        assert_eq!(parsed["OTHER"], "quoted value");
        assert_eq!(parsed["URL"], "a=b");
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_load_missing_dotenv_is_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(load_dotenv(&temp.path().join(".env")).unwrap().is_empty());
    }

    #[test]
    fn test_debug_hides_token() {
        let token = ApiToken::new("secret");
        assert_eq!(format!("{:?}", token), "ApiToken(***)");
    }
}
