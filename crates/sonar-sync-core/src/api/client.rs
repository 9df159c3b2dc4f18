//! Blocking reqwest implementation of [`CodacyApi`]

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use super::pagination::collect_pages;
use super::types::{
    CodingStandard, CodingStandardTool, Envelope, NewCodingStandard, Page, Pattern, StandardId,
    Tool, ToolUpdate,
};
use super::CodacyApi;
use crate::config::{ApiSettings, ApiToken};
use crate::{Error, Result};

const API_TOKEN_HEADER: &str = "api-token";

/// HTTP client for the Codacy v3 API
///
/// Sends the static `api-token`, `Accept` and `Content-Type` headers with
/// every request. Requests are never retried; any non-2xx status becomes
/// [`Error::Api`].
#[derive(Debug, Clone)]
pub struct HttpCodacyClient {
    http: Client,
    base_url: Url,
    provider: String,
    organization: Option<String>,
}

impl HttpCodacyClient {
    pub fn new(settings: &ApiSettings, token: &ApiToken) -> Result<Self> {
        let invalid = || Error::InvalidBaseUrl {
            url: settings.base_url.clone(),
        };
        let base_url = Url::parse(&settings.base_url).map_err(|_| invalid())?;
        if base_url.cannot_be_a_base() {
            return Err(invalid());
        }

        let http = Client::builder()
            .default_headers(default_headers(token)?)
            .timeout(settings.timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base_url,
            provider: settings.provider.clone(),
            organization: settings.organization.clone(),
        })
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Base URL with `segments` appended, each percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/organizations/{provider}/{org}/coding-standards/{rest...}`
    pub fn coding_standards_endpoint(&self, rest: &[&str]) -> Result<Url> {
        let organization = self
            .organization
            .as_deref()
            .ok_or(Error::MissingOrganization)?;
        let mut segments = vec![
            "organizations",
            self.provider.as_str(),
            organization,
            "coding-standards",
        ];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn execute(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::debug!(%url, status = status.as_u16(), "Codacy API request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.execute(self.http.get(url.clone()), &url)?;
        Ok(response.json()?)
    }

    fn get_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        collect_pages(|cursor| {
            let mut page_url = url.clone();
            if let Some(cursor) = cursor {
                page_url.query_pairs_mut().append_pair("cursor", cursor);
            }
            self.get_json::<Page<T>>(page_url)
        })
    }
}

fn default_headers(token: &ApiToken) -> Result<HeaderMap> {
    let mut token_value =
        HeaderValue::from_str(token.expose()).map_err(|_| Error::InvalidToken)?;
    token_value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(API_TOKEN_HEADER), token_value);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

impl CodacyApi for HttpCodacyClient {
    fn list_tools(&self) -> Result<Vec<Tool>> {
        self.get_all(self.endpoint(&["tools"])?)
    }

    fn list_tool_patterns(&self, tool_uuid: &str) -> Result<Vec<Pattern>> {
        self.get_all(self.endpoint(&["tools", tool_uuid, "patterns"])?)
    }

    fn list_coding_standards(&self) -> Result<Vec<CodingStandard>> {
        self.get_all(self.coding_standards_endpoint(&[])?)
    }

    fn create_coding_standard(&self, request: &NewCodingStandard) -> Result<CodingStandard> {
        let url = self.coding_standards_endpoint(&[])?;
        tracing::debug!(%url, name = %request.name, "POST");
        let response = self.execute(self.http.post(url.clone()).json(request), &url)?;
        let created: Envelope<CodingStandard> = response.json()?;
        Ok(created.data)
    }

    fn list_coding_standard_tools(&self, standard_id: StandardId) -> Result<Vec<CodingStandardTool>> {
        let id = standard_id.to_string();
        self.get_all(self.coding_standards_endpoint(&[&id, "tools"])?)
    }

    fn get_coding_standard_tool(
        &self,
        standard_id: StandardId,
        tool_uuid: &str,
    ) -> Result<CodingStandardTool> {
        let id = standard_id.to_string();
        let url = self.coding_standards_endpoint(&[&id, "tools", tool_uuid])?;
        let tool: Envelope<CodingStandardTool> = self.get_json(url)?;
        Ok(tool.data)
    }

    fn update_coding_standard_tool(
        &self,
        standard_id: StandardId,
        tool_uuid: &str,
        update: &ToolUpdate,
    ) -> Result<()> {
        let id = standard_id.to_string();
        let url = self.coding_standards_endpoint(&[&id, "tools", tool_uuid])?;
        tracing::debug!(%url, enabled = update.enabled, patterns = update.patterns.len(), "PATCH");
        self.execute(self.http.patch(url.clone()).json(update), &url)?;
        Ok(())
    }

    fn promote_coding_standard(&self, standard_id: StandardId) -> Result<()> {
        let id = standard_id.to_string();
        let url = self.coding_standards_endpoint(&[&id, "promote"])?;
        tracing::debug!(%url, "POST");
        self.execute(self.http.post(url.clone()), &url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(organization: Option<&str>) -> HttpCodacyClient {
        let settings = ApiSettings {
            organization: organization.map(str::to_string),
            ..ApiSettings::default()
        };
        HttpCodacyClient::new(&settings, &ApiToken::new("token")).unwrap()
    }

    #[test]
    fn test_tool_patterns_endpoint() {
        let url = client(None)
            .endpoint(&["tools", "8954dff3-f19c-429c-ac76-c45fa5e73b62", "patterns"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://app.codacy.com/api/v3/tools/8954dff3-f19c-429c-ac76-c45fa5e73b62/patterns"
        );
    }

    #[test]
    fn test_organization_is_percent_encoded() {
        let url = client(Some("acme corp/eu"))
            .coding_standards_endpoint(&["42", "promote"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://app.codacy.com/api/v3/organizations/gh/acme%20corp%2Feu/coding-standards/42/promote"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let settings = ApiSettings {
            base_url: "https://codacy.example.com/api/v3/".to_string(),
            ..ApiSettings::default()
        };
        let client = HttpCodacyClient::new(&settings, &ApiToken::new("token")).unwrap();
        assert_eq!(
            client.endpoint(&["tools"]).unwrap().as_str(),
            "https://codacy.example.com/api/v3/tools"
        );
    }

    #[test]
    fn test_organization_required_for_coding_standards() {
        let result = client(None).coding_standards_endpoint(&[]);
        assert!(matches!(result, Err(Error::MissingOrganization)));
    }

    #[test]
    fn test_invalid_base_url() {
        let settings = ApiSettings {
            base_url: "mailto:someone@example.com".to_string(),
            ..ApiSettings::default()
        };
        let result = HttpCodacyClient::new(&settings, &ApiToken::new("token"));
        assert!(matches!(result, Err(Error::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let result = HttpCodacyClient::new(&ApiSettings::default(), &ApiToken::new("abc\ndef"));
        assert!(matches!(result, Err(Error::InvalidToken)));
    }
}
