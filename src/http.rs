//! Authenticated JSON-over-HTTPS request executor shared by the service clients

use crate::error::{Result, ToolsError};
use crate::logging::log_error;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Credentials attached to every request as the `Authorization` header
#[derive(Clone, PartialEq)]
pub enum Auth {
    Bearer(String),
    Basic { email: String, token: String },
}

impl Auth {
    /// Basic auth when an email is supplied, bearer token otherwise
    pub fn from_credentials(token: impl Into<String>, email: Option<&str>) -> Self {
        match email.filter(|e| !e.is_empty()) {
            Some(email) => Auth::Basic {
                email: email.to_string(),
                token: token.into(),
            },
            None => Auth::Bearer(token.into()),
        }
    }

    pub fn header_value(&self) -> Result<HeaderValue> {
        let raw = match self {
            Auth::Bearer(token) => format!("Bearer {}", token),
            Auth::Basic { email, token } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", email, token)))
            }
        };

        let mut value = HeaderValue::from_str(&raw)
            .map_err(|e| ToolsError::Config(format!("invalid auth header value: {}", e)))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Auth::Bearer(***)"),
            Auth::Basic { email, .. } => write!(f, "Auth::Basic({}, ***)", email),
        }
    }
}

/// Issues authenticated calls against one service and decodes JSON replies.
///
/// A call fails when the transport fails, the status is not 2xx, or the
/// configured success flag (Slack's `ok`) is false. No retry is attempted.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    service: &'static str,
    success_flag: Option<&'static str>,
}

impl ApiClient {
    pub fn new(service: &'static str, base_url: &str, auth: &Auth, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth.header_value()?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            service,
            success_flag: None,
        })
    }

    /// Treat a payload whose `flag` field is not `true` as a failed call
    pub fn with_success_flag(mut self, flag: &'static str) -> Self {
        self.success_flag = Some(flag);
        self
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ToolsError::InvalidArgument(format!("invalid endpoint {}: {}", path, e)))
    }

    /// `base_url` plus each segment percent-encoded, so `/`, `?` and `#` stay inside it
    fn segment_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ToolsError::InvalidArgument(format!(
                "invalid path segment {:?}",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ToolsError::Config(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    /// GET where some path segments come from callers, e.g. `["content", page_id]`
    pub async fn get_segments(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value> {
        let operation = segments.join("/");
        let url = self
            .segment_url(segments)
            .map_err(|e| self.fail(&operation, e))?;
        self.send(Method::GET, url, &operation, query, None).await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(path)?;
        self.send(method, url, path, query, body).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!(
            service = self.service,
            method = %method,
            url = %url,
            params = ?query,
            "API request"
        );

        let mut request = self.http.request(method, url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.fail(path, ToolsError::from(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.fail(path, ToolsError::from(e)))?;

        if !status.is_success() {
            let message = if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, preview(&text))
            };
            return Err(self.fail(path, ToolsError::service(self.service, message)));
        }

        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            self.fail(
                path,
                ToolsError::Decode(format!("{} (body preview: {:?})", e, preview(&text))),
            )
        })?;

        if let Some(flag) = self.success_flag {
            if payload.get(flag).and_then(Value::as_bool) != Some(true) {
                let message = payload
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string();
                return Err(self.fail(path, ToolsError::service(self.service, message)));
            }
        }

        Ok(payload)
    }

    fn fail(&self, operation: &str, error: ToolsError) -> ToolsError {
        log_error(self.service, operation, &error);
        error
    }
}

/// Ensure the base URL ends with `/` so relative endpoints join beneath it
fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{}/", trimmed))
        .map_err(|e| ToolsError::Config(format!("invalid base URL {}: {}", raw, e)))
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_prefers_basic_with_email() {
        let auth = Auth::from_credentials("tok", Some("ops@acme.io"));
        assert!(matches!(auth, Auth::Basic { .. }));

        // base64("ops@acme.io:tok")
        let header = auth.header_value().unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic b3BzQGFjbWUuaW86dG9r");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_auth_bearer_without_email() {
        assert_eq!(Auth::from_credentials("tok", None), Auth::Bearer("tok".to_string()));
        assert_eq!(Auth::from_credentials("tok", Some("")), Auth::Bearer("tok".to_string()));
        assert_eq!(
            Auth::Bearer("tok".to_string()).header_value().unwrap().to_str().unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn test_auth_debug_hides_token() {
        let auth = Auth::from_credentials("secret", Some("ops@acme.io"));
        assert!(!format!("{:?}", auth).contains("secret"));
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = ApiClient::new(
            "Confluence",
            "https://acme.atlassian.net/wiki/rest/api",
            &Auth::Bearer("tok".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.url("/content/search").unwrap().as_str(),
            "https://acme.atlassian.net/wiki/rest/api/content/search"
        );
        assert_eq!(
            client.url("content/123").unwrap().as_str(),
            "https://acme.atlassian.net/wiki/rest/api/content/123"
        );
    }

    #[test]
    fn test_segments_stay_under_base_path() {
        let client = ApiClient::new(
            "Confluence",
            "https://acme.atlassian.net/wiki/rest/api",
            &Auth::Bearer("tok".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.segment_url(&["content", "123"]).unwrap().as_str(),
            "https://acme.atlassian.net/wiki/rest/api/content/123"
        );
        assert_eq!(
            client.segment_url(&["content", "../../admin?x=1#y"]).unwrap().as_str(),
            "https://acme.atlassian.net/wiki/rest/api/content/..%2F..%2Fadmin%3Fx=1%23y"
        );
        for bad in ["", ".", ".."] {
            assert!(matches!(
                client.segment_url(&["content", bad]),
                Err(ToolsError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::new(
            "Slack",
            "not a url",
            &Auth::Bearer("tok".to_string()),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(ToolsError::Config(_))));
    }
}
