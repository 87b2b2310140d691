//! Authenticated HTTP client for the upstream API.
//!
//! The request router only knows about [`HttpExecutor`]: one method, one outbound call. The
//! production implementation, [`ApiClient`], injects the bearer credential, sends JSON bodies and
//! turns non-2xx responses into [`ApiClientError::Status`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("config error: {0}")]
    Config(String),

    /// The upstream answered with a non-success status.
    #[error("API error: {status} {reason} - {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Decode(String),

    /// A failure that carries no usable description.
    #[error("Unknown error")]
    Unknown,
}

pub type Result<T> = std::result::Result<T, ApiClientError>;

impl From<reqwest::Error> for ApiClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

/// Executes one outbound HTTP call.
///
/// `path` already carries any percent-encoded path segments and query string. `Ok(None)` means
/// the call succeeded without a response body.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Map<String, Value>>,
    ) -> Result<Option<Value>>;
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Build a client for the given base URL and credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the base URL is not an absolute http(s) URL.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ApiClientError::Config("API key must not be empty".to_string()));
        }

        let parsed = Url::parse(&config.base_url).map_err(|e| {
            ApiClientError::Config(format!("Invalid baseUrl '{}': {e}", config.base_url))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ApiClientError::Config(format!(
                "Invalid baseUrl '{}': unsupported scheme '{}'",
                config.base_url,
                parsed.scheme()
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            timeout: config.timeout,
        })
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        Url::parse(&joined).map_err(|e| ApiClientError::Config(format!("Invalid URL: {e}")))
    }
}

#[async_trait]
impl HttpExecutor for ApiClient {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Map<String, Value>>,
    ) -> Result<Option<Value>> {
        let url = self.build_url(path)?;

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(body) = body.as_ref() {
            request = request.json(body);
        }
        if let Some(t) = self.timeout {
            request = request.timeout(t);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), path, "upstream response");
        let text = response
            .text()
            .await
            .map_err(|e| ApiClientError::Decode(sanitize_reqwest_error(&e)))?;

        if !status.is_success() {
            return Err(ApiClientError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        // Non-JSON success bodies are passed through as a string.
        Ok(Some(
            serde_json::from_str(&text).unwrap_or(Value::String(text)),
        ))
    }
}

/// Render a reqwest error without leaking the query string (it may carry user data).
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        let mut redacted = u.clone();
        redacted.set_query(None);
        redacted.set_fragment(None);
        msg = msg.replace(u.as_str(), redacted.as_str());
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::routing::{any, get};
    use serde_json::json;
    use spritz_test_support::spawn_router;

    fn client_for(base_url: String) -> ApiClient {
        ApiClient::new(ApiClientConfig {
            base_url,
            api_key: "test-api-key".to_string(),
            timeout: Some(Duration::from_secs(10)),
        })
        .expect("valid client config")
    }

    #[test]
    fn rejects_empty_api_key_and_bad_base_url() {
        let empty_key = ApiClient::new(ApiClientConfig {
            base_url: "https://api.example.com".to_string(),
            api_key: "  ".to_string(),
            timeout: None,
        });
        assert!(matches!(empty_key, Err(ApiClientError::Config(_))));

        let bad_url = ApiClient::new(ApiClientConfig {
            base_url: "ftp://api.example.com".to_string(),
            api_key: "k".to_string(),
            timeout: None,
        });
        assert!(matches!(bad_url, Err(ApiClientError::Config(_))));
    }

    #[test]
    fn status_error_message_carries_code_and_reason() {
        let err = ApiClientError::Status {
            status: 401,
            reason: "Unauthorized".to_string(),
            body: "Invalid token".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 Unauthorized - Invalid token");
    }

    #[tokio::test]
    async fn sends_bearer_auth_and_json_body() {
        async fn echo(
            method: axum::http::Method,
            uri: Uri,
            headers: HeaderMap,
            body: Bytes,
        ) -> axum::Json<Value> {
            axum::Json(json!({
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query().unwrap_or(""),
                "authorization": headers.get("authorization").and_then(|v| v.to_str().ok()),
                "contentType": headers.get("content-type").and_then(|v| v.to_str().ok()),
                "body": String::from_utf8_lossy(&body),
            }))
        }

        let server = spawn_router(Router::new().route("/{*path}", any(echo)))
            .await
            .expect("spawn echo server");
        let client = client_for(format!("{}/", server.base_url()));

        let mut body = Map::new();
        body.insert("amount".to_string(), json!("100.00"));
        body.insert("count".to_string(), json!(2));

        let echoed = client
            .execute(Method::POST, "/v1/quotes?x=1", Some(body))
            .await
            .expect("execute")
            .expect("json body");

        assert_eq!(echoed["method"], "POST");
        assert_eq!(echoed["path"], "/v1/quotes");
        assert_eq!(echoed["query"], "x=1");
        assert_eq!(echoed["authorization"], "Bearer test-api-key");
        assert_eq!(echoed["contentType"], "application/json");
        let sent: Value =
            serde_json::from_str(echoed["body"].as_str().unwrap_or_default()).expect("body json");
        assert_eq!(sent, json!({ "amount": "100.00", "count": 2 }));
    }

    #[tokio::test]
    async fn preserves_encoded_path_segments() {
        async fn echo_path(uri: Uri) -> String {
            uri.path().to_string()
        }

        let server = spawn_router(Router::new().route("/{*path}", any(echo_path)))
            .await
            .expect("spawn echo server");
        let client = client_for(server.base_url().to_string());

        let got = client
            .execute(Method::GET, "/v1/bank-accounts/ba_abc%2F123", None)
            .await
            .expect("execute");
        assert_eq!(got, Some(json!("/v1/bank-accounts/ba_abc%2F123")));
    }

    #[tokio::test]
    async fn maps_non_success_to_status_error() {
        async fn unauthorized() -> (StatusCode, &'static str) {
            (StatusCode::UNAUTHORIZED, "Invalid token")
        }

        let server = spawn_router(Router::new().route("/v1/me", get(unauthorized)))
            .await
            .expect("spawn server");
        let client = client_for(server.base_url().to_string());

        let err = client
            .execute(Method::GET, "/v1/me", None)
            .await
            .expect_err("401 must fail");
        match &err {
            ApiClientError::Status { status, reason, body } => {
                assert_eq!(*status, 401);
                assert_eq!(reason, "Unauthorized");
                assert_eq!(body, "Invalid token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("401 Unauthorized"));
    }

    #[tokio::test]
    async fn empty_success_body_is_no_content() {
        async fn no_content() -> StatusCode {
            StatusCode::NO_CONTENT
        }

        let server = spawn_router(Router::new().route("/v1/things/1", any(no_content)))
            .await
            .expect("spawn server");
        let client = client_for(server.base_url().to_string());

        let got = client
            .execute(Method::DELETE, "/v1/things/1", None)
            .await
            .expect("execute");
        assert_eq!(got, None);
    }
}
