//! Loading the raw `OpenAPI` document.
//!
//! The document is kept as an untyped JSON value: the indexer only needs a handful of fields and
//! must tolerate shapes a strict model would reject. Local `$ref`s (`#/components/...`) are
//! followed on demand through [`SpecDocument::resolve_ref`]; external refs are left as-is.

use crate::config::{HashPolicy, SpecSource};
use crate::error::{OpenApiToolsError, Result};
use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};
use spritz_http_tools::client::sanitize_reqwest_error;
use std::collections::HashSet;
use url::Url;

#[derive(Debug, Clone)]
pub struct SpecDocument {
    root: Value,
}

impl SpecDocument {
    #[must_use]
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse a JSON or YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is neither valid JSON nor valid YAML.
    pub fn parse(content: &str, location: &str) -> Result<Self> {
        if let Ok(root) = serde_json::from_str::<Value>(content) {
            return Ok(Self { root });
        }

        // Round-trip through the YAML value so integer keys (`200:`) become strings.
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| OpenApiToolsError::SpecParse {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        let root = serde_json::to_value(yaml).map_err(|e| OpenApiToolsError::SpecParse {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    /// Read the spec from a file or `http(s)` URL, verify its pin, and parse it.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec cannot be read or fetched, fails a `fail`-policy hash check,
    /// or cannot be parsed.
    pub async fn load(source: &SpecSource, client: &Client) -> Result<Self> {
        let content = if is_url(&source.location) {
            tracing::info!("Fetching OpenAPI spec from {}", source.location);
            fetch(&source.location, client).await?
        } else {
            tracing::info!("Loading OpenAPI spec from {}", source.location);
            tokio::fs::read_to_string(&source.location)
                .await
                .map_err(|e| OpenApiToolsError::SpecReadFile {
                    path: source.location.clone(),
                    source: e,
                })?
        };

        verify_hash(source, &content)?;
        Self::parse(&content, &source.location)
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Follow a chain of local `$ref`s starting at `value`.
    ///
    /// Returns the last fragment reached. A missing target, an external ref or a cycle stops the
    /// walk at the fragment that carries the unresolvable `$ref`.
    #[must_use]
    pub fn resolve_ref<'a>(&'a self, value: &'a Value) -> &'a Value {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = value;

        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            let Some(pointer) = reference.strip_prefix('#') else {
                break;
            };
            if !seen.insert(reference) {
                tracing::debug!(reference, "cyclic $ref, keeping fragment as-is");
                break;
            }
            match self.root.pointer(pointer) {
                Some(next) => current = next,
                None => {
                    tracing::debug!(reference, "unresolved $ref, keeping fragment as-is");
                    break;
                }
            }
        }

        current
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

async fn fetch(location: &str, client: &Client) -> Result<String> {
    let url = Url::parse(location).map_err(|e| {
        OpenApiToolsError::Request(format!("Invalid OpenAPI spec URL '{location}': {e}"))
    })?;

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| OpenApiToolsError::SpecFetch {
            url: location.to_string(),
            message: sanitize_reqwest_error(&e),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(OpenApiToolsError::SpecFetch {
            url: location.to_string(),
            message: format!("HTTP {status}"),
        });
    }

    resp.text().await.map_err(|e| OpenApiToolsError::SpecFetch {
        url: location.to_string(),
        message: sanitize_reqwest_error(&e),
    })
}

/// Compare the document bytes against the configured `sha256:<hex>` pin.
///
/// # Errors
///
/// Returns [`OpenApiToolsError::SpecHashMismatch`] only under [`HashPolicy::Fail`].
pub fn verify_hash(source: &SpecSource, content: &str) -> Result<()> {
    let Some(expected) = source.hash.as_deref() else {
        return Ok(());
    };
    if source.hash_policy == HashPolicy::Ignore {
        return Ok(());
    }

    let actual = content_hash(content);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        return Ok(());
    }

    match source.hash_policy {
        HashPolicy::Fail => Err(OpenApiToolsError::SpecHashMismatch {
            expected: expected.to_string(),
            actual,
        }),
        HashPolicy::Warn => {
            tracing::warn!(
                "Spec hash mismatch for '{}'. Expected: {}, Got: {}",
                source.location,
                expected,
                actual
            );
            Ok(())
        }
        HashPolicy::Ignore => Ok(()),
    }
}

/// `sha256:<lowercase hex>` of the raw document.
#[must_use]
pub fn content_hash(content: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(content.as_bytes())))
}
