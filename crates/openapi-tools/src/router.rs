//! Per-call dispatch: tool name + argument bag → one outbound HTTP request.
//!
//! Arguments whose key names a `{placeholder}` in the path template are substituted
//! percent-encoded (`/` becomes `%2F`). For GET/DELETE/HEAD the rest become query parameters;
//! for every other method they become JSON body fields with their original types.

use crate::tools::{ResolvedOperation, ToolCatalog};
use regex::Regex;
use reqwest::Method;
use rmcp::model::{CallToolResult, Content, JsonObject};
use serde_json::{Map, Value};
use spritz_http_tools::client::{ApiClientError, HttpExecutor};
use spritz_http_tools::display_text;
use spritz_http_tools::response_shaping;
use spritz_http_tools::semantics::is_query_method;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder regex"));

/// The outbound request derived from one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedRequest {
    pub method: Method,
    /// Substituted path, with `?query` appended when any query parameters were collected.
    pub path: String,
    /// `None` when no body fields were collected.
    pub body: Option<Map<String, Value>>,
}

/// Partition `args` into path substitutions, query parameters and body fields.
#[must_use]
pub fn route_request(op: &ResolvedOperation, args: &Map<String, Value>) -> RoutedRequest {
    let placeholders: HashSet<&str> = PLACEHOLDER
        .captures_iter(&op.path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let query_method = is_query_method(&op.method);

    let mut path = op.path.clone();
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut has_query = false;
    let mut body = Map::new();

    for (key, value) in args {
        if placeholders.contains(key.as_str()) {
            path = path.replace(
                &format!("{{{key}}}"),
                &encode_path_segment(&display_text(value)),
            );
        } else if query_method {
            query.append_pair(key, &display_text(value));
            has_query = true;
        } else {
            body.insert(key.clone(), value.clone());
        }
    }

    if has_query {
        path.push('?');
        path.push_str(&query.finish());
    }

    RoutedRequest {
        method: op.method.clone(),
        path,
        body: (!body.is_empty()).then_some(body),
    }
}

/// Dispatches tool calls against one catalog through one executor.
#[derive(Clone)]
pub struct ToolRouter {
    catalog: Arc<ToolCatalog>,
    executor: Arc<dyn HttpExecutor>,
}

impl ToolRouter {
    #[must_use]
    pub fn new(catalog: Arc<ToolCatalog>, executor: Arc<dyn HttpExecutor>) -> Self {
        Self { catalog, executor }
    }

    #[must_use]
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Execute a tool call.
    ///
    /// Never fails: unknown tools and upstream failures come back as error results. Missing
    /// arguments are treated as an empty mapping.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let Some(op) = self.catalog.get(name) else {
            tracing::warn!(tool = name, "unknown tool");
            return error_result(&format!("Unknown tool \"{name}\""));
        };

        let args = arguments.unwrap_or_default();
        let request = route_request(op, &args);
        tracing::debug!(
            tool = name,
            method = %request.method,
            path = %request.path,
            "calling upstream"
        );

        match self
            .executor
            .execute(request.method.clone(), &request.path, request.body)
            .await
        {
            Ok(body) => {
                tracing::debug!(tool = name, "upstream call succeeded");
                let text = response_shaping::render(op.config.format, body.as_ref());
                CallToolResult::success(vec![Content::text(text)])
            }
            Err(e) => {
                tracing::warn!(
                    tool = name,
                    method = %request.method,
                    path = %request.path,
                    error = %e,
                    "upstream call failed"
                );
                error_result(&failure_message(&e))
            }
        }
    }
}

// A failure without a description reads as "Unknown error".
fn failure_message(e: &ApiClientError) -> String {
    match e {
        ApiClientError::Config(m) | ApiClientError::Transport(m) | ApiClientError::Decode(m)
            if m.trim().is_empty() =>
        {
            ApiClientError::Unknown.to_string()
        }
        other => other.to_string(),
    }
}

fn error_result(message: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {message}"))])
}

/// Percent-encode everything outside the `encodeURIComponent` unreserved set.
fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_component_safe(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn is_component_safe(b: u8) -> bool {
    matches!(
        b,
        b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')'
    )
}
