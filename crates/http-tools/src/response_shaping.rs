//! Response shaping for tool output.
//!
//! API responses are handed back to the agent as text. JSON is faithful but verbose, so list-like
//! payloads can instead be rendered as a compact comma-separated table:
//! - nested objects are flattened into dot-delimited columns (`payout.amount`)
//! - the header is the union of keys across rows, in first-seen order
//! - paginated envelopes (`{ data: [...], hasMore, nextCursor }`) get a metadata footer

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker rendered for an empty list (or an object with nothing to show).
pub const EMPTY_MARKER: &str = "(empty)";

/// Marker rendered when the upstream call succeeded without a body.
pub const NO_CONTENT_MARKER: &str = "(no content)";

const FOOTER_SEPARATOR: &str = "---";
const PAGINATION_KEYS: [&str; 2] = ["hasMore", "nextCursor"];

/// How a successful tool result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Pretty-printed JSON (2-space indentation).
    Json,
    /// Flattened comma-separated table.
    Csv,
}

/// Render a successful response body according to `format`.
///
/// `None` means the upstream returned no content. An absent format hint renders JSON.
#[must_use]
pub fn render(format: Option<ResponseFormat>, body: Option<&Value>) -> String {
    let Some(body) = body else {
        return NO_CONTENT_MARKER.to_string();
    };

    match format {
        Some(ResponseFormat::Csv) => format_table(body),
        Some(ResponseFormat::Json) | None => to_pretty_json(body),
    }
}

/// Pretty-print a JSON value.
#[must_use]
pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render an arbitrary JSON value as a compact table.
///
/// Scalars (including `null`) fall back to their JSON literal.
#[must_use]
pub fn format_table(value: &Value) -> String {
    match value {
        Value::Array(items) => items_table(items),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(items)) => paginated_table(obj, items),
            _ => {
                let row = flatten(obj);
                if row.is_empty() {
                    return EMPTY_MARKER.to_string();
                }
                rows_to_table(&[row])
            }
        },
        scalar => scalar.to_string(),
    }
}

fn paginated_table(envelope: &Map<String, Value>, items: &[Value]) -> String {
    let table = items_table(items);

    let footer: Vec<String> = PAGINATION_KEYS
        .iter()
        .filter_map(|key| {
            envelope
                .get(*key)
                .map(|v| format!("{key}: {}", footer_value(v)))
        })
        .collect();

    if footer.is_empty() {
        table
    } else {
        format!("{table}\n{FOOTER_SEPARATOR}\n{}", footer.join("\n"))
    }
}

fn footer_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn items_table(items: &[Value]) -> String {
    if items.is_empty() {
        return EMPTY_MARKER.to_string();
    }

    let rows: Vec<Vec<(String, String)>> = items
        .iter()
        .map(|item| match item {
            Value::Object(obj) => flatten(obj),
            other => vec![("value".to_string(), cell_text(other))],
        })
        .collect();

    rows_to_table(&rows)
}

/// Flatten nested objects into dot-delimited keys, keeping field order.
///
/// Arrays are not descended into; they render as compact JSON in a single cell.
fn flatten(obj: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(obj, "", &mut out);
    out
}

fn flatten_into(obj: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &path, out),
            other => {
                let text = cell_text(other);
                // A later key that flattens to the same column replaces the earlier value.
                match out.iter_mut().find(|(k, _)| *k == path) {
                    Some(slot) => slot.1 = text,
                    None => out.push((path, text)),
                }
            }
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => display_text(other),
    }
}

/// Plain-text form of a JSON value.
///
/// Strings are raw, numbers and booleans literal, `null` is `null`. Array elements are joined
/// with `,` (a `null` element contributes nothing). Objects fall back to compact JSON.
#[must_use]
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn rows_to_table(rows: &[Vec<(String, String)>]) -> String {
    let mut headers: Vec<&str> = Vec::new();
    for row in rows {
        for (key, _) in row {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in rows {
        let line = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map_or_else(String::new, |(_, v)| escape_field(v))
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
