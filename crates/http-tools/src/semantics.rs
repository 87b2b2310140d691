//! MCP behaviour hints derived from HTTP method semantics.

use reqwest::Method;
use rmcp::model::ToolAnnotations;

/// Whether arguments for `method` travel in the query string rather than a JSON body.
#[must_use]
pub fn is_query_method(method: &Method) -> bool {
    matches!(method.as_str(), "GET" | "DELETE" | "HEAD")
}

/// Annotations for a tool backed by one HTTP operation.
///
/// Every upstream call leaves the process, so `openWorldHint` is always set. Methods outside the
/// standard set only get that hint.
#[must_use]
pub fn annotations_for_method(method: &Method, title: Option<&str>) -> ToolAnnotations {
    // (read_only, destructive, idempotent)
    let (read_only, destructive, idempotent) = match method.as_str() {
        "GET" | "HEAD" | "OPTIONS" => (Some(true), Some(false), Some(true)),
        "POST" => (Some(false), Some(false), Some(false)),
        "PUT" | "DELETE" => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent.
        "PATCH" => (Some(false), Some(true), None),
        _ => (None, None, None),
    };

    ToolAnnotations {
        title: title.map(str::to_string),
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_read_only() {
        for m in [Method::GET, Method::HEAD] {
            let a = annotations_for_method(&m, None);
            assert_eq!(a.read_only_hint, Some(true));
            assert_eq!(a.destructive_hint, Some(false));
            assert_eq!(a.open_world_hint, Some(true));
        }
    }

    #[test]
    fn writes_that_replace_or_remove_are_destructive() {
        for m in [Method::PUT, Method::PATCH, Method::DELETE] {
            let a = annotations_for_method(&m, None);
            assert_eq!(a.read_only_hint, Some(false));
            assert_eq!(a.destructive_hint, Some(true));
        }
        assert_eq!(annotations_for_method(&Method::PATCH, None).idempotent_hint, None);
        assert_eq!(
            annotations_for_method(&Method::POST, None).destructive_hint,
            Some(false)
        );
    }

    #[test]
    fn extension_methods_only_get_open_world() {
        let custom: Method = "PROPFIND".parse().expect("valid method token");
        let a = annotations_for_method(&custom, Some("Find"));
        assert_eq!(a.read_only_hint, None);
        assert_eq!(a.destructive_hint, None);
        assert_eq!(a.idempotent_hint, None);
        assert_eq!(a.open_world_hint, Some(true));
        assert_eq!(a.title.as_deref(), Some("Find"));
    }

    #[test]
    fn query_methods_are_get_delete_head() {
        assert!(is_query_method(&Method::GET));
        assert!(is_query_method(&Method::DELETE));
        assert!(is_query_method(&Method::HEAD));
        assert!(!is_query_method(&Method::POST));
        assert!(!is_query_method(&Method::PATCH));
    }
}
