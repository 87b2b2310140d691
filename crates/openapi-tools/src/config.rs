use serde::{Deserialize, Serialize};
use spritz_http_tools::ResponseFormat;

/// One exposed tool: an agent-facing name bound to an `OpenAPI` operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Agent-facing tool name. Unique within a catalog.
    pub name: String,

    /// Target `operationId` in the spec (case-sensitive).
    pub operation_id: String,

    /// Overrides the operation's summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// How successful responses are rendered. Absent means pretty JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ResponseFormat>,
}

impl ToolConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation_id: operation_id.into(),
            description: None,
            format: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Where the spec lives and how strictly its content is pinned.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSource {
    /// `OpenAPI` spec location (URL or file path).
    pub location: String,

    /// Optional `sha256:<hex>` pin of the raw document bytes.
    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default)]
    pub hash_policy: HashPolicy,
}

/// What a spec pin mismatch does at startup.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashPolicy {
    #[default]
    Warn,
    /// Abort startup.
    Fail,
    /// Skip the check entirely.
    Ignore,
}

impl std::str::FromStr for HashPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!(
                "invalid hash policy '{other}' (expected warn, fail or ignore)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_config_reads_camel_case_fields() {
        let cfg: ToolConfig = serde_json::from_str(
            r#"{"name":"list_off_ramps","operationId":"getV1Off-ramps","format":"csv"}"#,
        )
        .expect("parse");
        assert_eq!(cfg.name, "list_off_ramps");
        assert_eq!(cfg.operation_id, "getV1Off-ramps");
        assert_eq!(cfg.description, None);
        assert_eq!(cfg.format, Some(ResponseFormat::Csv));
    }

    #[test]
    fn hash_policy_parses_case_insensitively() {
        assert_eq!("FAIL".parse::<HashPolicy>(), Ok(HashPolicy::Fail));
        assert_eq!("warn".parse::<HashPolicy>(), Ok(HashPolicy::Warn));
        assert!("strict".parse::<HashPolicy>().is_err());
    }
}
