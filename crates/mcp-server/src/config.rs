//! Process configuration: command line (with environment fallbacks) and the exposed tool list.

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use spritz_http_tools::ResponseFormat;
use spritz_openapi_tools::{HashPolicy, SpecSource, ToolConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
pub struct Cli {
    /// `OpenAPI` document (file path or http(s) URL)
    #[arg(long, env = "SPRITZ_OPENAPI_SPEC", default_value = "openapi.json")]
    pub spec: String,

    /// Expected `sha256:<hex>` of the spec document
    #[arg(long, env = "SPRITZ_OPENAPI_SPEC_HASH")]
    pub spec_hash: Option<String>,

    /// What to do when the spec hash does not match (warn, fail, ignore)
    #[arg(long, default_value = "warn")]
    pub spec_hash_policy: HashPolicy,

    /// Upstream API base URL
    #[arg(long, env = "SPRITZ_API_BASE_URL", default_value = "https://api.spritz.finance")]
    pub base_url: String,

    /// Bearer API key for the upstream API
    #[arg(long, env = "SPRITZ_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// YAML/JSON file with `tools: [{ name, operationId, description?, format? }]`
    #[arg(long, env = "SPRITZ_TOOLS_CONFIG")]
    pub tools: Option<PathBuf>,

    /// Per-request upstream timeout in seconds (0 disables)
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    #[must_use]
    pub fn spec_source(&self) -> SpecSource {
        SpecSource {
            location: self.spec.clone(),
            hash: self.spec_hash.clone(),
            hash_policy: self.spec_hash_policy,
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// The configured tool file, or the built-in list.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool file cannot be read or parsed.
    pub fn tool_configs(&self) -> anyhow::Result<Vec<ToolConfig>> {
        match &self.tools {
            Some(path) => load_tool_configs(path),
            None => Ok(exposed_tools()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolsFile {
    tools: Vec<ToolConfig>,
}

/// Read a tool list from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not contain a `tools` list.
pub fn load_tool_configs(path: &Path) -> anyhow::Result<Vec<ToolConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read tool config '{}'", path.display()))?;
    let file: ToolsFile = serde_yaml::from_str(&content)
        .with_context(|| format!("parse tool config '{}'", path.display()))?;
    Ok(file.tools)
}

/// Operations exposed when no tool file is configured.
#[must_use]
pub fn exposed_tools() -> Vec<ToolConfig> {
    vec![
        ToolConfig::new("list_bank_accounts", "getV1Bank-accounts")
            .with_description("List all bank accounts saved as off-ramp payment destinations.")
            .with_format(ResponseFormat::Csv),
        ToolConfig::new("create_bank_account", "postV1Bank-accounts")
            .with_description(
                "Add a new bank account as an off-ramp destination. The `type` field determines \
                 required fields: us (routing_number, account_number), ca (institution_number, \
                 transit_number, account_number), uk (sort_code, account_number), iban (iban, \
                 optional bic).",
            )
            .with_format(ResponseFormat::Json),
        ToolConfig::new("delete_bank_account", "deleteV1Bank-accountsByAccountId")
            .with_description("Delete a bank account by ID."),
        ToolConfig::new("list_off_ramps", "getV1Off-ramps")
            .with_description(
                "List off-ramp transactions. Filter by status, chain, or destination accountId. \
                 Supports cursor pagination.",
            )
            .with_format(ResponseFormat::Csv),
        ToolConfig::new("create_off_ramp_quote", "postV1Off-ramp-quotes")
            .with_description(
                "Create an off-ramp quote to convert crypto to fiat. Specify the destination \
                 accountId, amount, and blockchain chain. Returns a quote with exchange rate and \
                 fees.",
            )
            .with_format(ResponseFormat::Json),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write as _;

    #[test]
    fn defaults_apply_when_only_the_key_is_given() {
        let cli = Cli::try_parse_from(["spritz-mcp-server", "--api-key", "sk_test"])
            .expect("parse");
        assert_eq!(cli.spec_hash_policy, HashPolicy::Warn);
        assert_eq!(cli.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.spec_source().hash_policy, HashPolicy::Warn);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cli = Cli::try_parse_from([
            "spritz-mcp-server",
            "--api-key",
            "sk_test",
            "--request-timeout-secs",
            "0",
            "--spec-hash-policy",
            "fail",
            "--log-format",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.request_timeout(), None);
        assert_eq!(cli.spec_hash_policy, HashPolicy::Fail);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn built_in_tools_have_unique_names_and_list_endpoints_use_csv() {
        let tools = exposed_tools();
        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());

        for t in &tools {
            if t.name.starts_with("list_") {
                assert_eq!(t.format, Some(ResponseFormat::Csv), "{}", t.name);
            }
            assert!(t.description.is_some(), "{}", t.name);
        }
    }

    #[test]
    fn tool_file_is_read_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "tools:\n  - name: list_off_ramps\n    operationId: getV1Off-ramps\n    format: csv\n  - name: get_rates\n    operationId: getV1Rates"
        )
        .expect("write");

        let tools = load_tool_configs(file.path()).expect("load");
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].format, Some(ResponseFormat::Csv));
        assert_eq!(tools[1], ToolConfig::new("get_rates", "getV1Rates"));
    }

    #[test]
    fn malformed_tool_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "tools: 3").expect("write");
        assert!(load_tool_configs(file.path()).is_err());
    }
}
