use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use spritz_openapi_tools::ToolRouter;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Tools for the Spritz API: manage bank accounts used as off-ramp \
    destinations and create or list off-ramp transactions. List tools return compact CSV with a \
    pagination footer; pass nextCursor back to fetch the next page.";

/// MCP handler exposing one resolved tool catalog.
#[derive(Clone)]
pub struct SpritzServer {
    router: ToolRouter,
    tools: Arc<Vec<Tool>>,
}

impl SpritzServer {
    #[must_use]
    pub fn new(router: ToolRouter) -> Self {
        let tools = Arc::new(router.catalog().list_tools());
        Self { router, tools }
    }

    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        self.router.call(name, arguments).await
    }
}

impl ServerHandler for SpritzServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools.as_ref().clone(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spritz_http_tools::ApiClient;
    use spritz_http_tools::client::ApiClientConfig;
    use spritz_openapi_tools::{SpecDocument, ToolCatalog, ToolConfig};

    fn server() -> SpritzServer {
        let doc = SpecDocument::from_value(json!({
            "paths": {
                "/v1/bank-accounts": {
                    "get": { "operationId": "getV1Bank-accounts", "summary": "List bank accounts" }
                }
            }
        }));
        let catalog = ToolCatalog::resolve(
            &doc,
            vec![ToolConfig::new("list_bank_accounts", "getV1Bank-accounts")],
        )
        .expect("resolve");
        let client = ApiClient::new(ApiClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "k".to_string(),
            timeout: None,
        })
        .expect("client");
        SpritzServer::new(ToolRouter::new(Arc::new(catalog), Arc::new(client)))
    }

    #[test]
    fn advertises_tools_capability_and_build_identity() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "spritz-mcp-server");
        assert!(info.instructions.is_some());
    }

    #[test]
    fn lists_projected_tools() {
        let server = server();
        let tools = server.tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "list_bank_accounts");
        assert_eq!(tools[0].description.as_deref(), Some("List bank accounts"));
    }

    #[tokio::test]
    async fn unknown_tool_does_not_touch_the_network() {
        let result = server().call("nope", None).await;
        assert_eq!(result.is_error, Some(true));
    }
}
