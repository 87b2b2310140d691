//! Binding tool configurations to indexed operations, and projecting them as MCP tools.

use crate::config::ToolConfig;
use crate::document::SpecDocument;
use crate::error::{OpenApiToolsError, Result};
use crate::index::OperationIndex;
use crate::schema::{InputSchema, build_input_schema};
use reqwest::Method;
use rmcp::model::{JsonObject, Tool};
use spritz_http_tools::semantics::annotations_for_method;
use std::collections::HashMap;
use std::sync::Arc;

/// A tool configuration bound to its HTTP operation.
#[derive(Debug, Clone)]
pub struct ResolvedOperation {
    pub method: Method,
    /// Path template, e.g. `/v1/bank-accounts/{accountId}`.
    pub path: String,
    pub input_schema: InputSchema,
    pub config: ToolConfig,
    /// Operation summary, or `""`.
    pub summary: String,
    schema_object: Arc<JsonObject>,
}

impl ResolvedOperation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Lowercase HTTP method as it appears in the spec.
    #[must_use]
    pub fn method_name(&self) -> String {
        self.method.as_str().to_ascii_lowercase()
    }

    /// Configured override, else the operation summary.
    #[must_use]
    pub fn description(&self) -> &str {
        self.config.description.as_deref().unwrap_or(&self.summary)
    }

    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.config.name.clone(),
            self.description().to_string(),
            Arc::clone(&self.schema_object),
        );
        let title = (!self.summary.is_empty()).then_some(self.summary.as_str());
        tool.annotations = Some(annotations_for_method(&self.method, title));
        tool
    }
}

/// The immutable set of tools exposed by one server instance, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    operations: Vec<ResolvedOperation>,
    by_name: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Index `doc` and resolve every configuration against it.
    ///
    /// # Errors
    ///
    /// Fails if any `operationId` is missing from the document or a tool name repeats. Nothing is
    /// resolved in that case.
    pub fn resolve(doc: &SpecDocument, configs: Vec<ToolConfig>) -> Result<Self> {
        Self::from_index(&OperationIndex::build(doc), configs)
    }

    /// # Errors
    ///
    /// See [`ToolCatalog::resolve`].
    pub fn from_index(index: &OperationIndex, configs: Vec<ToolConfig>) -> Result<Self> {
        let mut catalog = Self::default();

        for config in configs {
            let Some(entry) = index.get(&config.operation_id) else {
                return Err(OpenApiToolsError::UnknownOperation {
                    operation_id: config.operation_id,
                    available: index.operation_ids().map(str::to_string).collect(),
                });
            };
            if catalog.by_name.contains_key(&config.name) {
                return Err(OpenApiToolsError::DuplicateToolName(config.name));
            }

            let input_schema = build_input_schema(&entry.operation);
            let schema_object = Arc::new(input_schema.to_json_object());
            catalog
                .by_name
                .insert(config.name.clone(), catalog.operations.len());
            catalog.operations.push(ResolvedOperation {
                method: entry.method.clone(),
                path: entry.path.clone(),
                input_schema,
                summary: entry.operation.summary.clone().unwrap_or_default(),
                config,
                schema_object,
            });
        }

        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedOperation> {
        self.by_name.get(name).map(|&i| &self.operations[i])
    }

    #[must_use]
    pub fn operations(&self) -> &[ResolvedOperation] {
        &self.operations
    }

    /// Descriptors advertised in `tools/list`.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.operations.iter().map(ResolvedOperation::to_tool).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
