//! `OpenAPI` operations exposed as MCP tools.
//!
//! Startup is one-shot: load the document, index its operations, bind the configured tools and
//! flatten each operation into an input schema. The result is an immutable [`ToolCatalog`] that a
//! [`ToolRouter`] dispatches calls against.

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod router;
pub mod schema;
pub mod tools;

pub use config::{HashPolicy, SpecSource, ToolConfig};
pub use document::SpecDocument;
pub use error::{OpenApiToolsError, Result};
pub use router::ToolRouter;
pub use tools::{ResolvedOperation, ToolCatalog};
