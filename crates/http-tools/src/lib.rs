//! HTTP plumbing shared by the OpenAPI tool catalog and the MCP server.
//!
//! - `client`: the authenticated upstream client and the executor seam the router calls through
//! - `response_shaping`: rendering of upstream JSON into agent-facing text
//! - `semantics`: method-derived tool annotations and argument placement

pub mod client;
pub mod response_shaping;
pub mod semantics;

pub use client::{ApiClient, ApiClientConfig, ApiClientError, HttpExecutor};
pub use response_shaping::{ResponseFormat, display_text};
