//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{ArchiveOpenParams, AssetFetchParams, buckets_impl, fetch_impl, open_impl};

use paper_client::{ArchiveFlow, Registration};
use paper_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use url::Url;

/// The main MCP server handler for paper.
#[derive(Clone)]
pub struct PaperServer {
    tool_router: ToolRouter<Self>,
    flow: Arc<ArchiveFlow>,
    registration: Arc<Registration>,
    cache: CacheDb,
    origin: Url,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PaperServer {
    /// Create a new server handler.
    pub fn new(flow: Arc<ArchiveFlow>, registration: Arc<Registration>, cache: CacheDb, origin: Url) -> Self {
        Self { tool_router: Self::tool_router(), flow, registration, cache, origin }
    }

    /// Validate a URL and return its archive lookup.
    #[tool(
        description = "Validate a URL and return the archive.is lookup to navigate to. Invalid input is reported with a user-facing message."
    )]
    async fn archive_open(&self, params: Parameters<ArchiveOpenParams>) -> Result<CallToolResult, McpError> {
        open_impl(&self.flow, params.0).await
    }

    /// Fetch one of the tool's own assets through the offline cache.
    #[tool(
        description = "Fetch an asset path relative to the tool's origin, served cache-first with an offline fallback."
    )]
    async fn asset_fetch(&self, params: Parameters<AssetFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.registration, &self.origin, params.0).await
    }

    /// List cache buckets and their entries.
    #[tool(description = "List offline cache buckets, marking the one owned by the active worker.")]
    async fn cache_buckets(&self) -> Result<CallToolResult, McpError> {
        let controller = self.registration.controller().await;
        buckets_impl(&self.cache, controller.as_ref().map(|w| w.cache_name())).await
    }
}

impl ServerHandler for PaperServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "paper".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
