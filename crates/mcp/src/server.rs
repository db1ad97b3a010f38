//! MCP Server Implementation
//!
//! Implements the Model Context Protocol server for Opine.

use std::sync::Arc;

use opine_client::{OpineApi, OpineClient};
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    ErrorData, RoleServer, ServerHandler, ServiceExt,
};
use tracing::info;

use crate::dispatcher::ToolDispatcher;
use crate::tools::{category_summary, tool_definitions, TOTAL_TOOLS};
use crate::DispatchError;

pub const SERVER_NAME: &str = "opine-mcp";

/// Main MCP server for Opine
pub struct OpineMcpServer<A = OpineClient> {
    dispatcher: ToolDispatcher<A>,
}

impl<A> Clone for OpineMcpServer<A> {
    fn clone(&self) -> Self {
        Self { dispatcher: self.dispatcher.clone() }
    }
}

impl<A> OpineMcpServer<A>
where
    A: OpineApi + 'static,
{
    pub fn new(api: A) -> Self {
        Self::with_shared(Arc::new(api))
    }

    pub fn with_shared(api: Arc<A>) -> Self {
        Self { dispatcher: ToolDispatcher::new(api) }
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(tools = TOTAL_TOOLS, "Starting MCP server with stdio transport");

        let service = self.serve(rmcp::transport::stdio()).await?;
        let reason = service.waiting().await?;

        info!(?reason, "MCP server shutdown complete");
        Ok(())
    }
}

fn to_error_data(error: DispatchError) -> ErrorData {
    ErrorData::new(ErrorCode(error.error_code()), error.to_string(), None)
}

impl<A> ServerHandler for OpineMcpServer<A>
where
    A: OpineApi + 'static,
{
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "Opine MCP Server - read deals, evaluations, tickets, and sales processes \
                 from Opine CRM, and file tickets or deal notes.\n{}",
                category_summary()
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(tool_definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self
            .dispatcher
            .dispatch(&request.name, request.arguments.as_ref())
            .await
            .map_err(to_error_data)?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
