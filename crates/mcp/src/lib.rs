//! Opine MCP (Model Context Protocol) Server
//!
//! Exposes the Opine CRM API (deals, evaluations, tickets, sales processes)
//! as MCP tools so AI assistants can read pipeline data and file tickets.
//!
//! ## Architecture
//!
//! - `tools`: tool names, categories, and input schemas
//! - `arguments`: validates a raw argument map into a typed [`ToolRequest`]
//! - `dispatcher`: runs a [`ToolRequest`] against an [`opine_client::OpineApi`]
//! - `server`: the MCP protocol handler and stdio transport
//!
//! ## Example Usage
//!
//! ```no_run
//! use opine_client::OpineClient;
//! use opine_mcp::OpineMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OpineClient::new("opk_live_...".to_string().into(), None)?;
//!     OpineMcpServer::new(client).run_stdio().await
//! }
//! ```

pub mod arguments;
pub mod dispatcher;
mod server;
pub mod tools;

pub use arguments::ToolRequest;
pub use dispatcher::ToolDispatcher;
pub use server::OpineMcpServer;
pub use tools::*;

use opine_client::{ClientError, EnrichmentError};
use opine_core::IdError;
use thiserror::Error;

/// Errors raised while handling a tool call. Every message starts with
/// `Error executing <tool>:`.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Error executing {tool}: missing required argument `{field}`")]
    MissingArgument { tool: String, field: &'static str },

    #[error("Error executing {tool}: argument `{field}` is invalid: {reason}")]
    InvalidArgument { tool: String, field: &'static str, reason: String },

    #[error("Error executing {0}: Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Error executing {tool}: {source}")]
    Execution {
        tool: String,
        #[source]
        source: OperationError,
    },
}

/// Failures of the operation behind a tool.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error(transparent)]
    InvalidId(#[from] IdError),

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error("could not serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<EnrichmentError> for OperationError {
    fn from(error: EnrichmentError) -> Self {
        match error {
            EnrichmentError::InvalidId(error) => Self::InvalidId(error),
            EnrichmentError::Api(error) => Self::Api(error),
        }
    }
}

impl DispatchError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            DispatchError::MissingArgument { .. } => -32602, // Invalid params
            DispatchError::InvalidArgument { .. } => -32602, // Invalid params
            DispatchError::UnknownTool(_) => -32602,         // Invalid params (unknown tool name)
            DispatchError::Execution { .. } => -32603,       // Internal error
        }
    }
}

/// Result type for tool dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;
