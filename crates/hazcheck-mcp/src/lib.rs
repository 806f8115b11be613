//! MCP client for hazcheck
//!
//! Conformant client for external knowledge servers speaking the Model
//! Context Protocol over the SSE transport. Provides:
//! - JSON-RPC 2.0 protocol types
//! - a streaming session with request/response correlation
//! - an injectable session pool keyed by server URL

mod error;
mod pool;
mod protocol;
mod session;
mod sse;

pub use error::McpError;
pub use pool::SessionPool;
pub use protocol::{
    JsonRpcRequest, JsonRpcResponse, Resource, ResourceContents, ToolCallResult, ToolContent,
};
pub use session::McpSession;

/// Default handshake timeout for new sessions
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;
