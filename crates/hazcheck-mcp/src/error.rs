//! Error types for the MCP client

use thiserror::Error;

/// Errors raised while talking to a knowledge server.
///
/// These are always isolated per server by the caller; a failing server
/// must never abort the aggregation for its siblings.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("connection to {0} timed out")]
    Timeout(String),

    #[error("connection to {0} refused")]
    ConnectionRefused(String),

    #[error("session closed")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, McpError>;
