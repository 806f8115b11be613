//! Error types for hazcheck

use crate::extract::ExtractPhase;
use thiserror::Error;

/// Result type alias using HazCheckError
pub type Result<T> = std::result::Result<T, HazCheckError>;

/// Error type alias for convenience
pub type Error = HazCheckError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for hazcheck
///
/// Every pipeline failure carries enough category/phase context for a
/// caller to tell "failed during text extraction" apart from "failed
/// during AI analysis".
#[derive(Debug, Error)]
pub enum HazCheckError {
    /// Unsupported file type; raised before any I/O on the content
    #[error("unsupported input: {0}")]
    InputRejected(String),

    /// OCR or rasterization failure, tagged with the phase it occurred in
    #[error("extraction failed during {phase}: {message}")]
    Extraction {
        phase: ExtractPhase,
        message: String,
    },

    /// Knowledge-server failure; isolated per server and never fatal to
    /// the overall aggregation
    #[error("knowledge server error: {0}")]
    KnowledgeServer(#[from] hazcheck_mcp::McpError),

    /// Transport or auth failure calling the model; fatal to the request
    #[error("inference error: {0}")]
    Inference(String),

    /// Model output could not be parsed as the expected structure
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// The caller cancelled the request
    #[error("operation cancelled")]
    Cancelled,

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HazCheckError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DocumentNotFound(_) => exit_codes::NOT_FOUND,
            Self::InputRejected(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
