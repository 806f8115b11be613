//! hazcheck-core: dangerous-goods shipment validation engine
//!
//! Core library behind the hazcheck CLI: document text extraction with an
//! OCR fallback, weighted context aggregation over knowledge servers and
//! a local document store, and model-backed compliance validation.

pub mod cancel;
pub mod config;
pub mod connector;
pub mod context;
pub mod cost;
pub mod db;
pub mod error;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod shipment;

pub use cancel::CancelToken;
pub use config::{KnowledgeServerConfig, Settings};
pub use connector::{ContextFetcher, McpContextFetcher};
pub use context::{SourceContext, SourceType};
pub use cost::{cost_of, UsageInfo};
pub use db::{Database, DocumentType, LocalDocumentRecord};
pub use error::{Error, HazCheckError, Result};
pub use extract::{ExtractPhase, ExtractProgress, ExtractionService, MediaType};
pub use llm::{
    GeminiClient, InferenceClient, SdsFields, Severity, ValidationIssue, ValidationResult,
    ValidationStatus,
};
pub use pipeline::{PipelineStage, ValidationPipeline};
pub use shipment::{Carrier, HazmatShipment, TransportMode};

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "hazcheck";

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "hazcheck";
