//! Model integration: client seam, prompt builders, response
//! normalization, and result types.

mod client;
mod normalize;
mod prompt;
mod result;

pub use client::{
    GeminiClient, InferenceClient, InferenceRequest, InferenceResponse, InlineImage, TokenUsage,
    DEFAULT_API_BASE,
};
pub use normalize::{normalize_json_response, normalize_un_number};
pub use prompt::{
    build_screenshot_read_prompt, build_screenshot_validation_prompt,
    build_sds_extraction_prompt, build_validation_prompt, SDS_TEXT_LIMIT,
};
pub use result::{derive_status, SdsFields, Severity, ValidationIssue, ValidationResult, ValidationStatus};
