//! Inference client seam and the Gemini HTTP implementation

use crate::error::{HazCheckError, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Default API base for the hosted Gemini endpoint
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Image attached inline to a request
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One generation request
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub model_id: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
}

/// Token counts as reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub candidate_tokens: u64,
    pub total_tokens: u64,
}

/// Generation output
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub text: String,
    /// Absent when the provider omits usage metadata
    pub usage: Option<TokenUsage>,
}

/// Seam for the model provider; the pipeline only sees this trait
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse>;
}

/// Gemini generateContent client
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base(api_key, DEFAULT_API_BASE.to_string())
    }

    pub fn with_base(api_key: String, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base, request.model_id
        );

        let mut parts = vec![WirePart {
            text: Some(request.prompt),
            inline_data: None,
        }];
        if let Some(image) = request.image {
            parts.push(WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: image.mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                }),
            });
        }

        let body = GenerateRequest {
            contents: vec![WireContent { parts }],
        };

        tracing::debug!(model = %request.model_id, "sending generate request");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HazCheckError::Inference(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HazCheckError::Inference(format!(
                "HTTP {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| HazCheckError::MalformedResponse(format!("invalid response body: {e}")))?;

        let text: String = parsed
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| {
                HazCheckError::MalformedResponse("response contained no candidates".to_string())
            })?;

        let usage = parsed.usage_metadata.map(|meta| TokenUsage {
            prompt_tokens: meta.prompt_token_count,
            candidate_tokens: meta.candidates_token_count,
            total_tokens: meta.total_token_count,
        });

        Ok(InferenceResponse { text, usage })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<WireContent>,
}

#[derive(Serialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let body = GenerateRequest {
            contents: vec![WireContent {
                parts: vec![
                    WirePart {
                        text: Some("validate".to_string()),
                        inline_data: None,
                    },
                    WirePart {
                        text: None,
                        inline_data: Some(WireInlineData {
                            mime_type: "image/png".to_string(),
                            data: "aGk=".to_string(),
                        }),
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "validate");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_none());
    }

    #[test]
    fn test_response_parses_usage_metadata() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"status\""}, {"text": ": \"pass\"}"}]}}
            ],
            "usageMetadata": {
                "promptTokenCount": 120,
                "candidatesTokenCount": 40,
                "totalTokenCount": 160
            }
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parse");
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "{\"status\": \"pass\"}");
        let usage = parsed.usage_metadata.expect("usage");
        assert_eq!(usage.prompt_token_count, 120);
        assert_eq!(usage.total_token_count, 160);
    }
}
