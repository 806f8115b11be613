//! Command implementations

pub mod config;
pub mod docs;
pub mod parse;
pub mod screenshot;
pub mod servers;
pub mod validate;

use crate::progress;
use anyhow::{bail, Result};
use hazcheck_core::cancel::CancelToken;
use hazcheck_core::config::Settings;
use hazcheck_core::extract::{ExtractionService, MediaType};
use hazcheck_core::llm::GeminiClient;
use std::path::Path;

/// Build the inference client from settings, failing with a clear message
/// when no credential is configured.
pub fn build_client(settings: &Settings) -> Result<GeminiClient> {
    let api_key = settings.api_key.clone().ok_or_else(|| {
        hazcheck_core::HazCheckError::Config(
            "no API key configured; run `hazcheck config set api-key <key>` \
             or set HAZCHECK_API_KEY"
                .to_string(),
        )
    })?;
    Ok(GeminiClient::new(api_key))
}

/// Token wired to Ctrl-C so long extractions and model calls can be
/// abandoned cleanly.
pub fn cancel_on_ctrl_c() -> CancelToken {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ncancelling...");
            trigger.cancel();
        }
    });
    cancel
}

/// Read a document's text: pdf and image files go through extraction
/// (with the OCR fallback), anything else is read as plain text.
pub async fn read_document_text(path: &Path, cancel: &CancelToken) -> Result<String> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    match MediaType::from_path(path) {
        Some(_) => {
            let service = ExtractionService::with_defaults();
            let text = service
                .extract_text(path, Some(&progress::print_extract), cancel)
                .await?;
            progress::clear_line();
            Ok(text)
        }
        None => Ok(std::fs::read_to_string(path)?),
    }
}
