//! OCR engine seam and the tesseract-backed production engine

use super::ExtractPhase;
use crate::error::{HazCheckError, Result};
use async_trait::async_trait;
use image::DynamicImage;

/// Factory for OCR sessions
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Acquire a recognition session. Callers must call
    /// [`OcrSession::release`] on every path, success or failure.
    async fn acquire(&self) -> Result<Box<dyn OcrSession>>;
}

/// One recognition session
#[async_trait]
pub trait OcrSession: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<String>;

    /// Unconditional teardown
    async fn release(self: Box<Self>);
}

/// Production engine driving the `tesseract` binary. Acquire checks the
/// binary version once so a missing installation fails up front with an
/// initialization-phase error instead of per page.
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self::with_language("eng")
    }

    pub fn with_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn acquire(&self) -> Result<Box<dyn OcrSession>> {
        let version = tokio::task::spawn_blocking(rusty_tesseract::get_tesseract_version)
            .await
            .map_err(|e| HazCheckError::Extraction {
                phase: ExtractPhase::Initializing,
                message: format!("OCR version check failed: {e}"),
            })?
            .map_err(|e| HazCheckError::Extraction {
                phase: ExtractPhase::Initializing,
                message: format!("tesseract unavailable: {e:?}"),
            })?;
        tracing::debug!(version = %version.trim(), "acquired tesseract session");

        Ok(Box::new(TesseractSession {
            language: self.language.clone(),
        }))
    }
}

struct TesseractSession {
    language: String,
}

#[async_trait]
impl OcrSession for TesseractSession {
    async fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let image = image.clone();
        let language = self.language.clone();

        tokio::task::spawn_blocking(move || {
            let mut args = rusty_tesseract::Args::default();
            args.lang = language;

            let input =
                rusty_tesseract::Image::from_dynamic_image(&image).map_err(|e| {
                    HazCheckError::Extraction {
                        phase: ExtractPhase::Recognizing,
                        message: format!("image conversion failed: {e:?}"),
                    }
                })?;
            rusty_tesseract::image_to_string(&input, &args).map_err(|e| {
                HazCheckError::Extraction {
                    phase: ExtractPhase::Recognizing,
                    message: format!("recognition failed: {e:?}"),
                }
            })
        })
        .await
        .map_err(|e| HazCheckError::Extraction {
            phase: ExtractPhase::Recognizing,
            message: format!("OCR task failed: {e}"),
        })?
    }

    async fn release(self: Box<Self>) {
        // The subprocess-based engine holds no persistent resources.
    }
}
