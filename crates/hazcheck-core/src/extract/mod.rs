//! Document extraction service
//!
//! Turns an uploaded file into plain text. Page-documents first try the
//! embedded text layer; if that yields too little text (a scan), each page
//! is rasterized and run through OCR. Plain images go straight to OCR.
//!
//! Progress is reported through an enumerated phase type, never through
//! keyword-matched status strings.

mod ocr;
mod raster;
mod text_layer;

pub use ocr::{OcrEngine, OcrSession, TesseractOcr};
pub use raster::{PageRasterizer, PdfiumRasterizer};
pub use text_layer::{PdfTextLayer, TextLayerReader};

use crate::cancel::CancelToken;
use crate::error::{HazCheckError, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Minimum trimmed text-layer length before the OCR fallback kicks in.
/// Below this the document is treated as a scan with no usable text layer.
pub const TEXT_LAYER_MIN_CHARS: usize = 50;

/// Upscale factor applied when rasterizing pages for OCR quality
pub const OCR_SCALE: f32 = 2.0;

/// Coarse phase an extraction failure is tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractPhase {
    Initializing,
    TextLayer,
    Rasterizing,
    Recognizing,
}

impl fmt::Display for ExtractPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractPhase::Initializing => "initialization",
            ExtractPhase::TextLayer => "text-layer read",
            ExtractPhase::Rasterizing => "rasterization",
            ExtractPhase::Recognizing => "recognition",
        })
    }
}

/// Progress event emitted during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractProgress {
    Initializing,
    ReadingTextLayer,
    Rasterizing {
        page: usize,
        total: usize,
    },
    Recognizing {
        page: usize,
        total: usize,
        /// 0-100 across the whole document
        percent: u8,
    },
}

/// Progress callback; consumers key UI state off the enum, not off text
pub type ProgressFn = dyn Fn(ExtractProgress) + Send + Sync;

/// Media types the extraction service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tiff,
}

impl MediaType {
    /// Detect from the file extension; `None` means unsupported. Runs
    /// before any I/O on the content.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "png" => Some(MediaType::Png),
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "webp" => Some(MediaType::Webp),
            "bmp" => Some(MediaType::Bmp),
            "tif" | "tiff" => Some(MediaType::Tiff),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
            MediaType::Bmp => "image/bmp",
            MediaType::Tiff => "image/tiff",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, MediaType::Pdf)
    }
}

/// Extraction service with injectable seams for the text layer, page
/// rasterizer, and OCR engine.
pub struct ExtractionService {
    text_layer: Arc<dyn TextLayerReader>,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrEngine>,
}

impl ExtractionService {
    pub fn new(
        text_layer: Arc<dyn TextLayerReader>,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            text_layer,
            rasterizer,
            ocr,
        }
    }

    /// Production wiring: pdf text layer, pdfium rasterizer, tesseract OCR
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(PdfTextLayer),
            Arc::new(PdfiumRasterizer),
            Arc::new(TesseractOcr::new()),
        )
    }

    /// Extract plain text from a file on disk.
    pub async fn extract_text(
        &self,
        path: &Path,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<String> {
        // Unsupported types are rejected before any I/O on the content.
        let media = MediaType::from_path(path).ok_or_else(|| {
            HazCheckError::InputRejected(format!(
                "unsupported file type: {}",
                path.display()
            ))
        })?;

        emit(progress, ExtractProgress::Initializing);
        let bytes = tokio::fs::read(path).await?;

        self.extract_bytes(&bytes, media, progress, cancel).await
    }

    /// Extract plain text from in-memory bytes of a known media type.
    pub async fn extract_bytes(
        &self,
        bytes: &[u8],
        media: MediaType,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<String> {
        if media.is_image() {
            self.extract_image(bytes, progress, cancel).await
        } else {
            self.extract_pdf(bytes, progress, cancel).await
        }
    }

    async fn extract_pdf(
        &self,
        bytes: &[u8],
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<String> {
        emit(progress, ExtractProgress::ReadingTextLayer);

        // Fast path: the embedded text layer, no OCR.
        match self.text_layer.read_text_layer(bytes) {
            Ok(text) if text.trim().len() >= TEXT_LAYER_MIN_CHARS => return Ok(text),
            Ok(_) => {
                tracing::debug!("text layer too sparse, falling back to OCR");
            }
            Err(e) => {
                tracing::debug!("text layer unreadable, falling back to OCR: {e}");
            }
        }

        cancel.check()?;

        let total = self.rasterizer.page_count(bytes)?;
        let session = self.ocr.acquire().await?;
        let result = self
            .recognize_pages(session.as_ref(), bytes, total, progress, cancel)
            .await;
        // Unconditional release, success and failure paths alike.
        session.release().await;
        result
    }

    async fn recognize_pages(
        &self,
        session: &dyn OcrSession,
        bytes: &[u8],
        total: usize,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<String> {
        let mut text = String::new();

        for index in 0..total {
            cancel.check()?;
            let page = index + 1;

            emit(progress, ExtractProgress::Rasterizing { page, total });
            let image = self.rasterizer.rasterize_page(bytes, index, OCR_SCALE)?;

            emit(
                progress,
                ExtractProgress::Recognizing {
                    page,
                    total,
                    percent: percent_done(index, total),
                },
            );
            let recognized = session.recognize(&image).await?;
            text.push_str(&recognized);
            text.push_str("\n\n");

            emit(
                progress,
                ExtractProgress::Recognizing {
                    page,
                    total,
                    percent: percent_done(page, total),
                },
            );
        }

        Ok(text)
    }

    async fn extract_image(
        &self,
        bytes: &[u8],
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<String> {
        let image = image::load_from_memory(bytes).map_err(|e| HazCheckError::Extraction {
            phase: ExtractPhase::Initializing,
            message: format!("failed to decode image: {e}"),
        })?;

        cancel.check()?;

        let session = self.ocr.acquire().await?;
        emit(
            progress,
            ExtractProgress::Recognizing {
                page: 1,
                total: 1,
                percent: 0,
            },
        );
        let result = session.recognize(&image).await;
        session.release().await;
        let text = result?;

        emit(
            progress,
            ExtractProgress::Recognizing {
                page: 1,
                total: 1,
                percent: 100,
            },
        );
        Ok(text)
    }
}

fn emit(progress: Option<&ProgressFn>, event: ExtractProgress) {
    if let Some(callback) = progress {
        callback(event);
    }
}

fn percent_done(pages_done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((pages_done * 100) / total).min(100) as u8
}
