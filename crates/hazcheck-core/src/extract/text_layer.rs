//! Embedded text-layer reader

use super::ExtractPhase;
use crate::error::{HazCheckError, Result};

/// Reads the embedded text layer of a page-document, if any
pub trait TextLayerReader: Send + Sync {
    fn read_text_layer(&self, pdf: &[u8]) -> Result<String>;
}

/// Production reader backed by `pdf-extract`
pub struct PdfTextLayer;

impl TextLayerReader for PdfTextLayer {
    fn read_text_layer(&self, pdf: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(pdf).map_err(|e| HazCheckError::Extraction {
            phase: ExtractPhase::TextLayer,
            message: format!("failed to read text layer: {e}"),
        })
    }
}
