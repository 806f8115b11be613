//! Page rasterization for the OCR fallback

use super::ExtractPhase;
use crate::error::{HazCheckError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;

/// Renders individual pages of a page-document to images
pub trait PageRasterizer: Send + Sync {
    fn page_count(&self, pdf: &[u8]) -> Result<usize>;

    /// Render one page at the given upscale factor. `index` is zero-based.
    fn rasterize_page(&self, pdf: &[u8], index: usize, scale: f32) -> Result<DynamicImage>;
}

/// Production rasterizer backed by pdfium. The library is bound lazily on
/// each call; binding failure surfaces as a rasterization-phase error
/// rather than a startup crash.
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    fn pdfium() -> Result<Pdfium> {
        let bindings = Pdfium::bind_to_system_library()
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            })
            .map_err(|e| HazCheckError::Extraction {
                phase: ExtractPhase::Rasterizing,
                message: format!("pdfium library unavailable: {e:?}"),
            })?;
        Ok(Pdfium::new(bindings))
    }

    fn raster_error(e: PdfiumError) -> HazCheckError {
        HazCheckError::Extraction {
            phase: ExtractPhase::Rasterizing,
            message: format!("{e:?}"),
        }
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn page_count(&self, pdf: &[u8]) -> Result<usize> {
        let pdfium = Self::pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(Self::raster_error)?;
        Ok(document.pages().len() as usize)
    }

    fn rasterize_page(&self, pdf: &[u8], index: usize, scale: f32) -> Result<DynamicImage> {
        let pdfium = Self::pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(Self::raster_error)?;
        let page = document
            .pages()
            .get(index as u16)
            .map_err(Self::raster_error)?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(Self::raster_error)?;
        Ok(bitmap.as_image())
    }
}
