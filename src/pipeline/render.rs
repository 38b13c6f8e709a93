//! Page rasterisation for OCR: pdfium renders every page to an image, which
//! is then PNG-encoded and base64-wrapped for the vision model.
//!
//! ## Why spawn_blocking?
//!
//! pdfium uses thread-local state and is CPU-bound. Rendering on the blocking
//! pool keeps the Tokio workers free while a long scan is rasterised.
//!
//! ## Why PNG?
//!
//! Lossless. JPEG artefacts around glyph edges measurably hurt recognition of
//! dense CJK text at 150 DPI.

use super::pdfium;
use crate::config::OcrConfig;
use crate::error::IngestError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise every page of a PDF, in page order.
///
/// # Returns
/// `(page_index_0based, DynamicImage)` tuples; empty for a zero-page document.
pub async fn render_all_pages(
    pdf_path: &Path,
    config: &OcrConfig,
) -> Result<Vec<(usize, DynamicImage)>, IngestError> {
    let path = pdf_path.to_path_buf();
    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || {
        render_blocking(&path, dpi, max_pixels, password.as_deref())
    })
        .await
        .map_err(|e| IngestError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_blocking(
    pdf_path: &Path,
    dpi: u32,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<(usize, DynamicImage)>, IngestError> {
    let pdfium = pdfium::create_pdfium()?;
    let document = pdfium::open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("Rendering {} pages for OCR", total_pages);

    // PDF user space is 72 units per inch; the pixel cap wins on oversized pages.
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / 72.0)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            IngestError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        results.push((idx, image));
    }

    Ok(results)
}

/// Encode a rasterised page as a base64 PNG attachment.
///
/// `detail: "high"` lets GPT-4-class models tile the image instead of
/// downsampling it to a single 512 px overview, which loses small print.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
