//! Structured PDF content extraction: text layer and embedded raster
//! images, via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so Tokio worker threads never stall on CPU-heavy decoding.
//!
//! ## Two independent passes
//!
//! Text and images are extracted in separate passes over the same byte
//! buffer. Each pass opens the document fresh, so an unreadable text layer
//! never poisons image recovery (and vice versa), and the caller can invoke
//! either any number of times.

use crate::error::{AnalysisWarning, PdfSumError};
use crate::output::ExtractedImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// Images at or below this many pixels on either axis are treated as
/// decoration (icons, bullets, glyphs) and dropped.
pub const MIN_CONTENT_DIMENSION: u32 = 100;

/// True for images large enough on both axes to presumably carry content.
pub(crate) fn is_content_bearing(width: u32, height: u32) -> bool {
    width > MIN_CONTENT_DIMENSION && height > MIN_CONTENT_DIMENSION
}

/// Extract the document's text layer.
///
/// Per-page text is concatenated with a trailing `\n` per non-empty page;
/// pages with no extractable text (pure-image pages) contribute nothing,
/// not even a separator.
///
/// # Errors
/// [`PdfSumError::ReadError`] when the document (or any page's text layer)
/// cannot be parsed.
pub async fn extract_text(pdf: &[u8]) -> Result<String, PdfSumError> {
    let data = pdf.to_vec();
    tokio::task::spawn_blocking(move || extract_text_blocking(&data))
        .await
        .map_err(|e| PdfSumError::Internal(format!("Text extraction task panicked: {e}")))?
}

fn extract_text_blocking(data: &[u8]) -> Result<String, PdfSumError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|e| PdfSumError::ReadError {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for page in pages.iter() {
        let page_text = page
            .text()
            .map_err(|e| PdfSumError::ReadError {
                detail: format!("{e:?}"),
            })?
            .all();

        if !page_text.is_empty() {
            text.push_str(&page_text);
            text.push('\n');
        }
    }

    debug!("Extracted {} chars of text", text.chars().count());
    Ok(text)
}

/// Extract content-bearing embedded images, in page order then in-page
/// discovery order.
///
/// Never fails the caller: a document that cannot be opened yields an empty
/// list plus one [`AnalysisWarning::ImageExtraction`]; an individual image
/// that fails to decode is skipped with an
/// [`AnalysisWarning::ImageDecode`] and extraction continues.
pub async fn extract_images(pdf: &[u8]) -> (Vec<ExtractedImage>, Vec<AnalysisWarning>) {
    let data = pdf.to_vec();
    match tokio::task::spawn_blocking(move || extract_images_blocking(&data)).await {
        Ok(result) => result,
        Err(e) => (
            Vec::new(),
            vec![AnalysisWarning::ImageExtraction {
                detail: format!("extraction task panicked: {e}"),
            }],
        ),
    }
}

fn extract_images_blocking(data: &[u8]) -> (Vec<ExtractedImage>, Vec<AnalysisWarning>) {
    let mut images = Vec::new();
    let mut warnings = Vec::new();

    let pdfium = Pdfium::default();
    let document = match pdfium.load_pdf_from_byte_slice(data, None) {
        Ok(d) => d,
        Err(e) => {
            warn!("Cannot open PDF for image extraction: {:?}", e);
            warnings.push(AnalysisWarning::ImageExtraction {
                detail: format!("{e:?}"),
            });
            return (images, warnings);
        }
    };

    for (page_idx, page) in document.pages().iter().enumerate() {
        let page_num = page_idx + 1;
        let mut index_on_page = 0usize;

        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };
            let current_index = index_on_page;
            index_on_page += 1;

            match image_object.get_raw_image() {
                Ok(img) if is_content_bearing(img.width(), img.height()) => {
                    debug!(
                        "Page {}: keeping {}x{} image",
                        page_num,
                        img.width(),
                        img.height()
                    );
                    images.push(ExtractedImage {
                        page: page_num,
                        index_on_page: current_index,
                        image: img,
                    });
                }
                Ok(img) => {
                    debug!(
                        "Page {}: dropping {}x{} decorative image",
                        page_num,
                        img.width(),
                        img.height()
                    );
                }
                Err(e) => {
                    warn!(
                        "Page {}: image {} failed to decode: {:?}",
                        page_num, current_index, e
                    );
                    warnings.push(AnalysisWarning::ImageDecode {
                        page: page_num,
                        index: current_index,
                        detail: format!("{e:?}"),
                    });
                }
            }
        }
    }

    info!(
        "Image extraction: {} kept, {} warnings",
        images.len(),
        warnings.len()
    );
    (images, warnings)
}
