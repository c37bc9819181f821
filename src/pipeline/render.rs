//! PDF rasterisation: render every page of a document via pdfium.
//!
//! Pages are scaled by `dpi / 72` (PDF user space is 72 points per inch),
//! with `max_pixels` as a hard cap on either edge so an oversized page
//! cannot exhaust memory.

use crate::engine::{PageSink, RasterOptions};
use crate::error::ItemError;
use pdfium_render::prelude::*;
use image::DynamicImage;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// How far into the file pdfium looks for the `%PDF` header.
const HEADER_SEARCH_LEN: u64 = 1024;

/// Fail early with [`ItemError::NotAPdf`] unless `%PDF` occurs within the
/// first 1024 bytes of `path`.
///
/// A byte-order mark or blank lines before the header are accepted, as
/// pdfium accepts them. Files shorter than four bytes are left to pdfium to
/// reject.
pub fn check_pdf_magic(path: &Path) -> Result<(), ItemError> {
    let io_err = |source| ItemError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;

    let mut head = Vec::with_capacity(HEADER_SEARCH_LEN as usize);
    file.take(HEADER_SEARCH_LEN)
        .read_to_end(&mut head)
        .map_err(io_err)?;

    if head.len() < 4 || head.windows(4).any(|w| w == b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&head[..4]);
    Err(ItemError::NotAPdf {
        path: path.to_path_buf(),
        magic,
    })
}

fn open<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, ItemError> {
    check_pdf_magic(path)?;
    pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ItemError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("{e:?}"),
        })
}

/// Render each page of `path` in order and hand it to `sink`.
pub fn rasterize_document(
    pdfium: &Pdfium,
    path: &Path,
    options: &RasterOptions,
    sink: &mut dyn PageSink,
) -> Result<usize, ItemError> {
    let document = open(pdfium, path)?;
    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("{}: {} pages", path.display(), total_pages);
    sink.begin(total_pages);

    let max_px = options.max_pixels.min(i32::MAX as u32) as i32;
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(options.dpi as f32 / 72.0)
        .set_maximum_width(max_px)
        .set_maximum_height(max_px);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ItemError::RenderFailed {
                    page: page_num,
                    detail: format!("{e:?}"),
                })?;

        // pdfium renders BGRA with an opaque alpha channel; pages are stored
        // as RGB.
        let image = DynamicImage::ImageRgb8(bitmap.as_image().to_rgb8());
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        sink.page(page_num, image)?;
    }

    Ok(total_pages)
}
