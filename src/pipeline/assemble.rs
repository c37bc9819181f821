//! PDF assembly: one page per image, sized from the image's pixels.

use crate::error::ItemError;
use image::GenericImageView;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Page edge in points for `pixels` rendered at `dpi`.
pub fn pixels_to_points(pixels: u32, dpi: u32) -> f32 {
    pixels as f32 * 72.0 / dpi as f32
}

/// Build a new document from `images` and save it to `dest`.
pub fn assemble_images(
    pdfium: &Pdfium,
    images: &[PathBuf],
    dpi: u32,
    dest: &Path,
    on_page: &mut dyn FnMut(usize),
) -> Result<usize, ItemError> {
    let write_failed = |e: PdfiumError| ItemError::OutputWriteFailed {
        path: dest.to_path_buf(),
        detail: format!("{e:?}"),
    };

    let mut document = pdfium.create_new_pdf().map_err(write_failed)?;

    for (idx, path) in images.iter().enumerate() {
        let image = image::open(path).map_err(|e| ItemError::ImageReadFailed {
            path: path.clone(),
            detail: e.to_string(),
        })?;

        let (width_px, height_px) = image.dimensions();
        let width = PdfPoints::new(pixels_to_points(width_px, dpi));
        let height = PdfPoints::new(pixels_to_points(height_px, dpi));

        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(width, height))
            .map_err(write_failed)?;

        let mut image_object = PdfPageImageObject::new(&document, &image).map_err(write_failed)?;
        image_object
            .scale(width.value, height.value)
            .map_err(write_failed)?;

        page.objects_mut()
            .add_object(PdfPageObject::Image(image_object))
            .map_err(write_failed)?;

        debug!(
            "Page {} ← {} ({}x{} px)",
            idx + 1,
            path.display(),
            width_px,
            height_px
        );
        on_page(idx + 1);
    }

    document.save_to_file(dest).map_err(write_failed)?;
    Ok(images.len())
}
