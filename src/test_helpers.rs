//! Shared test utilities: temp workspaces, fixture files, and a recording
//! [`PdfEngine`] that never touches pdfium.

use crate::config::ToolConfig;
use crate::engine::{PageSink, PdfEngine, RasterOptions};
use crate::error::ItemError;
use crate::progress::BatchProgressCallback;
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A fresh temp directory and a default config rooted in it.
pub fn workspace() -> (TempDir, ToolConfig) {
    let tmp = TempDir::new().unwrap();
    let config = ToolConfig::builder().root(tmp.path()).build().unwrap();
    (tmp, config)
}

/// Create an empty file.
pub fn touch(path: &Path) {
    std::fs::write(path, b"").unwrap();
}

/// Write a solid-colour PNG of the given size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
        .save(path)
        .unwrap();
}

/// Engine double.
///
/// Rasterising produces small solid images for documents registered with
/// [`MockEngine::with_document`]. Assembling writes the image file names, one
/// per line, instead of a PDF. Names registered with [`MockEngine::failing`]
/// (a PDF file name or an image folder name) fail.
#[derive(Default)]
pub struct MockEngine {
    documents: HashMap<String, usize>,
    failing: HashSet<String>,
    raster_dpis: Mutex<Vec<u32>>,
    assemble_calls: Mutex<usize>,
}

impl MockEngine {
    pub const PAGE_WIDTH: u32 = 8;
    pub const PAGE_HEIGHT: u32 = 10;

    pub fn with_document(mut self, file_name: &str, pages: usize) -> Self {
        self.documents.insert(file_name.to_string(), pages);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn raster_dpis(&self) -> Vec<u32> {
        self.raster_dpis.lock().unwrap().clone()
    }

    pub fn assemble_calls(&self) -> usize {
        *self.assemble_calls.lock().unwrap()
    }

    /// Image names recorded in a file written by [`PdfEngine::assemble`].
    pub fn assembled_pages(pdf: &Path) -> Vec<String> {
        std::fs::read_to_string(pdf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn pages_of(&self, pdf: &Path) -> Result<usize, ItemError> {
        let name = file_name(pdf);
        if self.failing.contains(&name) {
            return Err(ItemError::CorruptPdf {
                path: pdf.to_path_buf(),
                detail: "mock failure".into(),
            });
        }
        self.documents
            .get(&name)
            .copied()
            .ok_or_else(|| ItemError::CorruptPdf {
                path: pdf.to_path_buf(),
                detail: "unknown mock document".into(),
            })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl PdfEngine for MockEngine {
    fn rasterize(
        &self,
        pdf: &Path,
        options: &RasterOptions,
        sink: &mut dyn PageSink,
    ) -> Result<usize, ItemError> {
        self.raster_dpis.lock().unwrap().push(options.dpi);
        let pages = self.pages_of(pdf)?;
        sink.begin(pages);
        for page_num in 1..=pages {
            let shade = (page_num % 256) as u8;
            let image = RgbaImage::from_pixel(
                Self::PAGE_WIDTH,
                Self::PAGE_HEIGHT,
                Rgba([shade, shade, shade, 255]),
            );
            sink.page(page_num, DynamicImage::ImageRgba8(image))?;
        }
        Ok(pages)
    }

    fn assemble(
        &self,
        images: &[PathBuf],
        _dpi: u32,
        dest: &Path,
        on_page: &mut dyn FnMut(usize),
    ) -> Result<usize, ItemError> {
        *self.assemble_calls.lock().unwrap() += 1;

        let folder = images
            .first()
            .and_then(|p| p.parent())
            .map(file_name)
            .unwrap_or_default();
        if self.failing.contains(&folder) {
            return Err(ItemError::OutputWriteFailed {
                path: dest.to_path_buf(),
                detail: "mock failure".into(),
            });
        }

        let mut listing = String::new();
        for (idx, image) in images.iter().enumerate() {
            listing.push_str(&file_name(image));
            listing.push('\n');
            on_page(idx + 1);
        }
        std::fs::write(dest, listing).map_err(|source| ItemError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(images.len())
    }
}

/// Progress callback that records every event as a short string.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl BatchProgressCallback for EventLog {
    fn on_batch_start(&self, total_items: usize) {
        self.push(format!("batch_start {total_items}"));
    }

    fn on_item_start(&self, name: &str, position: usize, total_items: usize) {
        self.push(format!("item_start {name} {position}/{total_items}"));
    }

    fn on_units_known(&self, total_units: usize) {
        self.push(format!("units {total_units}"));
    }

    fn on_unit_complete(&self, unit: usize, total_units: usize) {
        self.push(format!("unit {unit}/{total_units}"));
    }

    fn on_item_complete(&self, name: &str, units: usize) {
        self.push(format!("item_complete {name} {units}"));
    }

    fn on_item_error(&self, name: &str, _error: &str) {
        self.push(format!("item_error {name}"));
    }

    fn on_batch_complete(&self, total_items: usize, succeeded: usize) {
        self.push(format!("batch_complete {succeeded}/{total_items}"));
    }
}
