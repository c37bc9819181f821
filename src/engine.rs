//! The PDF engine seam.
//!
//! Pipelines talk to [`PdfEngine`] only, so everything above this trait can
//! be tested without a pdfium library. [`PdfiumEngine`] is the production
//! implementation; the rendering and assembly code it delegates to lives in
//! [`crate::pipeline::render`] and [`crate::pipeline::assemble`].

use crate::error::{ItemError, PagekitError};
use crate::pipeline::{assemble, render};
use image::DynamicImage;
use pdfium_fetch::{DownloadProgress, LibraryCache};
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Application name used for the pdfium cache directory.
pub const CACHE_APP_NAME: &str = "pagekit";

/// How pages are rasterised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    pub dpi: u32,
    /// Neither edge of a rendered page exceeds this many pixels.
    pub max_pixels: u32,
}

/// Receives the pages of one document as they are rendered.
pub trait PageSink {
    /// Called once, before the first page.
    fn begin(&mut self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called for every page in order; `page_num` is 1-based.
    ///
    /// Returning an error stops rendering of the document.
    fn page(&mut self, page_num: usize, image: DynamicImage) -> Result<(), ItemError>;
}

/// Rasterisation and assembly primitives the pipelines need.
pub trait PdfEngine {
    /// Render every page of `pdf` into `sink`. Returns the page count.
    fn rasterize(
        &self,
        pdf: &Path,
        options: &RasterOptions,
        sink: &mut dyn PageSink,
    ) -> Result<usize, ItemError>;

    /// Write a PDF to `dest` with one page per image, in slice order.
    ///
    /// Pages are sized at `pixels × 72 / dpi` points. `on_page` is called
    /// with the 1-based page number after each page is added. Returns the
    /// page count.
    fn assemble(
        &self,
        images: &[PathBuf],
        dpi: u32,
        dest: &Path,
        on_page: &mut dyn FnMut(usize),
    ) -> Result<usize, ItemError>;
}

/// [`PdfEngine`] backed by a bound pdfium library.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Bind pdfium, downloading it into `cache` on first use.
    ///
    /// Falls back to the system library when the download fails, e.g. on an
    /// offline machine that has pdfium installed globally.
    pub fn load(
        cache: &LibraryCache,
        on_progress: Option<DownloadProgress<'_>>,
    ) -> Result<Self, PagekitError> {
        let fetched = pdfium_fetch::ensure_library(cache, on_progress)
            .and_then(|path| {
                info!("Binding pdfium from {}", path.display());
                pdfium_fetch::bind_library(&path)
            });

        let pdfium = match fetched {
            Ok(pdfium) => pdfium,
            Err(fetch_err) => {
                warn!("{fetch_err}; trying the system pdfium library");
                pdfium_fetch::bind_system_library().map_err(|system_err| {
                    PagekitError::EngineUnavailable(format!("{fetch_err}; {system_err}"))
                })?
            }
        };

        Ok(Self::new(pdfium))
    }

    /// Bind pdfium only if it is available without any download.
    pub fn load_offline(cache: &LibraryCache) -> Result<Self, PagekitError> {
        let path = pdfium_fetch::locate_library(cache).ok_or_else(|| {
            PagekitError::EngineUnavailable(format!(
                "no cached pdfium in {}",
                cache.dir().display()
            ))
        })?;
        pdfium_fetch::bind_library(&path)
            .map(Self::new)
            .map_err(|e| PagekitError::EngineUnavailable(e.to_string()))
    }
}

impl PdfEngine for PdfiumEngine {
    fn rasterize(
        &self,
        pdf: &Path,
        options: &RasterOptions,
        sink: &mut dyn PageSink,
    ) -> Result<usize, ItemError> {
        render::rasterize_document(&self.pdfium, pdf, options, sink)
    }

    fn assemble(
        &self,
        images: &[PathBuf],
        dpi: u32,
        dest: &Path,
        on_page: &mut dyn FnMut(usize),
    ) -> Result<usize, ItemError> {
        assemble::assemble_images(&self.pdfium, images, dpi, dest, on_page)
    }
}
