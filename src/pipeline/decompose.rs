//! Decompose: every selected PDF becomes a folder of page images.
//!
//! `report.pdf` → `report/001.png`, `report/002.png`, … in the workspace
//! root. An existing folder is reused and same-named pages are overwritten.

use crate::config::ToolConfig;
use crate::engine::{PageSink, PdfEngine, RasterOptions};
use crate::error::ItemError;
use crate::progress::ProgressCallback;
use crate::report::{Artifact, BatchReport, ItemOutcome};
use crate::workspace::Candidate;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Writes rendered pages into the output folder.
struct FolderSink<'a> {
    config: &'a ToolConfig,
    folder: &'a Path,
    format: ImageFormat,
    progress: Option<&'a ProgressCallback>,
    total_pages: usize,
}

impl PageSink for FolderSink<'_> {
    fn begin(&mut self, total_pages: usize) {
        self.total_pages = total_pages;
        if let Some(cb) = self.progress {
            cb.on_units_known(total_pages);
        }
    }

    fn page(&mut self, page_num: usize, image: DynamicImage) -> Result<(), ItemError> {
        let path = self.folder.join(self.config.page_file_name(page_num));
        image
            .save_with_format(&path, self.format)
            .map_err(|e| ItemError::ImageWriteFailed {
                path: path.clone(),
                detail: e.to_string(),
            })?;

        if let Some(cb) = self.progress {
            cb.on_unit_complete(page_num, self.total_pages);
        }
        Ok(())
    }
}

/// Output folder for a document: `<root>/<stem>`.
pub fn output_folder(config: &ToolConfig, pdf: &Candidate) -> PathBuf {
    config.root.join(pdf.stem())
}

/// Decompose one document.
pub fn decompose_one(
    config: &ToolConfig,
    engine: &dyn PdfEngine,
    pdf: &Candidate,
) -> Result<Artifact, ItemError> {
    let format = ImageFormat::from_extension(&config.image_extension).unwrap_or(ImageFormat::Png);
    let folder = output_folder(config, pdf);

    std::fs::create_dir_all(&folder).map_err(|source| ItemError::OutputDirFailed {
        path: folder.clone(),
        source,
    })?;

    let mut sink = FolderSink {
        config,
        folder: &folder,
        format,
        progress: config.progress_callback.as_ref(),
        total_pages: 0,
    };
    let options = RasterOptions {
        dpi: config.dpi,
        max_pixels: config.max_rendered_pixels,
    };

    let pages = engine.rasterize(&pdf.path, &options, &mut sink)?;
    Ok(Artifact::PageFolder {
        path: folder,
        pages,
    })
}

/// Decompose every selected document, one at a time.
///
/// A failing document is recorded in the report and the next one is
/// processed; pages already written for it are left in place.
pub fn decompose(config: &ToolConfig, engine: &dyn PdfEngine, selection: &[Candidate]) -> BatchReport {
    let start = Instant::now();
    let progress = config.progress_callback.as_ref();
    let total = selection.len();

    info!("Decomposing {} PDF(s) at {} DPI", total, config.dpi);
    if let Some(cb) = progress {
        cb.on_batch_start(total);
    }

    let mut outcomes = Vec::with_capacity(total);
    for (idx, pdf) in selection.iter().enumerate() {
        if let Some(cb) = progress {
            cb.on_item_start(&pdf.name, idx + 1, total);
        }

        let result = decompose_one(config, engine, pdf);
        match &result {
            Ok(artifact) => {
                info!(
                    "{} → {} ({} pages)",
                    pdf.name,
                    artifact.path().display(),
                    artifact.pages()
                );
                if let Some(cb) = progress {
                    cb.on_item_complete(&pdf.name, artifact.pages());
                }
            }
            Err(e) => {
                warn!("{}: {}", pdf.name, e);
                if let Some(cb) = progress {
                    cb.on_item_error(&pdf.name, &e.to_string());
                }
            }
        }

        outcomes.push(ItemOutcome {
            name: pdf.name.clone(),
            result,
        });
    }

    let report = BatchReport {
        outcomes,
        duration: start.elapsed(),
    };
    if let Some(cb) = progress {
        cb.on_batch_complete(report.total(), report.succeeded());
    }
    report
}
