//! Compose: every selected image folder becomes one PDF.
//!
//! `report/` → `report_converted.pdf` in the workspace root, pages in
//! ascending file-name order. The PDF is written to a temporary file in the
//! root and then moved over the destination, so an existing output is only
//! replaced by a complete document.

use crate::config::ToolConfig;
use crate::engine::PdfEngine;
use crate::error::ItemError;
use crate::report::{Artifact, BatchReport, ItemOutcome};
use crate::workspace::{list_images, Candidate};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Destination for a folder: `<root>/<folder><suffix>.pdf`.
pub fn output_pdf(config: &ToolConfig, folder: &Candidate) -> PathBuf {
    config.root.join(config.converted_file_name(&folder.name))
}

/// Compose one folder.
pub fn compose_one(
    config: &ToolConfig,
    engine: &dyn PdfEngine,
    folder: &Candidate,
) -> Result<Artifact, ItemError> {
    let images = list_images(&folder.path, &config.image_extension).map_err(|source| {
        ItemError::Io {
            path: folder.path.clone(),
            source,
        }
    })?;
    if images.is_empty() {
        return Err(ItemError::NoImages {
            path: folder.path.clone(),
            extension: config.image_extension.clone(),
        });
    }

    let dest = output_pdf(config, folder);
    let progress = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_units_known(images.len());
    }

    let staging = tempfile::Builder::new()
        .prefix(".pagekit-")
        .suffix(".pdf.tmp")
        .tempfile_in(&config.root)
        .map_err(|source| ItemError::Io {
            path: config.root.clone(),
            source,
        })?;
    debug!("Staging {} at {}", dest.display(), staging.path().display());

    let total = images.len();
    let pages = engine.assemble(&images, config.dpi, staging.path(), &mut |page| {
        if let Some(cb) = progress {
            cb.on_unit_complete(page, total);
        }
    })?;

    staging
        .persist(&dest)
        .map_err(|e| ItemError::OutputWriteFailed {
            path: dest.clone(),
            detail: e.error.to_string(),
        })?;

    Ok(Artifact::MergedPdf { path: dest, pages })
}

/// Compose every selected folder, one at a time.
pub fn compose(config: &ToolConfig, engine: &dyn PdfEngine, selection: &[Candidate]) -> BatchReport {
    let start = Instant::now();
    let progress = config.progress_callback.as_ref();
    let total = selection.len();

    info!("Composing {} folder(s)", total);
    if let Some(cb) = progress {
        cb.on_batch_start(total);
    }

    let mut outcomes = Vec::with_capacity(total);
    for (idx, folder) in selection.iter().enumerate() {
        if let Some(cb) = progress {
            cb.on_item_start(&folder.name, idx + 1, total);
        }

        let result = compose_one(config, engine, folder);
        match &result {
            Ok(artifact) => {
                info!(
                    "{} → {} ({} pages)",
                    folder.name,
                    artifact.path().display(),
                    artifact.pages()
                );
                if let Some(cb) = progress {
                    cb.on_item_complete(&folder.name, artifact.pages());
                }
            }
            Err(e) => {
                warn!("{}: {}", folder.name, e);
                if let Some(cb) = progress {
                    cb.on_item_error(&folder.name, &e.to_string());
                }
            }
        }

        outcomes.push(ItemOutcome {
            name: folder.name.clone(),
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
