//! Error types for pdf-pagekit.
//!
//! Two error types reflect two failure modes:
//!
//! * [`PagekitError`] — the tool cannot do the requested work at all
//!   (bad configuration, unreadable workspace, no PDF engine). The session
//!   reports it and returns to the menu.
//!
//! * [`ItemError`] — one document or folder failed. It is stored in that
//!   item's [`crate::report::ItemOutcome`] and the batch moves on to the
//!   next item.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that are not tied to a single selected item.
#[derive(Debug, Error)]
pub enum PagekitError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The workspace root could not be listed.
    #[error("Cannot read workspace '{path}': {source}")]
    WorkspaceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No pdfium library could be located, downloaded or bound.
    #[error(
        "Failed to load the PDF engine: {0}\n\
PDFium is downloaded automatically on first use. If that failed:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy."
    )]
    EngineUnavailable(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure for one selected document or folder.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The file does not start with the `%PDF` signature.
    #[error("'{path}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// pdfium refused to open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Rasterising a page failed.
    #[error("Rendering page {page} failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The per-document output folder could not be created.
    #[error("Cannot create output folder '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rendered page could not be saved.
    #[error("Failed to write image '{path}': {detail}")]
    ImageWriteFailed { path: PathBuf, detail: String },

    /// A source image could not be decoded.
    #[error("Failed to read image '{path}': {detail}")]
    ImageReadFailed { path: PathBuf, detail: String },

    /// A folder selected for composing holds no images any more.
    #[error("No .{extension} images in '{path}'")]
    NoImages { path: PathBuf, extension: String },

    /// Building or saving the composed PDF failed.
    #[error("Failed to write PDF '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
