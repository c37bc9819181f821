//! # pdf-pagekit
//!
//! Split PDFs into page images and merge image folders back into PDFs,
//! driven by a small interactive menu.
//!
//! All work happens in one workspace directory:
//!
//! ```text
//! report.pdf            ──decompose──▶  report/001.png, report/002.png, …
//! report/*.png          ──compose────▶  report_converted.pdf
//! ```
//!
//! The user picks items from numbered lists ([`select`]). Each selected item
//! is processed independently; a failing document is reported and the batch
//! moves on ([`report::BatchReport`]).
//!
//! ## Library use
//!
//! ```rust,no_run
//! use pdf_pagekit::{decompose, workspace, PdfiumEngine, ToolConfig};
//! use pdf_pagekit::engine::CACHE_APP_NAME;
//! use pdfium_fetch::LibraryCache;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ToolConfig::builder().root("scans").dpi(150).build()?;
//! let engine = PdfiumEngine::load(&LibraryCache::for_app(CACHE_APP_NAME), None)?;
//!
//! let pdfs = workspace::pdf_candidates(&config)?;
//! let report = decompose(&config, &engine, &pdfs);
//! println!("{}/{} decomposed", report.succeeded(), report.total());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagekit` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod select;
pub mod session;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_helpers;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ToolConfig, ToolConfigBuilder};
pub use engine::{PageSink, PdfEngine, PdfiumEngine, RasterOptions};
pub use error::{ItemError, PagekitError};
pub use pipeline::compose::compose;
pub use pipeline::decompose::decompose;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{Artifact, BatchReport, ItemOutcome};
pub use select::{parse_selection, prompt_selection, SelectionError};
pub use session::{EngineLoader, MenuChoice, Session};
pub use workspace::Candidate;
