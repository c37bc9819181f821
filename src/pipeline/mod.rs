//! The two batch pipelines and the pdfium code behind them.
//!
//! ```text
//! decompose:  report.pdf ──▶ render ──▶ report/001.png, 002.png, …
//! compose:    report/*.png ──▶ assemble ──▶ report_converted.pdf
//! ```
//!
//! [`decompose`] and [`compose`] only see the [`crate::engine::PdfEngine`]
//! trait. [`render`] and [`assemble`] hold the pdfium calls used by
//! [`crate::engine::PdfiumEngine`].

pub mod assemble;
pub mod compose;
pub mod decompose;
pub mod render;
