//! Batch results.
//!
//! Every selected item yields exactly one [`ItemOutcome`], success or
//! failure, so a batch never stops at the first bad document.

use crate::error::ItemError;
use std::path::PathBuf;
use std::time::Duration;

/// What a successful item left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Decompose output: a folder holding one image per page.
    PageFolder { path: PathBuf, pages: usize },
    /// Compose output: a single merged PDF.
    MergedPdf { path: PathBuf, pages: usize },
}

impl Artifact {
    pub fn path(&self) -> &PathBuf {
        match self {
            Artifact::PageFolder { path, .. } | Artifact::MergedPdf { path, .. } => path,
        }
    }

    pub fn pages(&self) -> usize {
        match self {
            Artifact::PageFolder { pages, .. } | Artifact::MergedPdf { pages, .. } => *pages,
        }
    }
}

/// Result for one selected document or folder.
#[derive(Debug)]
pub struct ItemOutcome {
    /// Display name of the source item (file or folder name).
    pub name: String,
    pub result: Result<Artifact, ItemError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// All outcomes of one pipeline run, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &ItemError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }
}
