//! Candidate enumeration in the workspace root.
//!
//! Listings are non-recursive and sorted by name so the numbered menu is
//! stable between runs.

use crate::config::ToolConfig;
use crate::error::PagekitError;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What kind of filesystem entry a candidate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    File,
    /// A folder and the number of images directly inside it.
    Directory { image_count: usize },
}

/// A file or folder the user may pick from a numbered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub name: String,
    pub kind: CandidateKind,
}

impl Candidate {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            kind: CandidateKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, image_count: usize) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            kind: CandidateKind::Directory { image_count },
        }
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Menu line text: `name` for files, `name (N images)` for folders.
impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CandidateKind::File => write!(f, "{}", self.name),
            CandidateKind::Directory { image_count } => {
                let noun = if image_count == 1 { "image" } else { "images" };
                write!(f, "{} ({image_count} {noun})", self.name)
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `true` when `path` has extension `ext`, ignoring ASCII case.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// PDFs in `config.root` that are not outputs of a previous compose run.
pub fn pdf_candidates(config: &ToolConfig) -> Result<Vec<Candidate>, PagekitError> {
    let converted_tail = format!("{}.pdf", config.converted_suffix).to_lowercase();

    let mut pdfs: Vec<Candidate> = read_entries(&config.root)?
        .into_iter()
        .filter(|p| p.is_file() && has_extension(p, "pdf"))
        .filter(|p| {
            let skip = display_name(p).to_lowercase().ends_with(&converted_tail);
            if skip {
                debug!("Skipping composed output {}", p.display());
            }
            !skip
        })
        .map(Candidate::file)
        .collect();

    pdfs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(pdfs)
}

/// Sub-folders of `config.root` holding at least one image.
pub fn image_folder_candidates(config: &ToolConfig) -> Result<Vec<Candidate>, PagekitError> {
    let mut folders = Vec::new();

    for dir in read_entries(&config.root)?.into_iter().filter(|p| p.is_dir()) {
        match list_images(&dir, &config.image_extension) {
            Ok(images) if !images.is_empty() => {
                folders.push(Candidate::directory(dir, images.len()));
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable folder {}: {}", dir.display(), e),
        }
    }

    folders.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(folders)
}

/// Images directly inside `dir`, sorted ascending by file name.
///
/// The sort order is the page order of a composed PDF, so images must be
/// named such that lexicographic order is the intended order (`001.png`,
/// `002.png`, …).
pub fn list_images(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

fn read_entries(root: &Path) -> Result<Vec<PathBuf>, PagekitError> {
    let unreadable = |source| PagekitError::WorkspaceUnreadable {
        path: root.to_path_buf(),
        source,
    };

    std::fs::read_dir(root)
        .map_err(unreadable)?
        .map(|entry| entry.map(|e| e.path()).map_err(unreadable))
        .collect()
}
