//! Configuration for both pipelines.
//!
//! Everything tunable lives in [`ToolConfig`], built through
//! [`ToolConfigBuilder`]. The defaults reproduce the classic behaviour: the
//! current directory as workspace, 300 DPI PNG pages named `001.png`,
//! `002.png`, … and merged output named `<folder>_converted.pdf`.

use crate::error::PagekitError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rendering resolution.
pub const MIN_DPI: u32 = 72;
/// Highest accepted rendering resolution.
pub const MAX_DPI: u32 = 600;

/// Configuration shared by the decompose and compose pipelines.
///
/// # Example
/// ```rust
/// use pdf_pagekit::ToolConfig;
///
/// let config = ToolConfig::builder()
///     .root("/tmp/scans")
///     .dpi(150)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ToolConfig {
    /// Workspace root: scanned for candidates, receives all output. Default: `.`.
    pub root: PathBuf,

    /// Rendering resolution for decompose, and the pixel-to-point ratio used
    /// when composing. Range: 72–600. Default: 300.
    ///
    /// Using the same value in both directions means a decompose → compose
    /// round trip gives back pages of the original physical size.
    pub dpi: u32,

    /// Cap on either edge of a rendered page, in pixels. Default: 16 000.
    ///
    /// An A0 poster at 300 DPI is roughly 9 900 × 14 000 px; anything larger
    /// is scaled down proportionally instead of exhausting memory.
    pub max_rendered_pixels: u32,

    /// Image file extension, without the dot, matched case-insensitively.
    /// Default: `png`.
    pub image_extension: String,

    /// Suffix appended to composed PDFs, and used to skip them when listing
    /// PDFs to decompose. Default: `_converted`.
    pub converted_suffix: String,

    /// Zero-padding width of page image names. Default: 3 (`001.png`).
    pub page_name_width: usize,

    /// Receives per-item and per-page events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dpi: 300,
            max_rendered_pixels: 16_000,
            image_extension: "png".to_string(),
            converted_suffix: "_converted".to_string(),
            page_name_width: 3,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ToolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolConfig")
            .field("root", &self.root)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("image_extension", &self.image_extension)
            .field("converted_suffix", &self.converted_suffix)
            .field("page_name_width", &self.page_name_width)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ToolConfig {
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder {
            config: Self::default(),
        }
    }

    /// File name of the PDF composed from `folder_name`.
    pub fn converted_file_name(&self, folder_name: &str) -> String {
        format!("{folder_name}{}.pdf", self.converted_suffix)
    }

    /// File name of the image for 1-based page `page_num`.
    pub fn page_file_name(&self, page_num: usize) -> String {
        format!(
            "{:0width$}.{}",
            page_num,
            self.image_extension,
            width = self.page_name_width
        )
    }
}

#[derive(Debug)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn image_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.image_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn converted_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.converted_suffix = suffix.into();
        self
    }

    pub fn page_name_width(mut self, width: usize) -> Self {
        self.config.page_name_width = width;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ToolConfig, PagekitError> {
        let c = &self.config;
        if !(MIN_DPI..=MAX_DPI).contains(&c.dpi) {
            return Err(PagekitError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.image_extension.is_empty() {
            return Err(PagekitError::InvalidConfig(
                "Image extension must not be empty".into(),
            ));
        }
        if c.converted_suffix.is_empty() {
            // An empty suffix would make compose overwrite the PDFs that
            // decompose reads from.
            return Err(PagekitError::InvalidConfig(
                "Converted suffix must not be empty".into(),
            ));
        }
        if c.page_name_width == 0 {
            return Err(PagekitError::InvalidConfig(
                "Page name width must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
