//! # pdfium-fetch
//!
//! Find a usable [PDFium](https://pdfium.googlesource.com/pdfium/) shared
//! library for `pdfium-render`, downloading it once if nothing is installed.
//!
//! ## Resolution order
//!
//! [`ensure_library`] walks these sources and stops at the first hit:
//!
//! 1. `PDFIUM_LIB_PATH` — an explicit path to `libpdfium` / `pdfium.dll`.
//! 2. The per-version cache directory of the calling application
//!    (see [`LibraryCache`]).
//! 3. A fresh download of the platform archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    unpacked into the cache.
//!
//! ```rust,no_run
//! use pdfium_fetch::{bind_library, ensure_library, LibraryCache};
//!
//! let cache = LibraryCache::for_app("pagekit");
//! let path = ensure_library(&cache, None).expect("pdfium unavailable");
//! let pdfium = bind_library(&path).expect("bind failed");
//! ```
//!
//! ## Environment variables
//!
//! - `PDFIUM_LIB_PATH` — use this library, skip the cache and the network.
//! - `PDFIUM_CACHE_DIR` — base directory for the cache instead of the
//!   platform cache directory.

use std::io::Read;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Environment variable naming an existing pdfium library.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache base directory.
pub const CACHE_DIR_ENV: &str = "PDFIUM_CACHE_DIR";

/// Download progress sink: `(bytes_so_far, content_length)`.
pub type DownloadProgress<'a> = &'a dyn Fn(u64, Option<u64>);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No pdfium build is published for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Cannot prepare cache directory '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download of '{url}' failed: {reason}")]
    Download { url: String, reason: String },

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind pdfium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    #[error("No system pdfium library could be loaded: {0}")]
    SystemLibrary(String),
}

/// Where a platform's library lives inside the release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Release asset, e.g. `pdfium-linux-x64.tgz`.
    pub archive: &'static str,
    /// Path of the library inside the archive.
    pub member: &'static str,
    /// File name the library is stored under on disk.
    pub lib_name: &'static str,
}

const MAC_DYLIB: (&str, &str) = ("lib/libpdfium.dylib", "libpdfium.dylib");
const LINUX_SO: (&str, &str) = ("lib/libpdfium.so", "libpdfium.so");
const WIN_DLL: (&str, &str) = ("bin/pdfium.dll", "pdfium.dll");

impl Platform {
    /// Look up the release asset for an `(os, arch)` pair as spelled by
    /// `std::env::consts`.
    pub fn for_target(os: &str, arch: &str) -> Option<Self> {
        let (archive, (member, lib_name)) = match (os, arch) {
            ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", MAC_DYLIB),
            ("macos", "x86_64") => ("pdfium-mac-x64.tgz", MAC_DYLIB),
            ("linux", "x86_64") => ("pdfium-linux-x64.tgz", LINUX_SO),
            ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", LINUX_SO),
            ("windows", "x86_64") => ("pdfium-win-x64.tgz", WIN_DLL),
            ("windows", "aarch64") => ("pdfium-win-arm64.tgz", WIN_DLL),
            ("windows", "x86") => ("pdfium-win-x86.tgz", WIN_DLL),
            _ => return None,
        };
        Some(Self {
            archive,
            member,
            lib_name,
        })
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Result<Self, FetchError> {
        let (os, arch) = (std::env::consts::OS, std::env::consts::ARCH);
        Self::for_target(os, arch).ok_or_else(|| FetchError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
    }

    fn download_url(&self) -> String {
        format!("{BASE_URL}/chromium%2F{PDFIUM_VERSION}/{}", self.archive)
    }
}

/// Versioned cache directory for one application.
///
/// Defaults to `<platform cache dir>/<app>/pdfium-<VERSION>/`, e.g.
/// `~/.cache/pagekit/pdfium-7690/` on Linux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCache {
    dir: PathBuf,
}

impl LibraryCache {
    /// Cache for `app`, honouring `PDFIUM_CACHE_DIR`.
    pub fn for_app(app: &str) -> Self {
        let base = match std::env::var_os(CACHE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::cache_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
                .unwrap_or_else(std::env::temp_dir)
                .join(app),
        };
        Self::at(base)
    }

    /// Cache rooted at an explicit base directory.
    pub fn at(base: impl Into<PathBuf>) -> Self {
        Self {
            dir: base.into().join(format!("pdfium-{PDFIUM_VERSION}")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn library_path(&self, platform: &Platform) -> PathBuf {
        self.dir.join(platform.lib_name)
    }
}

/// A library path that needs neither network nor extraction, if any.
pub fn locate_library(cache: &LibraryCache) -> Option<PathBuf> {
    if let Some(p) = env_library_path() {
        if p.exists() {
            return Some(p);
        }
    }
    let platform = Platform::current().ok()?;
    let cached = cache.library_path(&platform);
    cached.exists().then_some(cached)
}

/// Return a path to a pdfium library, downloading it into `cache` if needed.
///
/// `on_progress` is called every 64 KiB while downloading.
pub fn ensure_library(
    cache: &LibraryCache,
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<PathBuf, FetchError> {
    if let Some(p) = env_library_path() {
        if p.exists() {
            return Ok(p);
        }
        eprintln!(
            "pdfium-fetch: {LIB_PATH_ENV} '{}' does not exist; falling back to the cache",
            p.display()
        );
    }

    let platform = Platform::current()?;
    let lib_path = cache.library_path(&platform);
    if lib_path.exists() {
        return Ok(lib_path);
    }

    std::fs::create_dir_all(cache.dir()).map_err(|source| FetchError::CacheDir {
        path: cache.dir().to_path_buf(),
        source,
    })?;

    let archive = download(&platform.download_url(), on_progress)?;
    extract_member(&archive, platform.member, &lib_path)?;
    Ok(lib_path)
}

/// Bind to the pdfium library at `path`.
pub fn bind_library(path: &Path) -> Result<Pdfium, FetchError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| FetchError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Bind to whatever pdfium the OS loader can find.
pub fn bind_system_library() -> Result<Pdfium, FetchError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| FetchError::SystemLibrary(e.to_string()))
}

fn env_library_path() -> Option<PathBuf> {
    std::env::var_os(LIB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn download(url: &str, on_progress: Option<DownloadProgress<'_>>) -> Result<Vec<u8>, FetchError> {
    let fail = |reason: String| FetchError::Download {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-fetch/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| fail(e.to_string()))?;

    let mut response = client.get(url).send().map_err(|e| fail(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(32 * 1024 * 1024) as usize);
    let mut chunk = vec![0u8; 64 * 1024];
    let mut downloaded = 0u64;

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                downloaded += n as u64;
                if let Some(cb) = on_progress {
                    cb(downloaded, total);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(fail(format!("read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Unpack one file of a gzipped tarball to `dest`.
///
/// The file is written next to `dest` first and renamed into place, so an
/// interrupted extraction never leaves a half-written library in the cache.
fn extract_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), FetchError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let extract = |e: std::io::Error| FetchError::Extract(e.to_string());
    let mut archive = Archive::new(GzDecoder::new(archive));

    for entry in archive.entries().map_err(extract)? {
        let mut entry = entry.map_err(extract)?;
        if entry.path().map_err(extract)?.to_string_lossy() != member {
            continue;
        }

        let partial = dest.with_extension("partial");
        entry
            .unpack(&partial)
            .map_err(|e| FetchError::Extract(format!("unpack '{member}': {e}")))?;
        std::fs::rename(&partial, dest)
            .map_err(|e| FetchError::Extract(format!("move into cache: {e}")))?;
        return Ok(());
    }

    Err(FetchError::Extract(format!(
        "'{member}' not found in archive"
    )))
}
