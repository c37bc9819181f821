//! CLI binary for pdf-pagekit.
//!
//! Maps flags to a `ToolConfig`, wires terminal progress bars into the
//! library callbacks and hands stdin/stdout to the interactive session.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_pagekit::config::{MAX_DPI, MIN_DPI};
use pdf_pagekit::engine::CACHE_APP_NAME;
use pdf_pagekit::{
    BatchProgressCallback, PagekitError, PdfEngine, PdfiumEngine, ProgressCallback, Session,
    ToolConfig,
};
use pdfium_fetch::{DownloadProgress, LibraryCache};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar per batch, reset for every item; page lines are printed above it.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn current(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|b| b.clone())
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS)
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_items: usize) {
        let bar = ProgressBar::new(0);
        bar.set_style(Self::spinner_style());
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_items} item(s)…"))
        ));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_item_start(&self, name: &str, position: usize, total_items: usize) {
        if let Some(bar) = self.current() {
            bar.set_style(Self::spinner_style());
            bar.set_prefix(format!("{position}/{total_items}"));
            bar.set_message(format!("Opening {name}…"));
            bar.set_position(0);
            bar.reset_elapsed();
            bar.println(format!("{} {}", cyan("▶"), name));
        }
    }

    fn on_units_known(&self, total_units: usize) {
        if let Some(bar) = self.current() {
            bar.set_length(total_units as u64);
            bar.set_style(Self::bar_style());
        }
    }

    fn on_unit_complete(&self, unit: usize, _total_units: usize) {
        if let Some(bar) = self.current() {
            bar.set_position(unit as u64);
        }
    }

    fn on_item_complete(&self, name: &str, units: usize) {
        if let Some(bar) = self.current() {
            bar.println(format!(
                "  {} {}  {}",
                green("✓"),
                name,
                dim(&format!("{units} pages, {:.1}s", bar.elapsed().as_secs_f64()))
            ));
        }
    }

    fn on_item_error(&self, name: &str, error: &str) {
        // Keep error lines on one terminal row.
        let msg = match error.char_indices().nth(100) {
            Some((cut, _)) => format!("{}…", &error[..cut]),
            None => error.to_string(),
        };
        if let Some(bar) = self.current() {
            bar.println(format!("  {} {}  {}", red("✗"), name, red(&msg)));
        }
    }

    fn on_batch_complete(&self, total_items: usize, succeeded: usize) {
        let bar = self.bar.lock().ok().and_then(|mut b| b.take());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        let failed = total_items.saturating_sub(succeeded);
        if failed == 0 {
            eprintln!(
                "{} {} item(s) done",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} item(s) done  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total_items,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Work in the current directory
  pagekit

  # Work in another directory, rendering at 150 DPI
  pagekit -C ~/scans --dpi 150

At the menu choose 1 to split PDFs into page images (report.pdf -> report/001.png, ...)
or 2 to merge image folders into PDFs (report/ -> report_converted.pdf).
Pick items by number ('1 3 5', '1,2') or type 'all'.

ENVIRONMENT:
  PAGEKIT_DIR        Workspace directory (same as -C)
  PAGEKIT_DPI        Rendering resolution (same as --dpi)
  PDFIUM_LIB_PATH    Use this pdfium library instead of downloading one
  PDFIUM_CACHE_DIR   Where the downloaded pdfium library is cached
  RUST_LOG           Log filter, overrides -v / -q
"#;

#[derive(Parser, Debug)]
#[command(
    name = "pagekit",
    version,
    about = "Split PDFs into page images and merge image folders back into PDFs",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Workspace directory: scanned for PDFs and image folders, receives all output.
    #[arg(short = 'C', long = "dir", env = "PAGEKIT_DIR", default_value = ".")]
    dir: PathBuf,

    /// Rendering resolution for decompose and page scale for compose.
    #[arg(long, env = "PAGEKIT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(MIN_DPI as i64..=MAX_DPI as i64))]
    dpi: u32,

    /// Disable progress bars.
    #[arg(long, env = "PAGEKIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGEKIT_VERBOSE")]
    verbose: bool,

    /// Only log errors and hide progress bars.
    #[arg(short, long, env = "PAGEKIT_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let show_progress = !cli.quiet && !cli.no_progress;

    let mut builder = ToolConfig::builder().root(&cli.dir).dpi(cli.dpi);
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;
    if !config.root.is_dir() {
        bail!("Workspace '{}' is not a directory", config.root.display());
    }
    tracing::debug!("{config:?}");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(
        config,
        stdin.lock(),
        stdout.lock(),
        Box::new(move || load_engine(show_progress)),
    );
    session.run().context("Terminal I/O failed")?;
    Ok(())
}

/// Bind pdfium, showing a download bar the first time it is fetched.
fn load_engine(show_progress: bool) -> Result<Box<dyn PdfEngine>, PagekitError> {
    let cache = LibraryCache::for_app(CACHE_APP_NAME);
    if !show_progress || pdfium_fetch::locate_library(&cache).is_some() {
        return Ok(Box::new(PdfiumEngine::load(&cache, None)?));
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.set_message("Connecting…");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    let on_progress: DownloadProgress<'_> = &move |downloaded: u64, total: Option<u64>| {
        if let Some(t) = total {
            if bar.length() != Some(t) {
                bar.set_length(t);
            }
        }
        bar.set_position(downloaded);
    };
    let engine = PdfiumEngine::load(&cache, Some(on_progress));
    dl_bar.finish_and_clear();

    let engine = engine?;
    eprintln!("{} PDF engine ready", green("✔"));
    Ok(Box::new(engine))
}
