//! Progress-callback trait for batch conversion events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ToolConfigBuilder::progress_callback`] to follow a batch
//! as it runs. The library never draws anything itself; the `pagekit`
//! binary turns these events into `indicatif` progress bars.
//!
//! A *unit* is a page: a rendered page when decomposing, an appended image
//! when composing.
//!
//! # Example
//!
//! ```rust
//! use pdf_pagekit::{BatchProgressCallback, ToolConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter(AtomicUsize);
//!
//! impl BatchProgressCallback for PageCounter {
//!     fn on_unit_complete(&self, _unit: usize, _total_units: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = ToolConfig::builder()
//!     .progress_callback(Arc::new(PageCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipelines as they work through a selection.
///
/// Every method has a no-op default. Calls arrive in order on the thread
/// running the pipeline: `on_batch_start`, then per item `on_item_start`,
/// optionally `on_units_known` and `on_unit_complete`, then exactly one of
/// `on_item_complete` / `on_item_error`, and finally `on_batch_complete`.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first item.
    fn on_batch_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called when work on an item begins.
    ///
    /// * `position` — 1-based position within the batch
    fn on_item_start(&self, name: &str, position: usize, total_items: usize) {
        let _ = (name, position, total_items);
    }

    /// Called once the number of pages of the current item is known.
    fn on_units_known(&self, total_units: usize) {
        let _ = total_units;
    }

    /// Called after each page of the current item (1-based `unit`).
    fn on_unit_complete(&self, unit: usize, total_units: usize) {
        let _ = (unit, total_units);
    }

    /// Called when the current item produced its output.
    fn on_item_complete(&self, name: &str, units: usize) {
        let _ = (name, units);
    }

    /// Called when the current item failed; the batch continues.
    fn on_item_error(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called once after every item was attempted.
    fn on_batch_complete(&self, total_items: usize, succeeded: usize) {
        let _ = (total_items, succeeded);
    }
}

/// Callback that ignores every event.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// The form stored in [`crate::config::ToolConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
