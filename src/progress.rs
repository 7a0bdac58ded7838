//! Progress-callback trait for strategy-level conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the orchestrator works through its strategies. The callback is
//! the only channel from the conversion thread to the caller: there is no
//! shared status variable to poll. [`crate::stream::convert_stream`] is built
//! on top of it and forwards every call as a [`crate::stream::ConversionEvent`].
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2doc::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct StepCounter {
//!     steps: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for StepCounter {
//!     fn on_step(&self, strategy: &str, message: &str) {
//!         self.steps.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{strategy}] {message}");
//!     }
//! }
//!
//! let counter = Arc::new(StepCounter { steps: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{ConversionResult, Substitution};
use crate::request::TargetFormat;
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as a conversion progresses.
///
/// Implementations must be `Send + Sync` because the conversion usually runs
/// on a blocking thread while the caller renders on another. All methods have
/// default no-op implementations so callers only override what they care
/// about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first strategy runs.
    fn on_conversion_start(&self, source: &Path, format: TargetFormat) {
        let _ = (source, format);
    }

    /// Called before each strategy.
    ///
    /// # Arguments
    /// * `strategy` — strategy name
    /// * `index`    — 1-indexed position in the chain
    /// * `total`    — number of strategies in the chain
    fn on_strategy_start(&self, strategy: &str, index: usize, total: usize) {
        let _ = (strategy, index, total);
    }

    /// A human-readable step inside a strategy ("Extracting text…").
    fn on_step(&self, strategy: &str, message: &str) {
        let _ = (strategy, message);
    }

    /// Called when a strategy fails and control passes to the next one.
    fn on_strategy_failed(&self, strategy: &str, detail: &str) {
        let _ = (strategy, detail);
    }

    /// DOC could not be produced; DOCX is delivered instead.
    fn on_substitution(&self, substitution: &Substitution) {
        let _ = substitution;
    }

    /// Called exactly once with the terminal result.
    fn on_conversion_complete(&self, result: &ConversionResult) {
        let _ = result;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        strategies: AtomicUsize,
        steps: AtomicUsize,
        failures: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_strategy_start(&self, _strategy: &str, _index: usize, _total: usize) {
            self.strategies.fetch_add(1, Ordering::SeqCst);
        }

        fn on_step(&self, _strategy: &str, _message: &str) {
            self.steps.fetch_add(1, Ordering::SeqCst);
        }

        fn on_strategy_failed(&self, _strategy: &str, _detail: &str) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(Path::new("a.pdf"), TargetFormat::Docx);
        cb.on_strategy_start("plain-text", 2, 3);
        cb.on_step("plain-text", "Extracting text");
        cb.on_strategy_failed("plain-text", "pandoc missing");
        cb.on_substitution(&Substitution {
            requested: TargetFormat::Doc,
            delivered: TargetFormat::Docx,
        });
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_strategy_start("rich-reconstruction", 1, 3);
        tracker.on_step("rich-reconstruction", "Rendering SVG");
        tracker.on_strategy_failed("rich-reconstruction", "boom");
        tracker.on_strategy_start("plain-text", 2, 3);
        tracker.on_step("plain-text", "Extracting text");

        assert_eq!(tracker.strategies.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.steps.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_step("odt-bridge", "Trying final rescue method");
    }
}
