//! Streaming conversion API: progress events followed by the result.
//!
//! ## Why stream?
//!
//! A front end wants to show "Extracting text…", "Trying alternative
//! method…" as they happen and then the outcome. Rather than sharing status
//! variables between the conversion thread and the UI, [`convert_stream`]
//! runs the conversion on the blocking pool and forwards every progress
//! callback as a [`ConversionEvent`] over a channel. The stream always ends
//! with exactly one [`ConversionEvent::Finished`].

use crate::config::ConversionConfig;
use crate::convert;
use crate::output::{ConversionResult, Substitution};
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use crate::request::{ConversionRequest, TargetFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::warn;

/// One observable step of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConversionEvent {
    Started {
        source: PathBuf,
        format: TargetFormat,
    },
    StrategyStarted {
        strategy: String,
        index: usize,
        total: usize,
    },
    Step {
        strategy: String,
        message: String,
    },
    StrategyFailed {
        strategy: String,
        detail: String,
    },
    Substituted(Substitution),
    /// Always the last event.
    Finished(ConversionResult),
}

impl ConversionEvent {
    /// Text suitable for a progress line. `None` for [`Self::Finished`].
    pub fn describe(&self) -> Option<String> {
        match self {
            ConversionEvent::Started { source, format } => Some(format!(
                "Converting {} to {}…",
                source.display(),
                format.extension().to_uppercase()
            )),
            ConversionEvent::StrategyStarted {
                strategy,
                index,
                total,
            } => Some(format!("[{index}/{total}] {strategy}")),
            ConversionEvent::Step { message, .. } => Some(message.clone()),
            ConversionEvent::StrategyFailed { strategy, detail } => {
                Some(format!("{strategy} failed: {detail}"))
            }
            ConversionEvent::Substituted(s) => Some(s.to_string()),
            ConversionEvent::Finished(_) => None,
        }
    }
}

/// A boxed stream of conversion events.
pub type EventStream = Pin<Box<dyn Stream<Item = ConversionEvent> + Send>>;

/// Forwards progress callbacks into a channel, then to an optional inner
/// callback the caller had already configured.
struct ChannelProgress {
    tx: mpsc::UnboundedSender<ConversionEvent>,
    inner: Option<ProgressCallback>,
}

impl ChannelProgress {
    fn send(&self, event: ConversionEvent) {
        // The receiver only goes away when the caller dropped the stream.
        let _ = self.tx.send(event);
    }
}

impl ConversionProgressCallback for ChannelProgress {
    fn on_conversion_start(&self, source: &Path, format: TargetFormat) {
        self.send(ConversionEvent::Started {
            source: source.to_path_buf(),
            format,
        });
        if let Some(ref cb) = self.inner {
            cb.on_conversion_start(source, format);
        }
    }

    fn on_strategy_start(&self, strategy: &str, index: usize, total: usize) {
        self.send(ConversionEvent::StrategyStarted {
            strategy: strategy.to_string(),
            index,
            total,
        });
        if let Some(ref cb) = self.inner {
            cb.on_strategy_start(strategy, index, total);
        }
    }

    fn on_step(&self, strategy: &str, message: &str) {
        self.send(ConversionEvent::Step {
            strategy: strategy.to_string(),
            message: message.to_string(),
        });
        if let Some(ref cb) = self.inner {
            cb.on_step(strategy, message);
        }
    }

    fn on_strategy_failed(&self, strategy: &str, detail: &str) {
        self.send(ConversionEvent::StrategyFailed {
            strategy: strategy.to_string(),
            detail: detail.to_string(),
        });
        if let Some(ref cb) = self.inner {
            cb.on_strategy_failed(strategy, detail);
        }
    }

    fn on_substitution(&self, substitution: &Substitution) {
        self.send(ConversionEvent::Substituted(*substitution));
        if let Some(ref cb) = self.inner {
            cb.on_substitution(substitution);
        }
    }

    // `Finished` is sent by the driver task, so a panic escaping the
    // blocking task still ends the stream.
    fn on_conversion_complete(&self, result: &ConversionResult) {
        if let Some(ref cb) = self.inner {
            cb.on_conversion_complete(result);
        }
    }
}

/// Convert `request`, streaming progress events as they happen.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2doc::{convert_stream, ConversionConfig, ConversionEvent, ConversionRequest, TargetFormat};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ConversionRequest::new("scan.pdf", TargetFormat::Doc)?;
/// let mut events = convert_stream(request, ConversionConfig::default());
/// while let Some(event) = events.next().await {
///     match event {
///         ConversionEvent::Finished(result) => println!("{}", result.message),
///         other => eprintln!("{}", other.describe().unwrap_or_default()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream(request: ConversionRequest, mut config: ConversionConfig) -> EventStream {
    let (tx, rx) = mpsc::unbounded_channel();

    let forward = ChannelProgress {
        tx: tx.clone(),
        inner: config.progress_callback.take(),
    };
    config.progress_callback = Some(Arc::new(forward));

    let handle = tokio::task::spawn_blocking(move || convert::convert(&request, &config));

    tokio::spawn(async move {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("Conversion task failed: {}", e);
                ConversionResult::failed(format!("Conversion task failed: {e}"), Vec::new(), 0)
            }
        };
        let _ = tx.send(ConversionEvent::Finished(result));
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
