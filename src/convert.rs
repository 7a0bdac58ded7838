//! The conversion orchestrator and its blocking and async entry points.
//!
//! ## Lifecycle of one request
//!
//! ```text
//! on_conversion_start
//!   create workspace
//!   for each strategy:
//!     on_strategy_start
//!     attempt (panics contained) ──▶ deliverable non-empty? ──▶ stop
//!     on_strategy_failed
//!   on_substitution (DOC delivered as DOCX)
//!   publish  <out>.<ext>.part ──rename──▶ <out>.<ext>
//!   remove workspace
//! on_conversion_complete
//! ```
//!
//! Every path through [`Orchestrator::run`] yields exactly one
//! [`ConversionResult`]; nothing a strategy does can turn into an `Err` or
//! unwind into the caller.

use crate::config::ConversionConfig;
use crate::error::{AttemptError, Pdf2DocError};
use crate::output::{AttemptRecord, ConversionResult};
use crate::pipeline::input;
use crate::pipeline::workspace::{is_non_empty, Workspace};
use crate::request::ConversionRequest;
use crate::strategy::{self, Deliverable, Strategy, StrategyContext};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs an ordered list of strategies for one request at a time.
pub struct Orchestrator {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::standard()
    }
}

impl Orchestrator {
    /// rich-reconstruction → plain-text → odt-bridge.
    pub fn standard() -> Self {
        Self::with_strategies(strategy::standard_chain())
    }

    /// A custom chain, tried in the given order.
    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Convert `request`, returning its terminal result.
    pub fn run(&self, request: &ConversionRequest, config: &ConversionConfig) -> ConversionResult {
        let start = Instant::now();
        info!(
            "Starting conversion: {} → {}",
            request.source().display(),
            request.format()
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_start(request.source(), request.format());
        }

        let result = match Workspace::create(config.temp_root.as_deref(), &request.stem()) {
            Ok(workspace) => {
                let result = self.run_in(&workspace, request, config, start);
                if let Err(e) = workspace.close() {
                    warn!("Could not remove temporary workspace: {}", e);
                }
                result
            }
            Err(e) => ConversionResult::failed(
                format!("Could not create temporary workspace: {e}"),
                Vec::new(),
                elapsed_ms(start),
            ),
        };

        if result.succeeded {
            info!("Conversion complete in {}ms: {}", result.duration_ms, result.message);
        } else {
            warn!("Conversion failed: {}", result.message);
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_complete(&result);
        }
        result
    }

    fn run_in(
        &self,
        workspace: &Workspace,
        request: &ConversionRequest,
        config: &ConversionConfig,
        start: Instant,
    ) -> ConversionResult {
        let total = self.strategies.len();
        let mut attempts = Vec::with_capacity(total);
        let mut last_error = String::from("no conversion strategy is configured");

        for (i, strategy) in self.strategies.iter().enumerate() {
            let name = strategy.name();
            info!("Strategy {}/{}: {}", i + 1, total, name);
            if let Some(ref cb) = config.progress_callback {
                cb.on_strategy_start(name, i + 1, total);
            }

            let attempt_start = Instant::now();
            let ctx = StrategyContext::new(name, request, workspace, config);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.attempt(&ctx)))
                .unwrap_or_else(|payload| {
                    Err(AttemptError::Panicked {
                        detail: panic_message(payload.as_ref()),
                    })
                })
                .and_then(|deliverable| {
                    if is_non_empty(&deliverable.path) {
                        Ok(deliverable)
                    } else {
                        Err(AttemptError::EmptyOutput {
                            artifact: deliverable.path,
                        })
                    }
                });
            let (invocations, artifacts) = ctx.into_log();
            let mut record = AttemptRecord {
                strategy: name.to_string(),
                succeeded: outcome.is_ok(),
                invocations,
                artifacts,
                diagnostic: None,
                duration_ms: elapsed_ms(attempt_start),
            };

            match outcome {
                Ok(deliverable) => {
                    attempts.push(record);
                    return finish(request, config, name, deliverable, attempts, start);
                }
                Err(e) => {
                    let detail = e.to_string();
                    warn!("Strategy '{}' failed: {}", name, detail);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_strategy_failed(name, &detail);
                    }
                    record.diagnostic = Some(detail.clone());
                    attempts.push(record);
                    last_error = detail;
                }
            }
        }

        ConversionResult::failed(
            format!("All conversion methods failed. Last error: {last_error}"),
            attempts,
            elapsed_ms(start),
        )
    }
}

/// Publish the winning deliverable and build the success result.
fn finish(
    request: &ConversionRequest,
    config: &ConversionConfig,
    strategy: &str,
    deliverable: Deliverable,
    attempts: Vec<AttemptRecord>,
    start: Instant,
) -> ConversionResult {
    if let Some(ref substitution) = deliverable.substitution {
        warn!("{}", substitution);
        if let Some(ref cb) = config.progress_callback {
            cb.on_substitution(substitution);
        }
    }

    let dir = config.resolve_output_dir();
    let requested = input::output_path(&dir, &request.stem(), request.format());
    let dest = match deliverable.substitution {
        Some(_) => input::substituted_path(&requested),
        None => requested,
    };

    if let Err(e) = publish(&deliverable.path, &dest) {
        return ConversionResult::failed(
            format!("Could not write '{}': {e}", dest.display()),
            attempts,
            elapsed_ms(start),
        );
    }

    let mut message = format!("Conversion completed successfully: {}", dest.display());
    if let Some(ref substitution) = deliverable.substitution {
        message.push_str(&format!(" ({substitution})"));
    }

    ConversionResult {
        succeeded: true,
        output_path: Some(dest),
        format: Some(deliverable.format),
        strategy: Some(strategy.to_string()),
        substitution: deliverable.substitution,
        message,
        attempts,
        duration_ms: elapsed_ms(start),
    }
}

/// Copy `from` next to `dest` as `<dest>.part`, then rename into place.
///
/// A reader of the output folder never sees a half-written document.
fn publish(from: &Path, dest: &Path) -> io::Result<()> {
    if let Some(dir) = dest.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let placed = std::fs::copy(from, &part).and_then(|_| std::fs::rename(&part, dest));
    if let Err(e) = placed {
        let _ = std::fs::remove_file(&part);
        return Err(e);
    }
    debug!("Published {} → {}", from.display(), dest.display());
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Convert `request` with the standard strategy chain, blocking the caller.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// Always a [`ConversionResult`]; check `succeeded`, or call
/// [`ConversionResult::into_result`] to get an `Err` on failure.
pub fn convert(request: &ConversionRequest, config: &ConversionConfig) -> ConversionResult {
    Orchestrator::standard().run(request, config)
}

/// Async wrapper around [`convert`].
///
/// The conversion spawns external processes and waits on them, so it runs
/// on Tokio's blocking pool.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2doc::{convert_async, ConversionConfig, ConversionRequest, TargetFormat};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ConversionRequest::new("report.pdf", TargetFormat::Docx)?;
/// let result = convert_async(request, ConversionConfig::default()).await?;
/// println!("{}", result.message);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// [`Pdf2DocError::Internal`] if the blocking task could not be joined.
pub async fn convert_async(
    request: ConversionRequest,
    config: ConversionConfig,
) -> Result<ConversionResult, Pdf2DocError> {
    tokio::task::spawn_blocking(move || convert(&request, &config))
        .await
        .map_err(|e| Pdf2DocError::Internal(format!("conversion task failed: {e}")))
}

/// Validate `source`, convert it, and turn a failed result into an `Err`.
///
/// Convenience for callers that want `?` all the way through.
pub fn convert_file(
    source: impl AsRef<Path>,
    format: crate::request::TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionResult, Pdf2DocError> {
    let request = ConversionRequest::new(source, format)?;
    convert(&request, config).into_result()
}
