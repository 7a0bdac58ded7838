//! Conversion strategies.
//!
//! A strategy is one complete attempt to produce the requested document from
//! the source PDF. The orchestrator runs them in order and stops at the first
//! one whose deliverable exists and is non-empty:
//!
//! ```text
//! 1. rich-reconstruction   text + per-page SVG → HTML → pandoc
//! 2. plain-text            text (retry w/o layout) → Markdown → pandoc
//! 3. odt-bridge            text → ODT → pandoc
//! ```
//!
//! Strategies only write inside the request's [`Workspace`]. They hand back a
//! [`Deliverable`] and the orchestrator decides whether and where to publish it.

mod plain_text;
mod rescue;
mod rich;

pub use plain_text::PlainTextStrategy;
pub use rescue::OdtBridgeStrategy;
pub use rich::RichReconstructionStrategy;

use crate::config::ConversionConfig;
use crate::error::{AttemptError, ToolError};
use crate::output::Substitution;
use crate::pipeline::tools::{SharedToolRunner, Tool, ToolInvocation, ToolOutput};
use crate::pipeline::workspace::{is_non_empty, Workspace};
use crate::request::{ConversionRequest, TargetFormat};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a successful attempt hands back for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deliverable {
    /// File inside the workspace.
    pub path: PathBuf,
    /// Format of `path`; differs from the requested one under substitution.
    pub format: TargetFormat,
    pub substitution: Option<Substitution>,
}

impl Deliverable {
    pub fn new(path: PathBuf, format: TargetFormat) -> Self {
        Self {
            path,
            format,
            substitution: None,
        }
    }

    pub fn substituted(path: PathBuf, substitution: Substitution) -> Self {
        Self {
            path,
            format: substitution.delivered,
            substitution: Some(substitution),
        }
    }
}

/// Result of one strategy attempt.
pub type AttemptOutcome = Result<Deliverable, AttemptError>;

/// One way of turning the source PDF into the requested format.
pub trait Strategy: Send + Sync {
    /// Stable name used in logs, progress events and attempt records.
    fn name(&self) -> &'static str;

    fn attempt(&self, ctx: &StrategyContext<'_>) -> AttemptOutcome;
}

/// The default chain, in order.
pub fn standard_chain() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(RichReconstructionStrategy),
        Box::new(PlainTextStrategy),
        Box::new(OdtBridgeStrategy),
    ]
}

/// Everything a strategy may touch, plus a log of what it did.
pub struct StrategyContext<'a> {
    pub request: &'a ConversionRequest,
    pub workspace: &'a Workspace,
    pub config: &'a ConversionConfig,
    strategy: &'static str,
    runner: SharedToolRunner,
    invocations: RefCell<Vec<String>>,
    artifacts: RefCell<Vec<String>>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        strategy: &'static str,
        request: &'a ConversionRequest,
        workspace: &'a Workspace,
        config: &'a ConversionConfig,
    ) -> Self {
        Self {
            request,
            workspace,
            config,
            strategy,
            runner: config.runner(),
            invocations: RefCell::new(Vec::new()),
            artifacts: RefCell::new(Vec::new()),
        }
    }

    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    /// Start an invocation of `tool` with the configured program name.
    pub fn invoke(&self, tool: Tool) -> ToolInvocation {
        self.config.tools.invoke(tool)
    }

    /// Run `invocation`, recording its command line whatever the outcome.
    pub fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.invocations.borrow_mut().push(invocation.to_string());
        self.runner.run(invocation)
    }

    /// Report a human-readable step.
    pub fn step(&self, message: &str) {
        info!("[{}] {}", self.strategy, message);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_step(self.strategy, message);
        }
    }

    /// Note an intermediate file by name.
    pub fn record_artifact(&self, path: &Path) {
        let name = path
            .strip_prefix(self.workspace.path())
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let mut artifacts = self.artifacts.borrow_mut();
        if !artifacts.contains(&name) {
            artifacts.push(name);
        }
    }

    /// Record `path` if it is non-empty, else fail with `EmptyOutput`.
    pub fn require_artifact(&self, path: &Path) -> Result<(), AttemptError> {
        if !is_non_empty(path) {
            return Err(AttemptError::EmptyOutput {
                artifact: path.to_path_buf(),
            });
        }
        self.record_artifact(path);
        Ok(())
    }

    /// Consume the context, returning `(invocations, artifacts)`.
    pub fn into_log(self) -> (Vec<String>, Vec<String>) {
        (self.invocations.into_inner(), self.artifacts.into_inner())
    }
}
