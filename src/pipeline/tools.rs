//! External program invocation.
//!
//! Every tool call in the crate goes through [`ToolRunner`], so the fallback
//! logic can be exercised against a scripted runner and the real processes
//! only ever get spawned by [`SystemToolRunner`].

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::debug;

/// Longest stderr excerpt kept in a [`ToolError::Failed`].
const MAX_STDERR_CHARS: usize = 600;

/// The external programs the pipeline knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    PdfToText,
    PdfToCairo,
    PdfInfo,
    Pandoc,
    LibreOffice,
    Unoconv,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::PdfToText,
        Tool::PdfToCairo,
        Tool::PdfInfo,
        Tool::Pandoc,
        Tool::LibreOffice,
        Tool::Unoconv,
    ];

    /// Executable name looked up on `PATH` by default.
    pub fn default_program(self) -> &'static str {
        match self {
            Tool::PdfToText => "pdftotext",
            Tool::PdfToCairo => "pdftocairo",
            Tool::PdfInfo => "pdfinfo",
            Tool::Pandoc => "pandoc",
            Tool::LibreOffice => "libreoffice",
            Tool::Unoconv => "unoconv",
        }
    }

    /// Debian package providing the tool.
    pub fn package(self) -> &'static str {
        match self {
            Tool::PdfToText | Tool::PdfToCairo | Tool::PdfInfo => "poppler-utils",
            Tool::Pandoc => "pandoc",
            Tool::LibreOffice => "libreoffice",
            Tool::Unoconv => "unoconv",
        }
    }

    /// Flag that makes the tool print its version and exit.
    pub fn version_flag(self) -> &'static str {
        match self {
            Tool::PdfToText | Tool::PdfToCairo | Tool::PdfInfo => "-v",
            Tool::Pandoc | Tool::LibreOffice | Tool::Unoconv => "--version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

/// Program name (or path) to run for each [`Tool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommands {
    pub pdftotext: String,
    pub pdftocairo: String,
    pub pdfinfo: String,
    pub pandoc: String,
    pub libreoffice: String,
    pub unoconv: String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            pdftotext: Tool::PdfToText.default_program().to_string(),
            pdftocairo: Tool::PdfToCairo.default_program().to_string(),
            pdfinfo: Tool::PdfInfo.default_program().to_string(),
            pandoc: Tool::Pandoc.default_program().to_string(),
            libreoffice: Tool::LibreOffice.default_program().to_string(),
            unoconv: Tool::Unoconv.default_program().to_string(),
        }
    }
}

impl ToolCommands {
    pub fn program(&self, tool: Tool) -> &str {
        match tool {
            Tool::PdfToText => &self.pdftotext,
            Tool::PdfToCairo => &self.pdftocairo,
            Tool::PdfInfo => &self.pdfinfo,
            Tool::Pandoc => &self.pandoc,
            Tool::LibreOffice => &self.libreoffice,
            Tool::Unoconv => &self.unoconv,
        }
    }

    pub fn set(&mut self, tool: Tool, program: impl Into<String>) {
        let slot = match tool {
            Tool::PdfToText => &mut self.pdftotext,
            Tool::PdfToCairo => &mut self.pdftocairo,
            Tool::PdfInfo => &mut self.pdfinfo,
            Tool::Pandoc => &mut self.pandoc,
            Tool::LibreOffice => &mut self.libreoffice,
            Tool::Unoconv => &mut self.unoconv,
        };
        *slot = program.into();
    }

    /// Start building an invocation of `tool`.
    pub fn invoke(&self, tool: Tool) -> ToolInvocation {
        ToolInvocation::new(tool, self.program(tool))
    }
}

/// One fully-specified command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// `None` for helper programs outside the pipeline (file-browser openers).
    pub tool: Option<Tool>,
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(tool: Tool, program: impl Into<String>) -> Self {
        Self {
            tool: Some(tool),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// An invocation of a program that is not one of the [`Tool`]s.
    pub fn helper(program: impl Into<String>) -> Self {
        Self {
            tool: None,
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Value following `flag`, e.g. the output path after `-o`.
    pub fn value_after(&self, flag: &str) -> Option<&Path> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(Path::new)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    pub fn last_arg(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs.
///
/// Implementations must be `Send + Sync`: the config holding the runner is
/// moved onto a blocking thread by the async entry points.
pub trait ToolRunner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// Returns `Ok` only when the program exited with status 0.
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;
}

/// Shared handle stored in [`crate::config::ConversionConfig`].
pub type SharedToolRunner = Arc<dyn ToolRunner>;

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        debug!("exec: {}", invocation);
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::Missing {
                        program: invocation.program.clone(),
                    }
                } else {
                    ToolError::Spawn {
                        program: invocation.program.clone(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: invocation.program.clone(),
                code: output.status.code(),
                stderr: excerpt(&stderr),
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

/// Trim and cap stderr so diagnostics stay readable.
fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= MAX_STDERR_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_STDERR_CHARS).collect();
    format!("{cut}\u{2026}")
}
