//! Up-front check for the external programs a conversion needs.
//!
//! Only a missing executable counts as "absent": a tool that starts but
//! rejects the version flag is still installed.

use crate::config::ConversionConfig;
use crate::error::ToolError;
use crate::pipeline::tools::Tool;
use crate::request::TargetFormat;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::debug;

/// Without these no strategy can succeed.
pub const REQUIRED: [Tool; 2] = [Tool::PdfToText, Tool::Pandoc];

/// Availability of every tool relevant to one target format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolReport {
    pub available: Vec<Tool>,
    pub missing_required: Vec<Tool>,
    pub missing_optional: Vec<Tool>,
}

impl ToolReport {
    /// True when every required tool is present.
    pub fn is_ready(&self) -> bool {
        self.missing_required.is_empty()
    }

    /// Blocking warning for missing required tools.
    pub fn warning(&self) -> Option<String> {
        if self.missing_required.is_empty() {
            return None;
        }
        let mut s = format!(
            "Required tools are missing: {}",
            join(&self.missing_required)
        );
        let _ = write!(s, "\nInstall them with:\n  {}", install_hint(&self.missing_required));
        Some(s)
    }

    /// One-time advisory for missing optional tools.
    pub fn advisory(&self) -> Option<String> {
        if self.missing_optional.is_empty() {
            return None;
        }
        let mut s = format!(
            "Optional tools not found: {}",
            join(&self.missing_optional)
        );
        if self
            .missing_optional
            .iter()
            .any(|t| matches!(t, Tool::PdfToCairo | Tool::PdfInfo))
        {
            s.push_str("\nPages will be embedded as text instead of vector graphics.");
        }
        if self
            .missing_optional
            .iter()
            .any(|t| matches!(t, Tool::LibreOffice | Tool::Unoconv))
        {
            s.push_str("\nDOC output may fall back to DOCX.");
        }
        let _ = write!(s, "\nFor full functionality:\n  {}", install_hint(&self.missing_optional));
        Some(s)
    }
}

/// Tools worth checking for `format`.
pub fn relevant_tools(format: TargetFormat) -> Vec<Tool> {
    Tool::ALL
        .into_iter()
        .filter(|t| match t {
            Tool::LibreOffice | Tool::Unoconv => format == TargetFormat::Doc,
            _ => true,
        })
        .collect()
}

/// Probe each relevant tool with its version flag.
pub fn check_tools(config: &ConversionConfig, format: TargetFormat) -> ToolReport {
    let runner = config.runner();
    let mut report = ToolReport::default();

    for tool in relevant_tools(format) {
        let inv = config.tools.invoke(tool).arg(tool.version_flag());
        let present = !matches!(runner.run(&inv), Err(ToolError::Missing { .. }));
        debug!("tool {} ({}): present={}", tool, config.tools.program(tool), present);
        if present {
            report.available.push(tool);
        } else if REQUIRED.contains(&tool) {
            report.missing_required.push(tool);
        } else {
            report.missing_optional.push(tool);
        }
    }
    report
}

fn join(tools: &[Tool]) -> String {
    tools
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `sudo apt-get install ...` with each Debian package once.
fn install_hint(tools: &[Tool]) -> String {
    let mut packages: Vec<&str> = Vec::new();
    for t in tools {
        if !packages.contains(&t.package()) {
            packages.push(t.package());
        }
    }
    format!("sudo apt-get install {}", packages.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tools::{ToolInvocation, ToolOutput, ToolRunner};
    use std::sync::Arc;

    struct Installed(Vec<&'static str>);

    impl ToolRunner for Installed {
        fn run(&self, inv: &ToolInvocation) -> Result<ToolOutput, ToolError> {
            if self.0.contains(&inv.program.as_str()) {
                Ok(ToolOutput::default())
            } else {
                Err(ToolError::Missing {
                    program: inv.program.clone(),
                })
            }
        }
    }

    fn config(installed: Vec<&'static str>) -> ConversionConfig {
        ConversionConfig::builder()
            .runner(Arc::new(Installed(installed)))
            .build()
            .unwrap()
    }

    #[test]
    fn all_present_is_ready() {
        let c = config(vec!["pdftotext", "pdftocairo", "pdfinfo", "pandoc"]);
        let report = check_tools(&c, TargetFormat::Docx);
        assert!(report.is_ready());
        assert!(report.warning().is_none());
        assert!(report.advisory().is_none());
        assert_eq!(report.available.len(), 4);
    }

    #[test]
    fn missing_pandoc_blocks() {
        let c = config(vec!["pdftotext", "pdftocairo", "pdfinfo"]);
        let report = check_tools(&c, TargetFormat::Odt);
        assert!(!report.is_ready());
        let w = report.warning().unwrap();
        assert!(w.contains("pandoc"), "got: {w}");
        assert!(w.contains("apt-get install pandoc"), "got: {w}");
    }

    #[test]
    fn doc_checks_converters_as_optional() {
        let c = config(vec!["pdftotext", "pandoc"]);
        let report = check_tools(&c, TargetFormat::Doc);
        assert!(report.is_ready());
        assert_eq!(
            report.missing_optional,
            vec![Tool::PdfToCairo, Tool::PdfInfo, Tool::LibreOffice, Tool::Unoconv]
        );
        let a = report.advisory().unwrap();
        assert!(a.contains("fall back to DOCX"), "got: {a}");
        assert!(a.contains("sudo apt-get install poppler-utils libreoffice unoconv"), "got: {a}");
    }

    #[test]
    fn converters_ignored_for_docx() {
        assert!(!relevant_tools(TargetFormat::Docx).contains(&Tool::LibreOffice));
        assert!(relevant_tools(TargetFormat::Doc).contains(&Tool::Unoconv));
    }

    #[test]
    fn failing_version_flag_still_counts_as_present() {
        struct Grumpy;
        impl ToolRunner for Grumpy {
            fn run(&self, inv: &ToolInvocation) -> Result<ToolOutput, ToolError> {
                Err(ToolError::Failed {
                    program: inv.program.clone(),
                    code: Some(1),
                    stderr: "unknown option".into(),
                })
            }
        }
        let c = ConversionConfig::builder()
            .runner(Arc::new(Grumpy))
            .build()
            .unwrap();
        assert!(check_tools(&c, TargetFormat::Doc).missing_optional.is_empty());
    }
}
