//! Shared fixtures for the integration tests.
//!
//! [`ScriptedRunner`] stands in for poppler-utils, pandoc, LibreOffice and
//! unoconv: it writes plausible output files where the real tools would and
//! can be told to behave as if a tool were missing, failing, or producing an
//! empty file.

#![allow(dead_code)]

use edgequake_pdf2doc::{
    ConversionConfig, ConversionConfigBuilder, ToolError, ToolInvocation, ToolOutput, ToolRunner,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness; `RUST_LOG=debug cargo test --
/// --nocapture` shows every strategy step and failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Fake tool runner.
///
/// Behaviour keys are the program name (`"libreoffice"`) or, for pandoc,
/// `"pandoc:<from>:<to>"` to target one conversion.
#[derive(Default)]
pub struct ScriptedRunner {
    layout_text: String,
    plain_text: Option<String>,
    pages: usize,
    blank_pages: bool,
    missing: HashSet<String>,
    failing: HashSet<String>,
    empty: HashSet<String>,
    calls: Mutex<Vec<String>>,
    html: Mutex<Option<String>>,
    markdown: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    /// `pdftotext` yields `text` in both modes; `pdfinfo` reports one page.
    pub fn new(text: &str) -> Self {
        Self {
            layout_text: text.to_string(),
            pages: 1,
            ..Self::default()
        }
    }

    /// Text produced when `-layout` is not given.
    pub fn plain_text(mut self, text: &str) -> Self {
        self.plain_text = Some(text.to_string());
        self
    }

    pub fn pages(mut self, n: usize) -> Self {
        self.pages = n;
        self
    }

    /// `pdftocairo` writes the surface-only SVG poppler produces for a blank
    /// page.
    pub fn blank_pages(mut self) -> Self {
        self.blank_pages = true;
        self
    }

    /// Behave as if the executable were not installed.
    pub fn missing(mut self, key: &str) -> Self {
        self.missing.insert(key.to_string());
        self
    }

    /// Exit with status 1.
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Exit 0 but leave a zero-byte output.
    pub fn empty_output(mut self, key: &str) -> Self {
        self.empty.insert(key.to_string());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Every command line run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(program))
            .collect()
    }

    /// The last HTML document handed to pandoc.
    pub fn html(&self) -> Option<String> {
        self.html.lock().unwrap().clone()
    }

    /// Every Markdown document handed to pandoc, in order.
    pub fn markdown_inputs(&self) -> Vec<String> {
        self.markdown.lock().unwrap().clone()
    }

    fn keys(inv: &ToolInvocation) -> Vec<String> {
        let mut keys = vec![inv.program.clone()];
        if inv.program == "pandoc" {
            let from = arg_after(inv, "-f");
            let to = arg_after(inv, "-t");
            keys.push(format!("pandoc:{from}:{to}"));
        }
        keys
    }

    fn write(&self, keys: &[String], path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let empty = keys.iter().any(|k| self.empty.contains(k));
        std::fs::write(path, if empty { &[][..] } else { contents }).unwrap();
    }
}

fn arg_after(inv: &ToolInvocation, flag: &str) -> String {
    inv.value_after(flag)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, inv: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push(inv.to_string());
        let keys = Self::keys(inv);

        if keys.iter().any(|k| self.missing.contains(k)) {
            return Err(ToolError::Missing {
                program: inv.program.clone(),
            });
        }
        if keys.iter().any(|k| self.failing.contains(k)) {
            return Err(ToolError::Failed {
                program: inv.program.clone(),
                code: Some(1),
                stderr: "scripted failure".to_string(),
            });
        }

        match inv.program.as_str() {
            "pdftotext" => {
                let dest = inv.last_arg().unwrap();
                let text = if inv.has_flag("-layout") {
                    &self.layout_text
                } else {
                    self.plain_text.as_ref().unwrap_or(&self.layout_text)
                };
                self.write(&keys, dest, text.as_bytes());
            }
            "pdfinfo" => {
                return Ok(ToolOutput {
                    stdout: format!("Producer:       scripted\nPages:          {}\n", self.pages),
                    stderr: String::new(),
                });
            }
            "pdftocairo" => {
                let page = arg_after(inv, "-f");
                let body = if self.blank_pages {
                    "<g id=\"surface1\">\n</g>"
                } else {
                    "<path d='M0 0'/>"
                };
                let svg = format!(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg id='p{page}'>{body}</svg>\n"
                );
                self.write(&keys, inv.last_arg().unwrap(), svg.as_bytes());
            }
            "pandoc" => {
                let input = inv.last_arg().unwrap();
                match arg_after(inv, "-f").as_str() {
                    "html" => *self.html.lock().unwrap() = std::fs::read_to_string(input).ok(),
                    "markdown" => {
                        let md = std::fs::read_to_string(input).unwrap_or_default();
                        self.markdown.lock().unwrap().push(md);
                    }
                    _ => {}
                }
                let out = inv.value_after("-o").unwrap();
                let body = format!("pandoc {} -> {}", arg_after(inv, "-f"), arg_after(inv, "-t"));
                self.write(&keys, out, body.as_bytes());
            }
            "libreoffice" => {
                let dir = inv.value_after("--outdir").unwrap();
                let stem = inv.last_arg().unwrap().file_stem().unwrap().to_string_lossy();
                let out = dir.join(format!("{stem}.doc"));
                self.write(&keys, &out, b"\xd0\xcf\x11\xe0 libreoffice");
            }
            "unoconv" => {
                let out = inv.value_after("-o").unwrap();
                self.write(&keys, out, b"\xd0\xcf\x11\xe0 unoconv");
            }
            _ => {}
        }
        Ok(ToolOutput::default())
    }
}

/// A temp directory holding source PDFs, the output folder and the
/// workspace root.
pub struct Fixture {
    pub dir: TempDir,
    pub out: PathBuf,
    pub tmp: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let tmp = dir.path().join("tmp");
        std::fs::create_dir_all(&tmp).unwrap();
        Self { dir, out, tmp }
    }

    /// Write a minimal file with the PDF magic.
    pub fn pdf(&self, name: &str) -> PathBuf {
        let p = self.dir.path().join(name);
        std::fs::write(&p, b"%PDF-1.7\n%scripted\n").unwrap();
        p
    }

    pub fn builder(&self, runner: &Arc<ScriptedRunner>) -> ConversionConfigBuilder {
        ConversionConfig::builder()
            .output_dir(&self.out)
            .temp_root(&self.tmp)
            .runner(runner.clone())
    }

    pub fn config(&self, runner: &Arc<ScriptedRunner>) -> ConversionConfig {
        self.builder(runner).build().unwrap()
    }

    /// File names in the output folder, sorted.
    pub fn outputs(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.out) {
            Ok(rd) => rd
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// True when no workspace is left under the temp root.
    pub fn workspaces_cleaned(&self) -> bool {
        std::fs::read_dir(&self.tmp).unwrap().next().is_none()
    }
}
