//! Open a directory in the host file browser.

use crate::error::Pdf2DocError;
use crate::pipeline::tools::{ToolInvocation, ToolRunner};
use std::path::Path;
use tracing::debug;

/// Opener command lines for the current platform, in preference order.
pub fn openers(dir: &Path) -> Vec<ToolInvocation> {
    let cmd = ToolInvocation::helper;
    if cfg!(target_os = "macos") {
        vec![cmd("open").arg(dir)]
    } else if cfg!(target_os = "windows") {
        vec![cmd("explorer").arg(dir)]
    } else {
        vec![cmd("xdg-open").arg(dir), cmd("gio").arg("open").arg(dir)]
    }
}

/// Show `dir` with the first opener that works.
pub fn reveal(dir: &Path, runner: &dyn ToolRunner) -> Result<(), Pdf2DocError> {
    let mut last = String::from("no opener available on this platform");
    for inv in openers(dir) {
        match runner.run(&inv) {
            Ok(_) => {
                debug!("Revealed {} with {}", dir.display(), inv.program);
                return Ok(());
            }
            Err(e) => last = e.to_string(),
        }
    }
    Err(Pdf2DocError::RevealFailed {
        path: dir.to_path_buf(),
        detail: last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::pipeline::tools::ToolOutput;
    use std::sync::Mutex;

    struct Recorder {
        ok: Option<String>,
        seen: Mutex<Vec<String>>,
    }

    impl ToolRunner for Recorder {
        fn run(&self, inv: &ToolInvocation) -> Result<ToolOutput, ToolError> {
            self.seen.lock().unwrap().push(inv.to_string());
            if self.ok.as_deref() == Some(inv.program.as_str()) {
                Ok(ToolOutput::default())
            } else {
                Err(ToolError::Missing {
                    program: inv.program.clone(),
                })
            }
        }
    }

    #[test]
    fn first_opener_wins() {
        let first = openers(Path::new("/out"))[0].program.clone();
        let r = Recorder {
            ok: Some(first),
            seen: Mutex::new(Vec::new()),
        };
        reveal(Path::new("/out"), &r).unwrap();
        assert_eq!(r.seen.lock().unwrap().len(), 1);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn linux_falls_back_to_gio() {
        let r = Recorder {
            ok: Some("gio".to_string()),
            seen: Mutex::new(Vec::new()),
        };
        reveal(Path::new("/out"), &r).unwrap();
        assert_eq!(
            *r.seen.lock().unwrap(),
            vec!["xdg-open /out".to_string(), "gio open /out".to_string()]
        );
    }

    #[test]
    fn all_openers_failing_is_an_error() {
        let r = Recorder {
            ok: None,
            seen: Mutex::new(Vec::new()),
        };
        let err = reveal(Path::new("/out"), &r).unwrap_err();
        assert!(matches!(err, Pdf2DocError::RevealFailed { .. }));
    }
}
