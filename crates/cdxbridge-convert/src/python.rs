use std::ffi::OsString;
use std::process::{Command, ExitStatus};

use crate::converter::{last_stderr_line, run_subprocess, Converter, OutputEncoding};
use crate::error::{ConvertError, Result};
use crate::staging::StagedMarkup;

/// Python packages tried in order. Both expose the same
/// `cdxml_converter.read_cdxml` / `cdxml_converter.to_b64_cdx` pair.
pub const DEFAULT_PYTHON_MODULES: &[&str] = &["pycdxml", "cdx_mol"];

/// Exit code the helper script uses when the package cannot be imported.
const IMPORT_FAILED: i32 = 3;

const CONVERT_SCRIPT: &str = r#"
import importlib, sys
try:
    converter = importlib.import_module(sys.argv[1] + ".cdxml_converter")
except ImportError as exc:
    sys.stderr.write("%s\n" % exc)
    sys.exit(3)
document = converter.read_cdxml(sys.argv[2])
encoded = converter.to_b64_cdx(document)
if isinstance(encoded, bytes):
    encoded = encoded.decode("ascii")
sys.stdout.write(encoded)
"#;

const PROBE_SCRIPT: &str = r#"
import importlib, sys
try:
    importlib.import_module(sys.argv[1] + ".cdxml_converter")
except ImportError as exc:
    sys.stderr.write("%s\n" % exc)
    sys.exit(3)
"#;

/// Converts through an installed Python CDXML package.
#[derive(Debug, Clone)]
pub struct PythonModuleConverter {
    name: String,
    interpreter: OsString,
    module: String,
}

impl PythonModuleConverter {
    pub fn new(interpreter: impl Into<OsString>, module: impl Into<String>) -> Self {
        let module = module.into();
        Self {
            name: format!("python:{module}"),
            interpreter: interpreter.into(),
            module,
        }
    }

    fn command(&self, script: &str) -> Command {
        let mut command = Command::new(&self.interpreter);
        command.arg("-c").arg(script).arg(&self.module);
        command
    }
}

impl Converter for PythonModuleConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, markup: &StagedMarkup) -> Result<Vec<u8>> {
        let mut command = self.command(CONVERT_SCRIPT);
        command.arg(markup.path());

        let output = run_subprocess(&self.name, &mut command)?;
        check_status(&self.name, &self.module, output.status, &output.stderr)?;
        OutputEncoding::Base64.decode(&self.name, output.stdout)
    }

    fn probe(&self) -> Result<()> {
        let output = run_subprocess(&self.name, &mut self.command(PROBE_SCRIPT))?;
        check_status(&self.name, &self.module, output.status, &output.stderr)
    }
}

fn check_status(provider: &str, module: &str, status: ExitStatus, stderr: &[u8]) -> Result<()> {
    classify_exit(provider, module, status.success(), status.code(), stderr)
}

fn classify_exit(
    provider: &str,
    module: &str,
    success: bool,
    code: Option<i32>,
    stderr: &[u8],
) -> Result<()> {
    if success {
        return Ok(());
    }

    let detail = last_stderr_line(stderr);
    if code == Some(IMPORT_FAILED) {
        return Err(ConvertError::Unavailable(match detail {
            Some(detail) => format!("{module} not installed ({detail})"),
            None => format!("{module} not installed"),
        }));
    }

    let reason = match (detail, code) {
        (Some(detail), _) => detail,
        (None, Some(code)) => format!("python exited with code {code}"),
        (None, None) => "python terminated by signal".to_string(),
    };
    Err(ConvertError::failed(provider, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_failure_is_unavailable() {
        let err = classify_exit(
            "python:pycdxml",
            "pycdxml",
            false,
            Some(IMPORT_FAILED),
            b"No module named 'pycdxml'\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "pycdxml not installed (No module named 'pycdxml')"
        );
        assert!(err.is_unavailable());
    }

    #[test]
    fn traceback_is_conversion_failure() {
        let stderr = b"Traceback (most recent call last):\n  File \"<string>\", line 8\nKeyError: 'page'\n";
        let err = classify_exit("python:cdx_mol", "cdx_mol", false, Some(1), stderr).unwrap_err();
        assert_eq!(
            err.to_string(),
            "python:cdx_mol failed to convert CDXML: KeyError: 'page'"
        );
    }

    #[test]
    fn silent_failure_names_exit_code() {
        let err = classify_exit("python:pycdxml", "pycdxml", false, Some(9), b"").unwrap_err();
        assert!(err.to_string().ends_with("python exited with code 9"));
    }

    #[test]
    fn success_passes() {
        assert!(classify_exit("python:pycdxml", "pycdxml", true, Some(0), b"").is_ok());
    }

    #[test]
    fn missing_interpreter_is_unavailable() {
        let converter = PythonModuleConverter::new("/nonexistent/python3", "pycdxml");
        let staged = StagedMarkup::stage("<CDXML/>", None).unwrap();
        assert!(converter.convert(&staged).unwrap_err().is_unavailable());
        assert!(converter.probe().unwrap_err().is_unavailable());
        assert_eq!(converter.name(), "python:pycdxml");
    }

    #[test]
    fn scripts_exit_with_import_code() {
        assert!(CONVERT_SCRIPT.contains("sys.exit(3)"));
        assert!(PROBE_SCRIPT.contains("sys.exit(3)"));
    }
}
