use std::ffi::OsString;
use std::process::Command;

use crate::converter::{last_stderr_line, run_subprocess, Converter, OutputEncoding};
use crate::error::{ConvertError, Result};
use crate::staging::StagedMarkup;

/// Runs an external converter program.
///
/// The program receives its configured arguments followed by the path of the
/// staged `.cdxml` file, and writes CDX to stdout.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    name: String,
    program: OsString,
    args: Vec<OsString>,
    output: OutputEncoding,
}

impl CommandConverter {
    pub fn new(program: impl Into<OsString>) -> Self {
        let program = program.into();
        Self {
            name: format!("command:{}", program.to_string_lossy()),
            program,
            args: Vec::new(),
            output: OutputEncoding::Raw,
        }
    }

    /// Arguments placed before the staged file path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn output(mut self, output: OutputEncoding) -> Self {
        self.output = output;
        self
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, markup: &StagedMarkup) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(markup.path());

        let output = run_subprocess(&self.name, &mut command)?;
        if !output.status.success() {
            let reason = last_stderr_line(&output.stderr)
                .unwrap_or_else(|| format!("exited with {}", output.status));
            return Err(ConvertError::failed(&self.name, reason));
        }

        self.output.decode(&self.name, output.stdout)
    }

    /// Unavailable unless the program resolves to an executable file, either
    /// as a path or through `PATH`.
    fn probe(&self) -> Result<()> {
        which::which(&self.program).map(drop).map_err(|err| {
            ConvertError::Unavailable(format!("{}: {err}", self.program.to_string_lossy()))
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn staged() -> StagedMarkup {
        StagedMarkup::stage("<CDXML/>", None).unwrap()
    }

    #[test]
    fn raw_stdout_is_returned() {
        let converter = CommandConverter::new("/bin/sh").args(["-c", "printf 'VjCD'", "sh"]);
        assert_eq!(converter.convert(&staged()).unwrap(), b"VjCD");
    }

    #[test]
    fn base64_stdout_is_decoded() {
        let converter = CommandConverter::new("/bin/sh")
            .args(["-c", "echo Q0RY", "sh"])
            .output(OutputEncoding::Base64);
        assert_eq!(converter.convert(&staged()).unwrap(), b"CDX");
    }

    #[test]
    fn staged_path_is_last_argument() {
        let converter = CommandConverter::new("/bin/sh").args(["-c", "cat \"$1\"", "sh"]);
        assert_eq!(converter.convert(&staged()).unwrap(), b"<CDXML/>");
    }

    #[test]
    fn non_zero_exit_reports_stderr() {
        let converter =
            CommandConverter::new("/bin/sh").args(["-c", "echo 'bad atom' >&2; exit 2", "sh"]);
        let err = converter.convert(&staged()).unwrap_err();
        match err {
            ConvertError::Failed { provider, reason } => {
                assert_eq!(provider, "command:/bin/sh");
                assert_eq!(reason, "bad atom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_unavailable() {
        let converter = CommandConverter::new("/nonexistent/cdx-converter");
        assert!(converter.convert(&staged()).unwrap_err().is_unavailable());
        assert!(converter.probe().unwrap_err().is_unavailable());
    }

    #[test]
    fn probe_finds_absolute_program() {
        assert!(CommandConverter::new("/bin/sh").probe().is_ok());
    }

    #[test]
    fn probe_finds_program_on_path() {
        assert!(CommandConverter::new("sh").probe().is_ok());
    }

    #[test]
    fn non_executable_file_is_unavailable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("fakeconv");
        std::fs::write(&program, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o644)).unwrap();

        let converter = CommandConverter::new(&program);
        assert!(converter.probe().unwrap_err().is_unavailable());
        assert!(converter.convert(&staged()).unwrap_err().is_unavailable());
    }
}
