use std::path::Path;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use cdxbridge::clipboard::{system_backend, ClipboardBackend, CDX_FORMAT_NAME};
use cdxbridge::convert::{ChainConfig, ConversionChain, Converter, StagedMarkup};

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let backend = system_backend();
    let mut checks = vec![clipboard_check(backend.as_ref())];

    match ChainConfig::from_env() {
        Ok(config) => {
            checks.push(staging_dir_check(config.staging_dir.as_deref()));
            let chain = ConversionChain::from_config(&config);
            checks.extend(converter_checks(chain.converters()));
        }
        Err(err) => checks.push(CheckResult::new(
            "configuration",
            CheckStatus::Fail,
            err.to_string(),
        )),
    }
    checks.push(compiled_features_check());

    let output = summarize(checks);
    print_doctor(&output, format);

    if output.overall == "pass" {
        Ok(SUCCESS)
    } else {
        Ok(HEALTH_CHECK_FAILED)
    }
}

fn summarize(checks: Vec<CheckResult>) -> DoctorOutput {
    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    DoctorOutput {
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    }
}

fn clipboard_check(backend: &dyn ClipboardBackend) -> CheckResult {
    if !backend.is_supported() {
        return CheckResult::new(
            "clipboard",
            CheckStatus::Fail,
            format!("{} backend: clipboard delivery is Windows only", backend.name()),
        );
    }
    match backend.register_format(CDX_FORMAT_NAME) {
        Ok(id) => CheckResult::new(
            "clipboard",
            CheckStatus::Pass,
            format!("\"{CDX_FORMAT_NAME}\" registered as {id}"),
        ),
        Err(err) => CheckResult::new("clipboard", CheckStatus::Fail, err.to_string()),
    }
}

fn staging_dir_check(dir: Option<&Path>) -> CheckResult {
    let location = dir
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| std::env::temp_dir().display().to_string());
    match StagedMarkup::stage("<CDXML/>", dir) {
        Ok(staged) => {
            drop(staged);
            CheckResult::new("staging_dir", CheckStatus::Pass, format!("{location} writable"))
        }
        Err(err) => CheckResult::new(
            "staging_dir",
            CheckStatus::Fail,
            format!("{location} not writable: {err}"),
        ),
    }
}

/// One check per backend. Any single backend may be missing; all of them
/// missing is a failure.
fn converter_checks<'a, I>(converters: I) -> Vec<CheckResult>
where
    I: Iterator<Item = &'a dyn Converter>,
{
    let mut checks: Vec<CheckResult> = converters
        .map(|converter| match converter.probe() {
            Ok(()) => CheckResult::new(converter.name(), CheckStatus::Pass, "available"),
            Err(err) if err.is_unavailable() => {
                CheckResult::new(converter.name(), CheckStatus::Warn, err.to_string())
            }
            Err(err) => CheckResult::new(converter.name(), CheckStatus::Fail, err.to_string()),
        })
        .collect();

    let available = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Pass)
        .count();
    let summary = if available == 0 {
        CheckResult::new(
            "converters",
            CheckStatus::Fail,
            cdxbridge::convert::INSTALL_HINT,
        )
    } else {
        CheckResult::new(
            "converters",
            CheckStatus::Pass,
            format!("{available} of {} available", checks.len()),
        )
    };
    checks.push(summary);
    checks
}

fn compiled_features_check() -> CheckResult {
    let mut features = vec!["cli"];
    if cfg!(feature = "http") {
        features.push("http");
    }
    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHECK", "STATUS", "DETAIL"]);
            for c in &output.checks {
                table.add_row(vec![
                    c.name.clone(),
                    status_text(c.status).to_string(),
                    c.detail.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("cdxbridge doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<22} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
    }
}

#[cfg(test)]
mod tests {
    use cdxbridge::clipboard::{MemoryClipboard, UnsupportedClipboard};
    use cdxbridge::convert::ConvertError;

    use super::*;

    struct Probe(Option<&'static str>);

    impl Converter for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn convert(&self, _staged: &StagedMarkup) -> cdxbridge::convert::Result<Vec<u8>> {
            Ok(b"VjCD".to_vec())
        }

        fn probe(&self) -> cdxbridge::convert::Result<()> {
            match self.0 {
                Some(reason) => Err(ConvertError::Unavailable(reason.to_string())),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn unsupported_clipboard_fails() {
        let check = clipboard_check(&UnsupportedClipboard);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.detail.contains("Windows only"));
    }

    #[test]
    fn working_clipboard_registers_cdx_format() {
        let clipboard = MemoryClipboard::new();
        let check = clipboard_check(&clipboard);
        assert_eq!(check.status, CheckStatus::Pass);
        assert!(clipboard.format_id(CDX_FORMAT_NAME).is_some());
    }

    #[test]
    fn staging_dir_is_checked_and_left_clean() {
        let dir = tempfile::tempdir().unwrap();
        let check = staging_dir_check(Some(dir.path()));
        assert_eq!(check.status, CheckStatus::Pass);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let check = staging_dir_check(Some(&dir.path().join("missing")));
        assert_eq!(check.status, CheckStatus::Fail);
    }

    #[test]
    fn one_available_converter_is_enough() {
        let converters: Vec<Box<dyn Converter>> =
            vec![Box::new(Probe(Some("not installed"))), Box::new(Probe(None))];
        let checks = converter_checks(converters.iter().map(|c| c.as_ref()));

        assert_eq!(checks[0].status, CheckStatus::Warn);
        assert_eq!(checks[1].status, CheckStatus::Pass);
        assert_eq!(checks[2].name, "converters");
        assert_eq!(checks[2].status, CheckStatus::Pass);
        assert_eq!(summarize(checks).overall, "pass");
    }

    #[test]
    fn no_available_converter_fails() {
        let converters: Vec<Box<dyn Converter>> = vec![Box::new(Probe(Some("not installed")))];
        let checks = converter_checks(converters.iter().map(|c| c.as_ref()));

        let summary = checks.last().unwrap();
        assert_eq!(summary.status, CheckStatus::Fail);
        assert_eq!(summary.detail, cdxbridge::convert::INSTALL_HINT);
        assert_eq!(summarize(checks).overall, "fail");
    }

    #[test]
    fn doctor_output_has_overall_status() {
        let output = summarize(vec![CheckResult::new("x", CheckStatus::Pass, "ok")]);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }
}
