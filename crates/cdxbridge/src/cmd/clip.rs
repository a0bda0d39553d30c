use std::path::Path;

use serde::Serialize;

use cdxbridge::clipboard::{system_backend, ClipboardError, ClipboardWriter, CDX_FORMAT_NAME};

use crate::cmd::ClipArgs;
use crate::exit::{clipboard_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Debug, Serialize)]
struct ClipReport {
    success: bool,
    file: String,
    bytes: usize,
    format: &'static str,
}

impl Report for ClipReport {
    fn summary(&self) -> String {
        "CDX copied to clipboard. Paste (Ctrl+V) into ChemDraw or your ELN.".to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("file", self.file.clone()),
            ("bytes", self.bytes.to_string()),
            ("format", self.format.to_string()),
        ]
    }
}

pub fn run(args: ClipArgs, format: OutputFormat) -> CliResult<i32> {
    let backend = system_backend();
    if !backend.is_supported() {
        return Err(clipboard_error(ClipboardError::PlatformUnsupported));
    }

    let cdx = read_cdx(&args.file)?;
    ClipboardWriter::new(backend.as_ref())
        .write_cdx(&cdx, None)
        .map_err(clipboard_error)?;

    print_report(
        &ClipReport {
            success: true,
            file: args.file.display().to_string(),
            bytes: cdx.len(),
            format: CDX_FORMAT_NAME,
        },
        format,
    );
    Ok(SUCCESS)
}

fn read_cdx(path: &Path) -> CliResult<Vec<u8>> {
    if !path.is_file() {
        return Err(CliError::failure(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let bytes =
        std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))?;
    if bytes.is_empty() {
        return Err(CliError::failure(format!(
            "file is empty: {}",
            path.display()
        )));
    }
    Ok(bytes)
}
