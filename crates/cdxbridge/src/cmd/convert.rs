use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::cmd::{chain_from_env, ConvertArgs};
use crate::exit::{convert_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Debug, Serialize)]
struct ConvertReport {
    success: bool,
    output: String,
    bytes: usize,
    converter: String,
}

impl Report for ConvertReport {
    fn summary(&self) -> String {
        format!(
            "wrote {} bytes of CDX to {} ({})",
            self.bytes, self.output, self.converter
        )
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output", self.output.clone()),
            ("bytes", self.bytes.to_string()),
            ("converter", self.converter.clone()),
        ]
    }
}

pub fn run(args: ConvertArgs, format: OutputFormat) -> CliResult<i32> {
    let markup = read_markup(args.input.as_deref())?;
    let markup = markup.trim();
    if markup.is_empty() {
        return Err(CliError::failure("no CDXML input"));
    }

    let chain = chain_from_env()?;
    let conversion = chain.convert_markup(markup).map_err(convert_error)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &conversion.bytes)
                .map_err(|err| io_error(&format!("write {}", path.display()), err))?;
            print_report(
                &ConvertReport {
                    success: true,
                    output: path.display().to_string(),
                    bytes: conversion.bytes.len(),
                    converter: conversion.provenance.to_string(),
                },
                format,
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&conversion.bytes)
                .and_then(|()| stdout.flush())
                .map_err(|err| io_error("write stdout", err))?;
        }
    }

    Ok(SUCCESS)
}

fn read_markup(input: Option<&Path>) -> CliResult<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err)),
        None => {
            let mut markup = String::new();
            std::io::stdin()
                .read_to_string(&mut markup)
                .map_err(|err| io_error("read stdin", err))?;
            Ok(markup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_markup_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structure.cdxml");
        std::fs::write(&path, "<CDXML/>").unwrap();

        assert_eq!(read_markup(Some(&path)).unwrap(), "<CDXML/>");
    }

    #[test]
    fn unreadable_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.cdxml");

        let err = read_markup(Some(&path)).unwrap_err();
        assert!(err.message.contains("missing.cdxml"), "{}", err.message);
    }

    #[test]
    fn report_summary_names_converter() {
        let report = ConvertReport {
            success: true,
            output: "out.cdx".to_string(),
            bytes: 10,
            converter: "python:cdx_mol".to_string(),
        };
        assert_eq!(
            report.summary(),
            "wrote 10 bytes of CDX to out.cdx (python:cdx_mol)"
        );
    }
}
