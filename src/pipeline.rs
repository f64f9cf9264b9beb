use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{
    input, io_utils,
    registry::{DEFAULT_ENDPOINT, RegistryClient},
    report::{ReportFormat, ReportWriter},
};

pub const INPUT_FILE_NAME: &str = "cnpjs.txt";
pub const OUTPUT_FILE_NAME: &str = "saida.csv";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub input_encoding: &'static Encoding,
    pub report: ReportFormat,
}

impl RunConfig {
    /// Configuration reading and writing the given paths with every other
    /// setting at its default.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            input_encoding: encoding_rs::UTF_8,
            report: ReportFormat::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub written: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    MissingInput,
    NoIdentifiers,
    Completed(RunSummary),
}

/// Directory holding the running executable, where the default input and
/// report files live.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("Resolving executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Executable path {exe:?} has no parent directory"))
}

pub fn run(config: &RunConfig) -> Result<ExitOutcome> {
    if !config.input.is_file() {
        warn!(
            "File \"{}\" not found. Stopping.",
            io_utils::file_name(&config.input)
        );
        return Ok(ExitOutcome::MissingInput);
    }

    if config.output.is_file() {
        fs::remove_file(&config.output)
            .with_context(|| format!("Removing previous report {:?}", config.output))?;
        info!(
            "File \"{}\" deleted successfully.",
            io_utils::file_name(&config.output)
        );
    }

    let identifiers = input::read_identifiers(&config.input, config.input_encoding)?;
    if identifiers.is_empty() {
        warn!("No CNPJ found to look up.");
        return Ok(ExitOutcome::NoIdentifiers);
    }
    debug!(
        "Looking up {} identifier(s) from {:?}",
        identifiers.len(),
        config.input
    );

    let client = RegistryClient::new(config.endpoint.clone(), config.timeout)?;
    let mut report = ReportWriter::new(&config.output, config.report);
    let mut summary = RunSummary::default();

    for identifier in &identifiers {
        summary.processed += 1;
        match client.lookup(identifier) {
            Some(record) => {
                if !report.append(Some(&record))? {
                    summary.failed += 1;
                }
            }
            None => {
                warn!("Could not retrieve information for CNPJ {identifier}.");
                summary.failed += 1;
            }
        }
    }

    summary.written = report.finish()?;
    info!(
        "Processed {} CNPJ(s): {} saved, {} failed",
        summary.processed, summary.written, summary.failed
    );
    Ok(ExitOutcome::Completed(summary))
}
