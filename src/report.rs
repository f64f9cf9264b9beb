//! Semicolon-delimited, latin1-encoded CNPJ report.
//!
//! [`ReportWriter`] keeps one buffered handle open for a whole run and creates
//! the file lazily, so a run without any successful lookup leaves no report
//! behind. Each row is encoded in full before any of it is written, so a row
//! the encoding cannot represent is skipped on its own. [`append_row`] is the
//! one-shot form for single records.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{info, warn};

use crate::{cnpj, io_utils, registry::RegistryRecord};

pub const REPORT_HEADERS: [&str; 7] = [
    "razao_social",
    "cnpj",
    "natureza_juridica",
    "data_inicio_atividade",
    "opcao_pelo_simples",
    "data_opcao_pelo_simples",
    "data_exclusao_do_simples",
];

const IDENTIFIER_FIELD: &str = "cnpj";
const SIMPLES_FLAG_FIELD: &str = "opcao_pelo_simples";
const SIMPLES_MARKER: &str = "X";

#[derive(Debug, Clone, Copy)]
pub struct ReportFormat {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_REPORT_DELIMITER,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }
}

/// Builds the seven report fields, or `None` when the record carries no `cnpj`.
pub fn report_row(record: &RegistryRecord) -> Option<[String; 7]> {
    if !record.contains(IDENTIFIER_FIELD) {
        return None;
    }
    let simples = if record.flag(SIMPLES_FLAG_FIELD) {
        SIMPLES_MARKER.to_string()
    } else {
        String::new()
    };
    Some([
        record.text("razao_social"),
        cnpj::format(&record.text(IDENTIFIER_FIELD)),
        record.text("natureza_juridica"),
        record.text("data_inicio_atividade"),
        simples,
        record.text("data_opcao_pelo_simples"),
        record.text("data_exclusao_do_simples"),
    ])
}

pub struct ReportWriter {
    path: PathBuf,
    format: ReportFormat,
    writer: Option<BufWriter<File>>,
    rows: usize,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            path: path.into(),
            format,
            writer: None,
            rows: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Appends one row for `record`.
    ///
    /// Returns `Ok(false)` without touching the file when there is nothing to
    /// save, or when a field cannot be represented in the report encoding. A
    /// skipped row never affects rows written before it.
    pub fn append(&mut self, record: Option<&RegistryRecord>) -> Result<bool> {
        let Some(row) = record.and_then(report_row) else {
            warn!("No data available to save.");
            return Ok(false);
        };
        let line = match self.encode_line(&row) {
            Ok(line) => line,
            Err(err) => {
                warn!("Skipping CNPJ {}: {err:#}", row[1]);
                return Ok(false);
            }
        };

        let path = self.path.clone();
        self.writer()?
            .write_all(&line)
            .with_context(|| format!("Writing report row for CNPJ {}", row[1]))?;
        self.rows += 1;
        info!(
            "Data for CNPJ {} saved to '{}'.",
            row[1],
            io_utils::file_name(&path)
        );
        Ok(true)
    }

    pub fn finish(mut self) -> Result<usize> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .with_context(|| format!("Flushing report {:?}", self.path))?;
        }
        Ok(self.rows)
    }

    fn encode_line(&self, fields: &[String]) -> Result<Vec<u8>> {
        let encoding = self.format.encoding;
        for (header, value) in REPORT_HEADERS.iter().zip(fields) {
            io_utils::encode_text(value, encoding).with_context(|| format!("Field '{header}'"))?;
        }
        let line = io_utils::csv_line(fields, self.format.delimiter)?;
        io_utils::encode_text(&line, encoding)
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open()?,
        };
        Ok(self.writer.insert(writer))
    }

    fn open(&self) -> Result<BufWriter<File>> {
        let target = io_utils::open_appender(&self.path)?;
        let mut writer = target.writer;
        if target.fresh {
            let header = io_utils::csv_line(REPORT_HEADERS, self.format.delimiter)?;
            writer
                .write_all(&io_utils::encode_text(&header, self.format.encoding)?)
                .context("Writing report headers")?;
        }
        Ok(writer)
    }
}

/// Appends a single record to the report at `path`, creating it with a header
/// row when it does not exist yet.
pub fn append_row(
    record: Option<&RegistryRecord>,
    path: &Path,
    format: ReportFormat,
) -> Result<bool> {
    let mut writer = ReportWriter::new(path, format);
    let written = writer.append(record)?;
    writer.finish()?;
    Ok(written)
}
