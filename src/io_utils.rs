//! File and encoding helpers shared by the input reader and the report writer.
//!
//! - **Encoding**: labels resolve through `encoding_rs` (`utf-8`, `latin1`,
//!   `windows-1252`, ...). Input is decoded up front. Report lines are
//!   serialized as UTF-8 CSV and encoded whole before they reach the file, so
//!   a line that cannot be encoded never leaves partial bytes behind.
//! - **Append mode**: the report is always opened for appending, and the caller
//!   learns whether the file was fresh so it can emit the header exactly once.

use std::{
    fs::{File, OpenOptions},
    io::BufWriter,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, Terminator};
use encoding_rs::Encoding;

pub const DEFAULT_REPORT_DELIMITER: u8 = b';';
pub const DEFAULT_INPUT_ENCODING: &str = "utf-8";
pub const DEFAULT_OUTPUT_ENCODING: &str = "latin1";

pub fn resolve_encoding(label: Option<&str>, fallback: &str) -> Result<&'static Encoding> {
    let value = label.unwrap_or(fallback);
    Encoding::for_label(value.trim().as_bytes())
        .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
}

/// Decodes `bytes`, rejecting input with malformed sequences for `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, malformed) = encoding.decode(bytes);
    if malformed {
        return Err(anyhow!("Input is not valid {}", encoding.name()));
    }
    Ok(text.into_owned())
}

pub fn encode_text(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let (encoded, _, unmappable) = encoding.encode(text);
    if unmappable {
        return Err(anyhow!("Failed to encode text using {}", encoding.name()));
    }
    Ok(encoded.into_owned())
}

/// Serializes one record as a CRLF-terminated CSV line with minimal quoting.
pub fn csv_line<I, T>(fields: I, delimiter: u8) -> Result<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .double_quote(true);
    let mut writer = builder.from_writer(Vec::new());
    writer.write_record(fields).context("Serializing CSV record")?;
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Serializing CSV record: {}", err.error()))?;
    String::from_utf8(bytes).context("Serialized CSV record is not UTF-8")
}

/// File name for log lines, falling back to the full path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A buffered append-mode handle plus whether the underlying file started empty.
pub struct AppendTarget {
    pub writer: BufWriter<File>,
    pub fresh: bool,
}

pub fn open_appender(path: &Path) -> Result<AppendTarget> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Opening output file {path:?}"))?;
    let fresh = file
        .metadata()
        .with_context(|| format!("Inspecting output file {path:?}"))?
        .len()
        == 0;
    Ok(AppendTarget {
        writer: BufWriter::new(file),
        fresh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn latin1_label_resolves_to_western_codepage() {
        let encoding = resolve_encoding(None, DEFAULT_OUTPUT_ENCODING).expect("encoding");
        assert_eq!(encoding, WINDOWS_1252);
        assert!(resolve_encoding(Some("klingon"), DEFAULT_OUTPUT_ENCODING).is_err());
    }

    #[test]
    fn encode_text_maps_accents_to_single_bytes() {
        let bytes = encode_text("ção", WINDOWS_1252).expect("encode");
        assert_eq!(bytes, vec![0xE7, 0xE3, b'o']);
    }

    #[test]
    fn encode_text_error_names_only_the_encoding() {
        let err = encode_text("漢字 LTDA", WINDOWS_1252).unwrap_err();
        assert_eq!(err.to_string(), "Failed to encode text using windows-1252");
    }

    #[test]
    fn csv_line_quotes_only_when_needed() {
        let line = csv_line(["A;B", "plain", ""], b';').expect("line");
        assert_eq!(line, "\"A;B\";plain;\r\n");
    }

    #[test]
    fn decode_bytes_reads_latin1_input() {
        let text = decode_bytes(&[b'S', 0xE3, b'o'], WINDOWS_1252).expect("decode");
        assert_eq!(text, "São");
        assert!(decode_bytes(&[0xFF], encoding_rs::UTF_8).is_err());
    }
}
