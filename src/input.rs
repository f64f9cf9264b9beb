use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::warn;

use crate::io_utils;

/// Loads raw identifiers from `path`, one per line.
///
/// Lines are trimmed and blank lines dropped. Order and duplicates are kept.
/// A missing file yields an empty list rather than an error.
pub fn read_identifiers(path: &Path, encoding: &'static Encoding) -> Result<Vec<String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("File {:?} not found.", path);
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Reading identifier list {path:?}"));
        }
    };
    let text = io_utils::decode_bytes(&bytes, encoding)
        .with_context(|| format!("Decoding identifier list {path:?}"))?;
    Ok(parse_identifiers(&text))
}

pub fn parse_identifiers(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_identifiers_trims_and_drops_blank_lines() {
        assert_eq!(parse_identifiers("  111\n\n222  \n"), vec!["111", "222"]);
    }

    #[test]
    fn parse_identifiers_handles_crlf_and_duplicates() {
        assert_eq!(
            parse_identifiers("111\r\n \t \r\n111\r\n222"),
            vec!["111", "111", "222"]
        );
    }
}
