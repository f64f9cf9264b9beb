use std::path::PathBuf;

use clap::Parser;

use crate::registry::{CNPJ_PLACEHOLDER, DEFAULT_ENDPOINT};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Look up CNPJ numbers on BrasilAPI and append the results to a CSV report",
    long_about = None
)]
pub struct Cli {
    /// Identifier list, one CNPJ per line (defaults to cnpjs.txt beside the executable)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Report file, deleted and rebuilt on every run (defaults to saida.csv beside the executable)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Registry URL template; `{cnpj}` is replaced by the normalized digits
    #[arg(long, default_value = DEFAULT_ENDPOINT, value_parser = parse_endpoint)]
    pub endpoint: String,
    /// Per-request timeout in seconds (requests wait indefinitely when omitted)
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,
    /// Character encoding of the identifier list (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the report (defaults to latin1)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Report delimiter (';', ',', 'tab' or '|')
    #[arg(long, default_value = ";", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

pub fn parse_endpoint(value: &str) -> Result<String, String> {
    if !value.contains(CNPJ_PLACEHOLDER) {
        return Err(format!("Endpoint template must contain '{CNPJ_PLACEHOLDER}'"));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err("Endpoint template must be an http:// or https:// URL".to_string());
    }
    Ok(value.to_string())
}

/// Accepts the separators a spreadsheet import understands, by symbol or name.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        ";" | "semicolon" => Ok(b';'),
        "," | "comma" => Ok(b','),
        "\t" | "tab" => Ok(b'\t'),
        "|" | "pipe" => Ok(b'|'),
        other => Err(format!(
            "Unsupported report delimiter '{other}' (use ';', ',', 'tab' or '|')"
        )),
    }
}

pub fn parse_timeout(value: &str) -> Result<u64, String> {
    let seconds: u64 = value
        .parse()
        .map_err(|_| format!("Timeout '{value}' is not a whole number of seconds"))?;
    if seconds == 0 {
        return Err(
            "Timeout must be at least 1 second; omit --timeout to wait indefinitely".to_string(),
        );
    }
    Ok(seconds)
}
