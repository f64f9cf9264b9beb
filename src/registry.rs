//! BrasilAPI CNPJ registry client.
//!
//! One blocking GET per identifier, no retry. [`RegistryClient::fetch`] keeps
//! the failure kinds apart; [`RegistryClient::lookup`] collapses them into
//! `None` after logging, which is what the batch driver consumes.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::{StatusCode, blocking::Client};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cnpj;

pub const CNPJ_PLACEHOLDER: &str = "{cnpj}";
pub const DEFAULT_ENDPOINT: &str = "https://brasilapi.com.br/api/cnpj/v1/{cnpj}";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("registry answered with status {0}")]
    Status(u16),
    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable registry response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::Status(code) if *code == StatusCode::NOT_FOUND.as_u16())
    }
}

/// A company record as returned by the registry, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RegistryRecord(Map<String, Value>);

impl RegistryRecord {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Renders a field as report text. Missing and `null` fields are empty.
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Whether a field holds a truthy value (`true`, non-zero, non-empty).
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
        }
    }
}

impl From<Map<String, Value>> for RegistryRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub struct RegistryClient {
    http: Client,
    endpoint: String,
}

impl RegistryClient {
    /// Builds a client for `endpoint`, a URL template containing `{cnpj}`.
    ///
    /// `timeout` of `None` lets requests wait indefinitely.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn url_for(&self, digits: &str) -> String {
        self.endpoint.replace(CNPJ_PLACEHOLDER, digits)
    }

    pub fn fetch(&self, raw: &str) -> Result<RegistryRecord, LookupError> {
        let digits = cnpj::normalize(raw);
        if !cnpj::is_well_formed(&digits) {
            debug!("'{raw}' does not normalize to 14 digits; querying anyway");
        }
        let url = self.url_for(&digits);
        debug!("GET {url}");

        let response = self.http.get(&url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body = response.text()?;
        Ok(RegistryRecord::from_json(&body)?)
    }

    pub fn lookup(&self, raw: &str) -> Option<RegistryRecord> {
        match self.fetch(raw) {
            Ok(record) => {
                info!("OK: {raw}");
                Some(record)
            }
            Err(LookupError::Status(code)) => {
                warn!("Error querying CNPJ: {code}");
                None
            }
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }
}
