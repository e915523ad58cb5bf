// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB 1.x HTTP write client.
//!
//! Batches are sent as Line Protocol to `POST {url}/write?db=..&precision=s`
//! with HTTP basic authentication. Writes are blocking and never retried.

use crate::batch::Batch;
use crate::config::{InfluxConfig, Secret};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building the client or writing a batch.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("InfluxDB URL is not configured ({})", crate::config::INFLUXDB_URL)]
    MissingUrl,

    #[error("InfluxDB username is not configured ({})", crate::config::INFLUXDB_USERNAME)]
    MissingUsername,

    #[error("InfluxDB database is not configured ({})", crate::config::INFLUXDB_DATABASE)]
    MissingDatabase,

    #[error("Invalid InfluxDB URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("InfluxDB rejected write (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Sends a batch to the time-series database.
pub trait BatchWriter {
    fn write(&self, batch: &Batch) -> Result<(), ClientError>;
}

/// Builds a [`BatchWriter`] from a resolved configuration.
pub trait Connector {
    type Writer: BatchWriter;

    fn connect(&self, config: &InfluxConfig) -> Result<Self::Writer, ClientError>;
}

/// Connector producing [`HttpWriter`]s.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    timeout: Option<Duration>,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the HTTP client's request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Connector for HttpConnector {
    type Writer = HttpWriter;

    fn connect(&self, config: &InfluxConfig) -> Result<HttpWriter, ClientError> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ClientError::MissingUrl)?;
        let username = config
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or(ClientError::MissingUsername)?;

        log::debug!(
            "Creating new connection to InfluxDB: [url='{}' username='{}' database='{}']",
            url,
            username,
            config.database.as_deref().unwrap_or("")
        );

        let write_url = write_endpoint(url)?;
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpWriter {
            client: builder.build()?,
            write_url,
            username,
            password: config.password.clone(),
        })
    }
}

/// Blocking HTTP connection to one InfluxDB server.
#[derive(Debug)]
pub struct HttpWriter {
    client: reqwest::blocking::Client,
    write_url: reqwest::Url,
    username: String,
    password: Option<Secret>,
}

impl HttpWriter {
    /// Full URL of the write endpoint, without query parameters.
    pub fn write_url(&self) -> &reqwest::Url {
        &self.write_url
    }
}

impl BatchWriter for HttpWriter {
    fn write(&self, batch: &Batch) -> Result<(), ClientError> {
        let database = batch
            .database()
            .filter(|db| !db.is_empty())
            .ok_or(ClientError::MissingDatabase)?;

        // InfluxDB answers an empty body with 400
        if batch.is_empty() {
            log::debug!("Nothing to write to InfluxDB database '{}'", database);
            return Ok(());
        }

        let response = self
            .client
            .post(self.write_url.clone())
            .query(&[("db", database), ("precision", "s")])
            .basic_auth(&self.username, self.password.as_ref().map(Secret::expose))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(batch.to_line_protocol())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!(
            "Wrote {} points to InfluxDB database '{}'",
            batch.len(),
            database
        );
        Ok(())
    }
}

/// Resolve `{url}/write`, keeping any base path the URL carries.
fn write_endpoint(url: &str) -> Result<reqwest::Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let mut base = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("write").map_err(|e| invalid(e.to_string()))
}
