// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storm metrics consumer.
//!
//! Storm drives the consumer through three callbacks: `prepare` once,
//! `handle_data_points` for every metrics tick, and `cleanup` at shutdown.
//! Each delivery is translated into one batch and written with one request.

use crate::batch::{Batch, OriginTags};
use crate::client::{BatchWriter, ClientError, Connector, HttpConnector};
use crate::config::{InfluxConfig, Settings};
use crate::value::MetricValue;
use once_cell::sync::OnceCell;
use thiserror::Error;

/// Errors returned by the consumer callbacks.
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Consumer has not been prepared")]
    NotPrepared,

    #[error("Consumer has been cleaned up")]
    Closed,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Lifecycle state of a [`MetricsConsumer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Uninitialized,
    Ready,
    Closed,
}

/// Identity of the task that emitted a set of data points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub src_worker_host: String,
    pub src_worker_port: u16,
    pub src_component_id: String,
    pub src_task_id: i32,
    /// Collection time, seconds since the Unix epoch.
    pub timestamp_secs: i64,
    pub update_interval_secs: u32,
}

/// A named metric value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub name: String,
    pub value: MetricValue,
}

impl DataPoint {
    pub fn new(name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What Storm tells the consumer about where it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyContext {
    pub topology_id: String,
    pub component_id: String,
    pub task_id: i32,
}

/// Host-side sink for errors the consumer cannot return.
pub trait ErrorReporter {
    fn report_error(&self, error: &dyn std::error::Error);
}

impl<F: Fn(&dyn std::error::Error)> ErrorReporter for F {
    fn report_error(&self, error: &dyn std::error::Error) {
        self(error)
    }
}

/// Forwards Storm metrics to InfluxDB.
///
/// The connection is created on first use, by `prepare` or by the first
/// delivery, and lives until `cleanup`.
pub struct MetricsConsumer<C: Connector = HttpConnector> {
    connector: C,
    state: ConsumerState,
    config: InfluxConfig,
    client: OnceCell<C::Writer>,
}

impl MetricsConsumer<HttpConnector> {
    /// Create a consumer writing over HTTP.
    pub fn new() -> Self {
        Self::with_connector(HttpConnector::new())
    }
}

impl Default for MetricsConsumer<HttpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> MetricsConsumer<C> {
    /// Create a consumer with a custom connection factory.
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            state: ConsumerState::Uninitialized,
            config: InfluxConfig::default(),
            client: OnceCell::new(),
        }
    }

    /// Resolve the configuration and try to connect.
    ///
    /// `registration_argument` overrides `storm_conf` when it is a map.
    /// A connection failure is handed to `reporter` and retried on the
    /// next delivery.
    pub fn prepare(
        &mut self,
        storm_conf: &Settings,
        registration_argument: Option<&serde_json::Value>,
        context: &TopologyContext,
        reporter: &dyn ErrorReporter,
    ) -> Result<(), ConsumerError> {
        if self.state == ConsumerState::Closed {
            return Err(ConsumerError::Closed);
        }

        let mut config = InfluxConfig::default().layered(storm_conf);
        match registration_argument {
            Some(serde_json::Value::Object(map)) => config.apply(&Settings::from(map.clone())),
            Some(serde_json::Value::Null) | None => {}
            Some(other) => log::debug!("Ignoring non-map registration argument: {}", other),
        }
        self.config = config;
        self.state = ConsumerState::Ready;

        log::info!(
            "InfluxDB metrics consumer prepared for {}/{} task {}",
            context.topology_id,
            context.component_id,
            context.task_id
        );

        if let Err(e) = self.connect_if_needed() {
            log::warn!("InfluxDB connection not available yet: {}", e);
            reporter.report_error(&e);
        }
        Ok(())
    }

    /// Translate `data_points` into one batch and write it.
    ///
    /// Returns the number of points written. The batch is always handed to
    /// the writer, even when every data point was dropped.
    pub fn handle_data_points(
        &mut self,
        task_info: &TaskInfo,
        data_points: &[DataPoint],
    ) -> Result<usize, ConsumerError> {
        match self.state {
            ConsumerState::Uninitialized => return Err(ConsumerError::NotPrepared),
            ConsumerState::Closed => return Err(ConsumerError::Closed),
            ConsumerState::Ready => {}
        }

        let client = self.connect_if_needed()?;

        let tags = OriginTags {
            worker_host: task_info.src_worker_host.clone(),
            worker_port: task_info.src_worker_port,
            component_id: task_info.src_component_id.clone(),
            task_id: task_info.src_task_id,
            topology: self.config.topology_name.clone(),
        };
        let mut batch = Batch::new(
            self.config.database.clone(),
            tags,
            Some(task_info.timestamp_secs),
        );

        let mut dropped = 0;
        for data_point in data_points {
            dropped += batch
                .record(&data_point.name, &data_point.value, &self.config.measurement_prefix)
                .len();
        }

        if dropped > 0 {
            log::debug!(
                "Dropped {} data points from {}:{}",
                dropped,
                task_info.src_component_id,
                task_info.src_task_id
            );
        }

        client.write(&batch)?;
        Ok(batch.len())
    }

    /// Release the connection. The consumer cannot be used afterwards.
    pub fn cleanup(&mut self) {
        if self.state != ConsumerState::Closed {
            log::info!("InfluxDB metrics consumer cleaned up");
        }
        self.client.take();
        self.state = ConsumerState::Closed;
    }

    pub fn state(&self) -> ConsumerState {
        self.state
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    /// Whether a connection has been created.
    pub fn is_connected(&self) -> bool {
        self.client.get().is_some()
    }

    fn connect_if_needed(&self) -> Result<&C::Writer, ClientError> {
        self.client
            .get_or_try_init(|| self.connector.connect(&self.config))
    }
}
