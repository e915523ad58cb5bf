// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storm InfluxDB metrics consumer
//!
//! Forwards Storm metric data points to InfluxDB 1.x as Line Protocol.
//!
//! This crate provides:
//! - Layered configuration from Storm settings (`storm.yaml`, registration argument)
//! - Translation of metric values, including nested maps, into points
//! - InfluxDB Line Protocol encoding
//! - A blocking HTTP write client
//! - The `prepare` / `handle_data_points` / `cleanup` consumer lifecycle
//!
//! # Overview
//!
//! ```text
//! DataPoint --> translate --> Batch (origin tags) --> Line Protocol --> POST /write
//! ```
//!
//! # Example
//!
//! ```no_run
//! use storm_influxdb_metrics::{DataPoint, MetricsConsumer, Settings, TaskInfo, TopologyContext};
//!
//! let conf = Settings::from_yaml(r#"
//! topology.name: "wordcount"
//! metrics.influxdb.url: "http://localhost:8086"
//! metrics.influxdb.username: "storm"
//! metrics.influxdb.password: "secret"
//! metrics.influxdb.db: "metrics"
//! "#).expect("valid settings");
//!
//! let mut consumer = MetricsConsumer::new();
//! let report = |e: &dyn std::error::Error| eprintln!("metrics consumer: {e}");
//! consumer.prepare(&conf, None, &TopologyContext::default(), &report).expect("prepare");
//!
//! let task = TaskInfo {
//!     src_worker_host: "worker-1".into(),
//!     src_worker_port: 6700,
//!     src_component_id: "split".into(),
//!     src_task_id: 3,
//!     timestamp_secs: 1_700_000_000,
//!     update_interval_secs: 60,
//! };
//! consumer
//!     .handle_data_points(&task, &[DataPoint::new("__ack-count", 42i64)])
//!     .expect("write");
//! consumer.cleanup();
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod consumer;
pub mod influx;
pub mod translate;
pub mod value;

pub use batch::{Batch, OriginTags};
pub use client::{BatchWriter, ClientError, Connector, HttpConnector, HttpWriter};
pub use config::{resolve, ConfigError, InfluxConfig, Secret, Settings};
pub use consumer::{
    ConsumerError, ConsumerState, DataPoint, ErrorReporter, MetricsConsumer, TaskInfo,
    TopologyContext,
};
pub use influx::{FieldValue, LineProtocolWriter, Point};
pub use translate::{translate, Diagnostic, Translation};
pub use value::{MetricValue, Numeric};
