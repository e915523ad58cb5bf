// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-delivery batch of points.
//!
//! A batch is built for one call to `handle_data_points`, carries the
//! origin tags shared by all its points, and is written in a single
//! request.

use crate::influx::{LineProtocolWriter, Point};
use crate::translate::{translate, Diagnostic};
use crate::value::MetricValue;

/// Where a batch of metrics came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTags {
    pub worker_host: String,
    pub worker_port: u16,
    pub component_id: String,
    pub task_id: i32,
    pub topology: Option<String>,
}

impl OriginTags {
    /// Tag set written with every point.
    ///
    /// An unknown topology is left out; Line Protocol has no null tag.
    pub fn tag_set(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("worker", self.worker_host.clone()),
            ("workerPort", self.worker_port.to_string()),
            ("componentId", self.component_id.clone()),
            ("taskId", self.task_id.to_string()),
        ];
        if let Some(topology) = &self.topology {
            tags.push(("topology", topology.clone()));
        }
        tags
    }
}

/// Points collected during one delivery cycle.
#[derive(Debug, Clone)]
pub struct Batch {
    database: Option<String>,
    tags: OriginTags,
    timestamp_secs: Option<i64>,
    points: Vec<Point>,
}

impl Batch {
    /// Create an empty batch.
    ///
    /// # Arguments
    /// - `database` - Target database, checked when the batch is written
    /// - `tags` - Origin tags attached to every point
    /// - `timestamp_secs` - Point time in seconds since the Unix epoch;
    ///   `None` lets the server assign it
    pub fn new(database: Option<String>, tags: OriginTags, timestamp_secs: Option<i64>) -> Self {
        Self {
            database,
            tags,
            timestamp_secs,
            points: Vec::new(),
        }
    }

    /// Translate a metric and append the resulting points.
    ///
    /// Returns the diagnostics for anything that was dropped.
    pub fn record(&mut self, name: &str, value: &MetricValue, prefix: &str) -> Vec<Diagnostic> {
        let translation = translate(name, value, prefix);
        self.points.extend(translation.points);
        translation.diagnostics
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn tags(&self) -> &OriginTags {
        &self.tags
    }

    pub fn timestamp_secs(&self) -> Option<i64> {
        self.timestamp_secs
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encode all points as a Line Protocol request body.
    pub fn to_line_protocol(&self) -> String {
        let tag_set = self.tags.tag_set();
        let tag_refs: Vec<(&str, &str)> = tag_set.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let mut writer = LineProtocolWriter::new();
        for point in &self.points {
            writer.write_point(point, &tag_refs, self.timestamp_secs);
        }
        writer.finish()
    }
}
