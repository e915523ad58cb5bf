// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol encoding.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use std::fmt;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// - Float: written as-is (e.g., `3.14`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - String: quoted with double quotes, inner quotes escaped (e.g., `"hello"`)
    /// - Boolean: `true` or `false`
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

/// A single measurement with its fields. Tags and timestamp belong to the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    fields: Vec<(String, FieldValue)>,
}

impl Point {
    /// A point with one field named `value`.
    pub fn value(measurement: impl Into<String>, value: FieldValue) -> Self {
        Self {
            measurement: measurement.into(),
            fields: vec![("value".to_string(), value)],
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// InfluxDB Line Protocol writer.
///
/// Appends one line per point to an internal body buffer.
#[derive(Default)]
pub struct LineProtocolWriter {
    body: String,
    lines: usize,
}

impl LineProtocolWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a single point in Line Protocol format.
    ///
    /// # Arguments
    /// - `point` - Measurement and fields
    /// - `tags` - Tag key-value pairs (indexed, for filtering)
    /// - `timestamp` - Timestamp in the precision the request declares, if any
    ///
    /// Tags with an empty value are skipped; InfluxDB rejects them.
    pub fn write_point(&mut self, point: &Point, tags: &[(&str, &str)], timestamp: Option<i64>) {
        if self.lines > 0 {
            self.body.push('\n');
        }

        self.body.push_str(&escape_measurement(&point.measurement));

        // Append tags (sorted by key for canonical form)
        let mut sorted_tags: Vec<_> = tags.iter().filter(|(_, v)| !v.is_empty()).collect();
        sorted_tags.sort_by_key(|(k, _)| *k);
        for (key, value) in &sorted_tags {
            self.body.push(',');
            self.body.push_str(&escape_key(key));
            self.body.push('=');
            self.body.push_str(&escape_key(value));
        }

        self.body.push(' ');

        for (i, (key, value)) in point.fields.iter().enumerate() {
            if i > 0 {
                self.body.push(',');
            }
            self.body.push_str(&escape_key(key));
            self.body.push('=');
            self.body.push_str(&value.to_line_protocol());
        }

        if let Some(ts) = timestamp {
            self.body.push(' ');
            self.body.push_str(&ts.to_string());
        }

        self.lines += 1;
    }

    /// Take the accumulated body, leaving the writer empty.
    pub fn finish(&mut self) -> String {
        self.lines = 0;
        std::mem::take(&mut self.body)
    }
}

/// Escape a measurement name for Line Protocol.
/// Spaces and commas must be escaped with backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape tag keys, tag values and field keys.
/// Commas, equals signs, and spaces must be escaped.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
