// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metric values as delivered by the host.
//!
//! Storm hands metric values over untyped. They are narrowed here, at the
//! boundary, into a closed set of shapes so the translator can match on
//! them exhaustively. Anything that fits none of the shapes becomes
//! [`MetricValue::Unsupported`] and keeps its type name for diagnostics.

use std::collections::BTreeMap;

/// A metric value reported by a Storm component.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// No value was reported.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Any other numeric width.
    Numeric(Numeric),
    /// UTF-8 string.
    String(String),
    /// Named sub-metrics, flattened into dotted measurement names.
    Map(BTreeMap<String, MetricValue>),
    /// A value of a type that cannot be exported.
    Unsupported {
        /// Name of the observed runtime type.
        type_name: String,
    },
}

/// Numeric values that are neither `i64` nor `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// 32-bit signed integer, widened to an integer field.
    I32(i32),
    /// 64-bit unsigned integer, written as an integer when it fits `i64`.
    U64(u64),
    /// 128-bit signed integer, written as an integer when it fits `i64`.
    I128(i128),
    /// 32-bit floating point, widened to a float field.
    F32(f32),
}

impl MetricValue {
    /// Wrap a value of a type this crate does not know how to export.
    ///
    /// Only the type name is kept.
    pub fn opaque<T: ?Sized>(_value: &T) -> Self {
        MetricValue::Unsupported {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// Short name of the value's shape, used in log messages.
    pub fn kind(&self) -> &str {
        match self {
            MetricValue::Null => "null",
            MetricValue::Bool(_) => "bool",
            MetricValue::Integer(_) => "i64",
            MetricValue::Float(_) => "f64",
            MetricValue::Numeric(Numeric::I32(_)) => "i32",
            MetricValue::Numeric(Numeric::U64(_)) => "u64",
            MetricValue::Numeric(Numeric::I128(_)) => "i128",
            MetricValue::Numeric(Numeric::F32(_)) => "f32",
            MetricValue::String(_) => "string",
            MetricValue::Map(_) => "map",
            MetricValue::Unsupported { type_name } => type_name.as_str(),
        }
    }
}

impl From<serde_json::Value> for MetricValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => MetricValue::Null,
            serde_json::Value::Bool(b) => MetricValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetricValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    MetricValue::Numeric(Numeric::U64(u))
                } else {
                    // serde_json numbers are always one of i64/u64/f64
                    n.as_f64().map_or(MetricValue::Null, MetricValue::Float)
                }
            }
            serde_json::Value::String(s) => MetricValue::String(s),
            serde_json::Value::Object(map) => MetricValue::Map(
                map.into_iter().map(|(k, v)| (k, MetricValue::from(v))).collect(),
            ),
            serde_json::Value::Array(_) => MetricValue::Unsupported {
                type_name: "array".to_string(),
            },
        }
    }
}

impl From<&serde_json::Value> for MetricValue {
    fn from(value: &serde_json::Value) -> Self {
        MetricValue::from(value.clone())
    }
}

impl<T: Into<MetricValue>> From<Option<T>> for MetricValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MetricValue::Null, Into::into)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        MetricValue::Numeric(Numeric::I32(v))
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Numeric(Numeric::U64(v))
    }
}

impl From<i128> for MetricValue {
    fn from(v: i128) -> Self {
        MetricValue::Numeric(Numeric::I128(v))
    }
}

impl From<f32> for MetricValue {
    fn from(v: f32) -> Self {
        MetricValue::Numeric(Numeric::F32(v))
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::String(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::String(v.to_string())
    }
}

impl<V: Into<MetricValue>> From<BTreeMap<String, V>> for MetricValue {
    fn from(map: BTreeMap<String, V>) -> Self {
        MetricValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<V: Into<MetricValue>> FromIterator<(String, V)> for MetricValue {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        MetricValue::Map(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
