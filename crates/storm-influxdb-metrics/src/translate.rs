// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metric value translation to InfluxDB points.
//!
//! Every scalar becomes one point with a single `value` field. Maps are
//! flattened depth-first, each entry appending `.key` to the measurement
//! name. Null, unsupported and non-finite values are dropped with a
//! warning.

use crate::influx::{FieldValue, Point};
use crate::value::{MetricValue, Numeric};

/// Why a metric was not exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The metric carried no value.
    NullValue { name: String },
    /// The metric's value has a type that cannot be written to InfluxDB.
    UnsupportedType { name: String, type_name: String },
    /// NaN or infinite; Line Protocol has no literal for either.
    NonFinite { name: String },
}

impl Diagnostic {
    /// Measurement name of the dropped metric.
    pub fn name(&self) -> &str {
        match self {
            Diagnostic::NullValue { name }
            | Diagnostic::UnsupportedType { name, .. }
            | Diagnostic::NonFinite { name } => name,
        }
    }
}

/// Points and diagnostics produced from one metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub points: Vec<Point>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate one metric into points.
///
/// `prefix` is prepended to `name` once; nested map entries extend the
/// already prefixed name.
pub fn translate(name: &str, value: &MetricValue, prefix: &str) -> Translation {
    let mut out = Translation::default();
    let effective = format!("{}{}", prefix, name);
    translate_into(&effective, value, &mut out);
    out
}

fn translate_into(name: &str, value: &MetricValue, out: &mut Translation) {
    let field = match value {
        MetricValue::Null => {
            log::warn!(
                "Datapoint will not be exported, value is null: [name='{}']",
                name
            );
            out.diagnostics.push(Diagnostic::NullValue {
                name: name.to_string(),
            });
            return;
        }
        MetricValue::Bool(b) => FieldValue::Boolean(*b),
        MetricValue::Integer(i) => FieldValue::Integer(*i),
        MetricValue::Float(f) => FieldValue::Float(*f),
        MetricValue::Numeric(n) => numeric_field(*n),
        MetricValue::String(s) => FieldValue::String(s.clone()),
        MetricValue::Map(entries) => {
            for (key, entry) in entries {
                translate_into(&format!("{}.{}", name, key), entry, out);
            }
            return;
        }
        MetricValue::Unsupported { type_name } => {
            log::warn!(
                "Datapoint will not be exported, unsupported value type: [name='{}' type='{}']",
                name,
                type_name
            );
            out.diagnostics.push(Diagnostic::UnsupportedType {
                name: name.to_string(),
                type_name: type_name.clone(),
            });
            return;
        }
    };
    if let FieldValue::Float(f) = field {
        if !f.is_finite() {
            log::warn!(
                "Datapoint will not be exported, value is not finite: [name='{}' value={}]",
                name,
                f
            );
            out.diagnostics.push(Diagnostic::NonFinite {
                name: name.to_string(),
            });
            return;
        }
    }
    out.points.push(Point::value(name, field));
}

/// Natural field representation of the non-`i64`/`f64` numerics.
///
/// InfluxDB 1.x has no unsigned literal, so wide integers that do not fit
/// an `i64` are written as floats.
fn numeric_field(n: Numeric) -> FieldValue {
    match n {
        Numeric::I32(v) => FieldValue::Integer(i64::from(v)),
        Numeric::U64(v) => match i64::try_from(v) {
            Ok(i) => FieldValue::Integer(i),
            Err(_) => FieldValue::Float(v as f64),
        },
        Numeric::I128(v) => match i64::try_from(v) {
            Ok(i) => FieldValue::Integer(i),
            Err(_) => FieldValue::Float(v as f64),
        },
        Numeric::F32(v) => FieldValue::Float(f64::from(v)),
    }
}
