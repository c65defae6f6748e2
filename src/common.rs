use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// The value part of a [`KeyValue`] tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value.
    #[serde(rename = "bool")]
    Bool(bool),
    /// Signed 64-bit integer value.
    #[serde(rename = "int64")]
    I64(i64),
    /// 64-bit float value.
    #[serde(rename = "float64")]
    F64(f64),
    /// String value.
    #[serde(rename = "string")]
    String(String),
    /// Opaque byte value; renders as lowercase hex.
    #[serde(rename = "binary")]
    Binary(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => v.fmt(f),
            Value::I64(v) => v.fmt(f),
            Value::F64(v) => v.fmt(f),
            Value::String(v) => v.fmt(f),
            Value::Binary(v) => {
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// A tag attached to a span, a log record, or a process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: Value,
}

impl KeyValue {
    /// A string-valued tag.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: Value::String(value.into()),
        }
    }

    /// A boolean tag.
    pub fn bool(key: impl Into<String>, value: bool) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: Value::Bool(value),
        }
    }

    /// An integer tag.
    pub fn int64(key: impl Into<String>, value: i64) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: Value::I64(value),
        }
    }

    /// A float tag.
    pub fn float64(key: impl Into<String>, value: f64) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: Value::F64(value),
        }
    }

    /// An opaque binary tag.
    pub fn binary(key: impl Into<String>, value: Vec<u8>) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: Value::Binary(value),
        }
    }
}

/// A timestamped set of tags recorded during a span's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// When the record was made.
    pub timestamp: SystemTime,
    /// What was recorded.
    pub fields: Vec<KeyValue>,
}

/// The process that emitted a span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Name of the emitting service.
    pub service_name: String,
    /// Process-level tags.
    pub tags: Vec<KeyValue>,
}
