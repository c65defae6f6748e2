use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ids::{SpanId, TraceId};

/// The kind of relationship a [`SpanRef`] records.
///
/// Integer-backed rather than a closed enum: the two named kinds cover every
/// value the wire names, but any other integer is still a valid
/// representation and round-trips untouched. Only parsing *from a name* is
/// strict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpanRefType(i32);

impl SpanRefType {
    /// The referenced span is the parent of this span.
    pub const CHILD_OF: SpanRefType = SpanRefType(0);

    /// The referenced span is a causal, non-blocking predecessor.
    pub const FOLLOWS_FROM: SpanRefType = SpanRefType(1);

    /// Construct a reference kind from a raw integer. Never fails.
    pub const fn new(value: i32) -> Self {
        SpanRefType(value)
    }

    /// Returns the kind as an `i32`.
    pub fn to_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SpanRefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CHILD_OF => f.write_str("CHILD_OF"),
            Self::FOLLOWS_FROM => f.write_str("FOLLOWS_FROM"),
            SpanRefType(other) => write!(f, "{}", other),
        }
    }
}

impl FromStr for SpanRefType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHILD_OF" => Ok(Self::CHILD_OF),
            "FOLLOWS_FROM" => Ok(Self::FOLLOWS_FROM),
            other => Err(Error::UnknownSpanRefType(other.to_owned())),
        }
    }
}

impl Serialize for SpanRefType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Self::CHILD_OF => serializer.serialize_str("CHILD_OF"),
            Self::FOLLOWS_FROM => serializer.serialize_str("FOLLOWS_FROM"),
            SpanRefType(other) => serializer.serialize_i32(other),
        }
    }
}

impl<'de> Deserialize<'de> for SpanRefType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RefTypeVisitor;

        impl<'de> Visitor<'de> for RefTypeVisitor {
            type Value = SpanRefType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"CHILD_OF\", \"FOLLOWS_FROM\", or an integer reference kind")
            }

            fn visit_str<E>(self, v: &str) -> Result<SpanRefType, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E>(self, v: i64) -> Result<SpanRefType, E>
            where
                E: de::Error,
            {
                i32::try_from(v).map(SpanRefType).map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<SpanRefType, E>
            where
                E: de::Error,
            {
                i32::try_from(v).map(SpanRefType).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RefTypeVisitor)
    }
}

/// A directed edge from one span to another, typed by relationship kind.
///
/// The referenced span may belong to a different trace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRef {
    /// Trace of the referenced span.
    #[serde(rename = "traceID", default, with = "crate::ids::trace_id_hex")]
    pub trace_id: TraceId,
    /// The referenced span.
    #[serde(rename = "spanID", default, with = "crate::ids::span_id_hex")]
    pub span_id: SpanId,
    /// How the referenced span relates to the referencing one.
    #[serde(rename = "refType", default)]
    pub ref_type: SpanRefType,
}

impl SpanRef {
    /// A reference to a parent span.
    pub fn child_of(trace_id: TraceId, span_id: SpanId) -> SpanRef {
        SpanRef {
            trace_id,
            span_id,
            ref_type: SpanRefType::CHILD_OF,
        }
    }

    /// A reference to a causal predecessor that did not block this span.
    pub fn follows_from(trace_id: TraceId, span_id: SpanId) -> SpanRef {
        SpanRef {
            trace_id,
            span_id,
            ref_type: SpanRefType::FOLLOWS_FROM,
        }
    }
}

/// Records `parent_span_id` as the parent of the span owning `references`.
///
/// No-op when `parent_span_id` is zero, or when a `CHILD_OF` reference into
/// `trace_id` is already present. Otherwise the new parent reference is
/// prepended, which makes it the derived parent under the first-match rule.
///
/// ```
/// use trace_model::{maybe_add_parent_span_id, SpanId, TraceId};
///
/// let trace_id = TraceId { high: 0, low: 1 };
/// let refs = maybe_add_parent_span_id(trace_id, SpanId::from(123), Vec::new());
/// assert_eq!(refs[0].span_id, SpanId::from(123));
/// ```
pub fn maybe_add_parent_span_id(
    trace_id: TraceId,
    parent_span_id: SpanId,
    references: Vec<SpanRef>,
) -> Vec<SpanRef> {
    if parent_span_id == SpanId::INVALID {
        return references;
    }
    if references
        .iter()
        .any(|r| r.trace_id == trace_id && r.ref_type == SpanRefType::CHILD_OF)
    {
        return references;
    }
    let mut out = Vec::with_capacity(references.len() + 1);
    out.push(SpanRef::child_of(trace_id, parent_span_id));
    out.extend(references);
    out
}
