//! Identifier and reference model for distributed-trace spans.
//!
//! This crate contains the value types a tracing backend passes around when
//! it talks about spans: fixed-width trace and span identifiers with their
//! canonical hex encodings, the span-level flag bitmask, typed references
//! between spans, and the [`Span`] aggregate with its derived parent
//! relationship and structural fingerprint. There is no transport, storage,
//! or sampling here; everything is plain data.
//!
//! # Identifiers
//!
//! A [`TraceId`] is 128 bits stored as two 64-bit words; a [`SpanId`] is 64
//! bits. Both render as minimal lowercase hex and parse back losslessly:
//!
//! ```
//! use trace_model::TraceId;
//!
//! let id: TraceId = "2a0000000000000043".parse().unwrap();
//! assert_eq!(id, TraceId { high: 0x2a, low: 0x43 });
//! assert_eq!(id.to_string(), "2a0000000000000043");
//! ```
//!
//! On the wire both ids travel as quoted hex strings. Struct fields opt into
//! that encoding through the [`trace_id_hex`] and [`span_id_hex`] serde
//! codecs; serializing a bare [`TraceId`] through serde is refused so no
//! second, divergent encoding can appear.
//!
//! # References and parents
//!
//! A span does not store its parent id. It stores an ordered list of
//! [`SpanRef`]s, and the parent is derived: the first `CHILD_OF` reference
//! into the span's own trace wins.
//!
//! ```
//! use trace_model::{maybe_add_parent_span_id, SpanId, SpanRef, TraceId};
//!
//! let trace_id = TraceId { high: 0, low: 1 };
//! let refs = maybe_add_parent_span_id(trace_id, SpanId::from(123), Vec::new());
//! assert_eq!(refs, vec![SpanRef::child_of(trace_id, SpanId::from(123))]);
//! ```

mod common;
mod error;
mod ids;
mod span;
mod span_ref;

pub use common::{KeyValue, Log, Process, Value};
pub use error::Error;
pub use ids::{span_id_hex, trace_id_hex, Flags, SpanId, TraceId};
pub use span::{Span, SPAN_KIND_KEY, SPAN_KIND_RPC_CLIENT, SPAN_KIND_RPC_SERVER};
pub use span_ref::{maybe_add_parent_span_id, SpanRef, SpanRefType};
