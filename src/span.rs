use std::io;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::common::{KeyValue, Log, Process};
use crate::error::Error;
use crate::ids::{Flags, SpanId, TraceId};
use crate::span_ref::{maybe_add_parent_span_id, SpanRef, SpanRefType};

/// Tag key whose value classifies the span's role in an RPC.
pub const SPAN_KIND_KEY: &str = "span.kind";

/// `span.kind` value for the client side of an RPC.
pub const SPAN_KIND_RPC_CLIENT: &str = "client";

/// `span.kind` value for the server side of an RPC.
pub const SPAN_KIND_RPC_SERVER: &str = "server";

/// A single unit of work in a trace, such as an RPC or a database call.
///
/// A span does not store its parent id. It stores an ordered list of
/// [`SpanRef`]s, and the parent is derived on demand: the first `CHILD_OF`
/// reference that stays within the span's own trace wins. See
/// [`Span::parent_span_id`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// The trace this span belongs to.
    #[serde(rename = "traceID", with = "crate::ids::trace_id_hex")]
    pub trace_id: TraceId,
    /// Identifier of this span within its trace.
    #[serde(rename = "spanID", with = "crate::ids::span_id_hex")]
    pub span_id: SpanId,
    /// Name of the operation the span measures.
    pub operation_name: String,
    /// Edges to other spans, in recording order.
    pub references: Vec<SpanRef>,
    /// Sampling and debug indicators.
    pub flags: Flags,
    /// When the operation started.
    pub start_time: SystemTime,
    /// How long the operation took.
    pub duration: Duration,
    /// Span-level tags.
    pub tags: Vec<KeyValue>,
    /// Timestamped records made while the span was active.
    pub logs: Vec<Log>,
    /// The process that emitted the span.
    pub process: Option<Process>,
    /// Diagnostics attached during ingestion or processing.
    pub warnings: Vec<String>,
}

impl Span {
    /// Returns the id of the parent span, or [`SpanId::INVALID`] if there is
    /// none.
    ///
    /// The parent is the first reference, in sequence order, that is a
    /// `CHILD_OF` edge into this span's own trace. Later matching entries are
    /// ignored but left in place.
    pub fn parent_span_id(&self) -> SpanId {
        self.references
            .iter()
            .find(|r| r.trace_id == self.trace_id && r.ref_type == SpanRefType::CHILD_OF)
            .map(|r| r.span_id)
            .unwrap_or(SpanId::INVALID)
    }

    /// Rewrites the parent span reference to point at `new_parent_id`.
    ///
    /// The matching reference is mutated in place, keeping its position and
    /// kind. When no existing reference matches, the parent is recorded
    /// through [`maybe_add_parent_span_id`] instead.
    pub fn replace_parent_id(&mut self, new_parent_id: SpanId) {
        let old_parent_id = self.parent_span_id();
        for r in &mut self.references {
            if r.span_id == old_parent_id && r.trace_id == self.trace_id {
                r.span_id = new_parent_id;
                return;
            }
        }
        self.references = maybe_add_parent_span_id(
            self.trace_id,
            new_parent_id,
            std::mem::take(&mut self.references),
        );
    }

    /// Returns `true` if the span carries a `span.kind` tag whose rendered
    /// value equals `kind`.
    pub fn has_span_kind(&self, kind: &str) -> bool {
        self.tags
            .iter()
            .find(|kv| kv.key == SPAN_KIND_KEY)
            .map(|kv| kv.value.to_string() == kind)
            .unwrap_or(false)
    }

    /// Returns `true` if the span represents the client side of an RPC.
    pub fn is_rpc_client(&self) -> bool {
        self.has_span_kind(SPAN_KIND_RPC_CLIENT)
    }

    /// Returns `true` if the span represents the server side of an RPC.
    pub fn is_rpc_server(&self) -> bool {
        self.has_span_kind(SPAN_KIND_RPC_SERVER)
    }

    /// Writes a structural fingerprint of the span to `sink`.
    ///
    /// The fingerprint is a deterministic serialization of every field,
    /// nested values included: two spans produce identical output exactly
    /// when every field is equal. It goes through the generic serde encoding
    /// rather than a hand-picked field list, so a field added to this struct
    /// is covered without further work.
    pub fn hash<W: io::Write>(&self, sink: W) -> Result<(), Error> {
        bincode::serialize_into(sink, self).map_err(Error::from)
    }
}
