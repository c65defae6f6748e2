use thiserror::Error;

/// Errors produced while decoding identifiers and reference kinds.
///
/// Every parse or decode operation in this crate reports failure through this
/// enum; nothing is defaulted silently and nothing panics.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A trace id string exceeds the 32 hex characters a 128-bit id can hold.
    #[error("TraceId cannot be longer than 32 hex characters: {0}")]
    TraceIdTooLong(String),

    /// A span id string exceeds the 16 hex characters a 64-bit id can hold.
    #[error("SpanId cannot be longer than 16 hex characters: {0}")]
    SpanIdTooLong(String),

    /// An identifier's hex payload failed to parse.
    #[error("cannot parse {0:?} as a 64-bit hex number")]
    InvalidHex(String),

    /// A quoted wire value is shorter than two quotes plus one digit.
    #[error("{kind} JSON string cannot be shorter than 3 chars: {value}")]
    WireTooShort {
        /// The identifier type being decoded.
        kind: &'static str,
        /// The offending encoded value.
        value: String,
    },

    /// A wire value is not enclosed in double quotes.
    #[error("{kind} JSON string must be enclosed in quotes: {value}")]
    WireNotQuoted {
        /// The identifier type being decoded.
        kind: &'static str,
        /// The offending encoded value.
        value: String,
    },

    /// A reference-kind name is not one of the recognized values.
    #[error("{0:?} is not a valid SpanRefType name")]
    UnknownSpanRefType(String),

    /// Writing the structural fingerprint to its sink failed.
    #[error("failed to write span fingerprint: {0}")]
    Fingerprint(#[from] bincode::Error),
}
