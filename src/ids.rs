use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A bit map of flags carried by a span.
///
/// Two bits are assigned; the rest of the word is reserved and is preserved,
/// never cleared, by the setters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u32);

impl Flags {
    /// Flag bit marking a span as sampled.
    pub const SAMPLED: Flags = Flags(1);

    /// Flag bit marking a span as a debug span.
    pub const DEBUG: Flags = Flags(2);

    /// Construct flags from a raw bit map.
    pub const fn new(flags: u32) -> Self {
        Flags(flags)
    }

    /// Sets the sampled bit, leaving all other bits untouched.
    pub fn set_sampled(&mut self) {
        self.set(Self::SAMPLED)
    }

    /// Sets the debug bit, leaving all other bits untouched.
    pub fn set_debug(&mut self) {
        self.set(Self::DEBUG)
    }

    fn set(&mut self, bit: Flags) {
        *self = *self | bit
    }

    /// Returns `true` if the sampled bit is set.
    pub fn is_sampled(&self) -> bool {
        self.check(Self::SAMPLED)
    }

    /// Returns `true` if the debug bit is set.
    ///
    /// Debug spans are useful when testing tracing availability or
    /// correctness.
    pub fn is_debug(&self) -> bool {
        self.check(Self::DEBUG)
    }

    fn check(&self, bit: Flags) -> bool {
        (*self & bit) == bit
    }

    /// Returns the flags as a `u32`.
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for Flags {
    fn from(value: u32) -> Self {
        Flags(value)
    }
}

impl BitAnd for Flags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// A 128-bit identifier for a trace, stored as two 64-bit words.
///
/// The canonical text form is minimal lowercase hex: the high word is omitted
/// entirely while zero, otherwise it renders unpadded followed by the low
/// word zero-padded to 16 digits. Parsing accepts anything `Display`
/// produces, so the two directions round-trip.
///
/// ```
/// use trace_model::TraceId;
///
/// assert_eq!(TraceId { high: 0, low: 0x42 }.to_string(), "42");
///
/// let id: TraceId = "2a0000000000000043".parse().unwrap();
/// assert_eq!(id, TraceId { high: 0x2a, low: 0x43 });
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId {
    /// The most significant 64 bits.
    pub high: u64,
    /// The least significant 64 bits.
    pub low: u64,
}

impl TraceId {
    /// The all-zero trace id.
    pub const INVALID: TraceId = TraceId { high: 0, low: 0 };

    /// Encodes the id as a quoted JSON string fragment.
    pub fn encode_json(&self) -> String {
        format!("\"{}\"", self)
    }

    /// Decodes the id from a quoted JSON string fragment.
    ///
    /// The fragment must be at least three bytes and enclosed in double
    /// quotes; both are checked before any hex parsing happens.
    ///
    /// ```
    /// use trace_model::TraceId;
    ///
    /// let id = TraceId::decode_json(b"\"42\"").unwrap();
    /// assert_eq!(id, TraceId { high: 0, low: 0x42 });
    /// assert!(TraceId::decode_json(b"42").is_err());
    /// ```
    pub fn decode_json(data: &[u8]) -> Result<TraceId, Error> {
        unquote("TraceId", data)?.parse()
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId {
            high: (value >> 64) as u64,
            low: value as u64,
        }
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == 0 {
            write!(f, "{:x}", self.low)
        } else {
            write!(f, "{:x}{:016x}", self.high, self.low)
        }
    }
}

impl FromStr for TraceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > 32 {
            return Err(Error::TraceIdTooLong(s.to_owned()));
        }
        if s.len() > 16 {
            let split = s.len() - 16;
            // A split landing inside a multi-byte character means the input
            // was never hex to begin with.
            match (s.get(..split), s.get(split..)) {
                (Some(high), Some(low)) => Ok(TraceId {
                    high: parse_hex_u64(high)?,
                    low: parse_hex_u64(low)?,
                }),
                _ => Err(Error::InvalidHex(s.to_owned())),
            }
        } else {
            Ok(TraceId {
                high: 0,
                low: parse_hex_u64(s)?,
            })
        }
    }
}

/// Always fails. The canonical serde encoding for a [`TraceId`] field is
/// [`trace_id_hex`]; refusing the generic path keeps a derived encoding from
/// silently disagreeing with it.
impl Serialize for TraceId {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Err(ser::Error::custom(
            "TraceId does not support generic serialization; \
             annotate the field with #[serde(with = \"trace_id_hex\")]",
        ))
    }
}

/// Always fails, mirroring the `Serialize` impl.
impl<'de> Deserialize<'de> for TraceId {
    fn deserialize<D>(_deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(de::Error::custom(
            "TraceId does not support generic deserialization; \
             annotate the field with #[serde(with = \"trace_id_hex\")]",
        ))
    }
}

/// Serde field codec rendering a [`TraceId`] as its canonical hex string.
///
/// For use with `#[serde(with = "trace_id_hex")]`.
pub mod trace_id_hex {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::ser::Serializer;

    use super::TraceId;

    pub fn serialize<S>(id: &TraceId, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TraceId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A 64-bit identifier for a single span within a trace.
///
/// Renders as minimal lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(u64);

impl SpanId {
    /// The zero span id, also used as "no parent".
    pub const INVALID: SpanId = SpanId(0);

    /// Returns the id as a `u64`.
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Encodes the id as a quoted JSON string fragment.
    pub fn encode_json(&self) -> String {
        format!("\"{}\"", self)
    }

    /// Decodes the id from a quoted JSON string fragment, enforcing the same
    /// length and quote checks as [`TraceId::decode_json`].
    pub fn decode_json(data: &[u8]) -> Result<SpanId, Error> {
        unquote("SpanId", data)?.parse()
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for SpanId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > 16 {
            return Err(Error::SpanIdTooLong(s.to_owned()));
        }
        parse_hex_u64(s).map(SpanId)
    }
}

/// Unlike [`TraceId`], the generic path is permitted for span ids and emits
/// the hex string directly; [`span_id_hex`] remains the canonical codec.
impl Serialize for SpanId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpanId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serde field codec rendering a [`SpanId`] as its canonical hex string.
///
/// For use with `#[serde(with = "span_id_hex")]`.
pub mod span_id_hex {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::ser::Serializer;

    use super::SpanId;

    pub fn serialize<S>(id: &SpanId, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SpanId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

fn parse_hex_u64(s: &str) -> Result<u64, Error> {
    u64::from_str_radix(s, 16).map_err(|_| Error::InvalidHex(s.to_owned()))
}

fn unquote<'a>(kind: &'static str, data: &'a [u8]) -> Result<&'a str, Error> {
    if data.len() < 3 {
        return Err(Error::WireTooShort {
            kind,
            value: String::from_utf8_lossy(data).into_owned(),
        });
    }
    if data[0] != b'"' || data[data.len() - 1] != b'"' {
        return Err(Error::WireNotQuoted {
            kind,
            value: String::from_utf8_lossy(data).into_owned(),
        });
    }
    std::str::from_utf8(&data[1..data.len() - 1])
        .map_err(|_| Error::InvalidHex(String::from_utf8_lossy(data).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn trace_id_test_data() -> Vec<(TraceId, &'static str)> {
        vec![
            (TraceId { high: 0, low: 0 }, "0"),
            (TraceId { high: 0, low: 0x42 }, "42"),
            (TraceId { high: 0x2a, low: 0x43 }, "2a0000000000000043"),
            (TraceId { high: 0x58406520a0066491, low: 0x27e371903a2de979 }, "58406520a006649127e371903a2de979"),
        ]
    }

    #[test]
    fn trace_id_to_from_string() {
        for (id, s) in trace_id_test_data() {
            assert_eq!(id.to_string(), s);
            assert_eq!(s.parse::<TraceId>().unwrap(), id, "{}", s);
        }
    }

    #[test]
    fn trace_id_from_string_errors() {
        let too_long = "0".repeat(33);
        assert!(matches!(
            too_long.parse::<TraceId>(),
            Err(Error::TraceIdTooLong(_))
        ));

        assert!(matches!(
            "not_hex".parse::<TraceId>(),
            Err(Error::InvalidHex(_))
        ));
        // High and low halves fail independently.
        assert!(matches!(
            "zz406520a006649127e371903a2de979".parse::<TraceId>(),
            Err(Error::InvalidHex(v)) if v == "zz406520a0066491"
        ));
        assert!(matches!(
            "58406520a006649127e371903a2dezzz".parse::<TraceId>(),
            Err(Error::InvalidHex(v)) if v == "27e371903a2dezzz"
        ));
    }

    #[test]
    fn trace_id_json_codec() {
        let id = TraceId { high: 0, low: 0x42 };
        assert_eq!(id.encode_json(), "\"42\"");
        assert_eq!(TraceId::decode_json(b"\"42\"").unwrap(), id);

        assert!(matches!(
            TraceId::decode_json(b"\"\""),
            Err(Error::WireTooShort { kind: "TraceId", .. })
        ));
        assert!(matches!(
            TraceId::decode_json(b"425"),
            Err(Error::WireNotQuoted { kind: "TraceId", .. })
        ));
        assert!(TraceId::decode_json(b"\"xy\"").is_err());
    }

    #[test]
    fn trace_id_generic_serde_path_is_disabled() {
        let id = TraceId { high: 0, low: 0x42 };
        assert!(serde_json::to_string(&id).is_err());
        assert!(serde_json::from_str::<TraceId>("\"42\"").is_err());
    }

    #[rustfmt::skip]
    fn span_id_test_data() -> Vec<(SpanId, &'static str)> {
        vec![
            (SpanId(0), "0"),
            (SpanId(0x42), "42"),
            (SpanId(0x4c721bf33e3caf8f), "4c721bf33e3caf8f"),
        ]
    }

    #[test]
    fn span_id_to_from_string() {
        for (id, s) in span_id_test_data() {
            assert_eq!(id.to_string(), s);
            assert_eq!(s.parse::<SpanId>().unwrap(), id, "{}", s);
        }
    }

    #[test]
    fn span_id_from_string_errors() {
        let too_long = "0".repeat(17);
        assert!(matches!(
            too_long.parse::<SpanId>(),
            Err(Error::SpanIdTooLong(_))
        ));
        assert!(matches!(
            "not_hex".parse::<SpanId>(),
            Err(Error::InvalidHex(_))
        ));
    }

    #[test]
    fn span_id_json_codec() {
        let id = SpanId(0x43);
        assert_eq!(id.encode_json(), "\"43\"");
        assert_eq!(SpanId::decode_json(b"\"43\"").unwrap(), id);

        assert!(matches!(
            SpanId::decode_json(b"\"\""),
            Err(Error::WireTooShort { kind: "SpanId", .. })
        ));
        assert!(matches!(
            SpanId::decode_json(b"435"),
            Err(Error::WireNotQuoted { kind: "SpanId", .. })
        ));
    }

    #[test]
    fn span_id_generic_serde_path_emits_hex() {
        assert_eq!(serde_json::to_string(&SpanId(0x43)).unwrap(), "\"43\"");
        assert_eq!(
            serde_json::from_str::<SpanId>("\"43\"").unwrap(),
            SpanId(0x43)
        );
    }

    #[test]
    fn flags_set_and_check() {
        let mut flags = Flags::default();
        assert!(!flags.is_sampled());
        assert!(!flags.is_debug());

        flags.set_sampled();
        assert!(flags.is_sampled());
        assert!(!flags.is_debug());

        flags.set_debug();
        assert!(flags.is_sampled());
        assert!(flags.is_debug());
    }

    #[test]
    fn flags_setters_preserve_reserved_bits() {
        let mut flags = Flags::new(0b1000);
        flags.set_sampled();
        assert_eq!(flags.to_u32(), 0b1001);
        flags.set_debug();
        assert_eq!(flags.to_u32(), 0b1011);
    }

    #[test]
    fn flags_serialize_as_plain_integer() {
        assert_eq!(serde_json::to_string(&Flags::new(3)).unwrap(), "3");
        assert_eq!(serde_json::from_str::<Flags>("3").unwrap(), Flags::new(3));
    }
}
