//! Envelope - the opaque unit of data flowing through the pipeline
//!
//! The core never interprets payload contents beyond the emptiness check
//! that governs the drop rule; transforms are free to replace an envelope
//! with any other variant.

use std::borrow::Cow;
use std::fmt;

/// Opaque payload flowing from a source through transforms to sinks.
///
/// Responses routed back from a transform to the source reuse this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Raw bytes, e.g. a network read or unhexlified line
    Bytes(Vec<u8>),
    /// A line of text
    Text(String),
    /// A structured record produced by a decoding transform
    Record(serde_json::Value),
}

impl Envelope {
    /// An empty envelope signals "drop this item" when returned by a
    /// transform.
    pub fn is_empty(&self) -> bool {
        match self {
            Envelope::Bytes(b) => b.is_empty(),
            Envelope::Text(t) => t.is_empty(),
            Envelope::Record(v) => v.is_null(),
        }
    }

    /// Byte view of the payload, serializing records to compact JSON.
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Envelope::Bytes(b) => Cow::Borrowed(b),
            Envelope::Text(t) => Cow::Borrowed(t.as_bytes()),
            Envelope::Record(v) => Cow::Owned(v.to_string().into_bytes()),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Envelope::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Envelope::Text(t) => write!(f, "{}", t),
            Envelope::Record(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness() {
        assert!(Envelope::Bytes(vec![]).is_empty());
        assert!(Envelope::Text(String::new()).is_empty());
        assert!(Envelope::Record(serde_json::Value::Null).is_empty());

        assert!(!Envelope::Bytes(vec![0]).is_empty());
        assert!(!Envelope::Text("x".into()).is_empty());
        assert!(!Envelope::Record(json!({})).is_empty());
    }

    #[test]
    fn byte_views() {
        assert_eq!(Envelope::Text("hi".into()).bytes().as_ref(), b"hi");
        assert_eq!(Envelope::Bytes(vec![1, 2]).bytes().as_ref(), &[1, 2]);
        assert_eq!(
            Envelope::Record(json!({"a": 1})).bytes().as_ref(),
            br#"{"a":1}"#
        );
    }

    #[test]
    fn display() {
        assert_eq!(Envelope::Text("hello".into()).to_string(), "hello");
        assert_eq!(Envelope::Bytes(b"raw".to_vec()).to_string(), "raw");
        assert_eq!(Envelope::Record(json!([1])).to_string(), "[1]");
    }
}
