//! # lakemeta codec
//!
//! Self-describing binary encoding for lakemeta's persisted messages.
//!
//! Snapshots and transaction logs are stored as CBOR (RFC 8949). The
//! encoding is deterministic for the message types in this workspace:
//! - Struct fields are written in declaration order
//! - Sequences keep their order
//! - No maps with unordered keys are used in persisted messages
//!
//! Decoding is strict:
//! - An empty input is an error, never a default value
//! - Truncated input is an error
//! - Trailing bytes after the message are an error
//!
//! ## Usage
//!
//! ```
//! use lakemeta_codec::{from_bytes, to_bytes};
//!
//! let bytes = to_bytes(&vec![1u32, 2, 3]).unwrap();
//! let decoded: Vec<u32> = from_bytes(&bytes).unwrap();
//! assert_eq!(decoded, vec![1, 2, 3]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;

pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a value to CBOR bytes.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if the value cannot be serialized.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(buf)
}

/// Decodes a value from CBOR bytes, requiring the input to hold exactly
/// one complete message.
///
/// # Errors
///
/// Returns an error if the input is empty, truncated, malformed, does not
/// match the shape of `T`, or has trailing bytes.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    if bytes.is_empty() {
        return Err(CodecError::UnexpectedEof);
    }
    let mut remaining = bytes;
    let value = ciborium::de::from_reader(&mut remaining).map_err(|e| match e {
        ciborium::de::Error::Io(_) => CodecError::UnexpectedEof,
        other => CodecError::decoding_failed(other.to_string()),
    })?;
    if !remaining.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: remaining.len(),
        });
    }
    Ok(value)
}

/// A persisted message type.
///
/// `KIND` names the message in error reports.
pub trait Message: Serialize + DeserializeOwned {
    /// Human-readable message kind, e.g. `"tablet metadata"`.
    const KIND: &'static str;
}

/// Trait for types that can be encoded to bytes.
pub trait Encode {
    /// Encode this value to CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from bytes.
pub trait Decode: Sized {
    /// Decode this value from CBOR bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl<M: Message> Encode for M {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_bytes(self).map_err(|e| e.context(M::KIND))
    }
}

impl<M: Message> Decode for M {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_bytes(bytes).map_err(|e| e.context(M::KIND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: u64,
        name: String,
        parts: Vec<String>,
        extra: Option<i64>,
    }

    impl Message for Sample {
        const KIND: &'static str = "sample";
    }

    fn sample() -> Sample {
        Sample {
            id: 7,
            name: "seven".to_string(),
            parts: vec!["a".to_string(), "b".to_string()],
            extra: None,
        }
    }

    #[test]
    fn message_roundtrip() {
        let bytes = sample().encode().unwrap();
        assert_eq!(Sample::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(sample().encode().unwrap(), sample().encode().unwrap());
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = Sample::decode(&[]).unwrap_err();
        assert!(err.to_string().contains("sample"));
        assert!(matches!(err, CodecError::Context { .. }));
    }

    #[test]
    fn every_truncation_is_rejected() {
        let bytes = sample().encode().unwrap();
        for len in 0..bytes.len() {
            assert!(
                Sample::decode(&bytes[..len]).is_err(),
                "prefix of length {len} decoded"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = sample().encode().unwrap();
        bytes.push(0x00);
        let err = from_bytes::<Sample>(&bytes).unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes { count: 1 });
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let bytes = to_bytes(&"just a string").unwrap();
        assert!(Sample::decode(&bytes).is_err());
    }
}
