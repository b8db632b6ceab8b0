//! Plaintext valuations and artifact serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{DeserializeError, PeekError, SerializeError};
use crate::{
    ALGORITHM_MAGIC, ARTIFACT_VERSION, GRAPH_MAGIC, HEADER_SIZE, INPUTS_MAGIC, OUTPUTS_MAGIC,
};

/// A plaintext value bound to an input or recovered from an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlainValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl PlainValue {
    /// Slot representation used by the engine.
    pub(crate) fn slots(&self) -> Vec<f64> {
        match self {
            PlainValue::Scalar(v) => vec![*v],
            PlainValue::Vector(v) => v.clone(),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            PlainValue::Scalar(v) => Some(*v),
            PlainValue::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            PlainValue::Scalar(_) => None,
            PlainValue::Vector(v) => Some(v),
        }
    }
}

impl From<f64> for PlainValue {
    fn from(v: f64) -> Self {
        PlainValue::Scalar(v)
    }
}

impl From<i64> for PlainValue {
    fn from(v: i64) -> Self {
        PlainValue::Scalar(v as f64)
    }
}

impl From<Vec<f64>> for PlainValue {
    fn from(v: Vec<f64>) -> Self {
        PlainValue::Vector(v)
    }
}

impl From<Vec<i64>> for PlainValue {
    fn from(v: Vec<i64>) -> Self {
        PlainValue::Vector(v.into_iter().map(|x| x as f64).collect())
    }
}

/// Mapping from slot name to plaintext value, for both the input and the
/// decrypted-output side of the pipeline.
pub type Valuation = BTreeMap<String, PlainValue>;

/// Peek the version number from graph artifact bytes without full
/// deserialization.
pub fn peek_graph_version(bytes: &[u8]) -> Result<u32, PeekError> {
    peek_version(bytes, &GRAPH_MAGIC)
}

/// Peek the version number from algorithm-info artifact bytes.
pub fn peek_algorithm_version(bytes: &[u8]) -> Result<u32, PeekError> {
    peek_version(bytes, &ALGORITHM_MAGIC)
}

/// Peek the version number from encrypted-input artifact bytes.
pub fn peek_inputs_version(bytes: &[u8]) -> Result<u32, PeekError> {
    peek_version(bytes, &INPUTS_MAGIC)
}

/// Peek the version number from encrypted-output artifact bytes.
pub fn peek_outputs_version(bytes: &[u8]) -> Result<u32, PeekError> {
    peek_version(bytes, &OUTPUTS_MAGIC)
}

fn peek_version(bytes: &[u8], expected_magic: &[u8; 4]) -> Result<u32, PeekError> {
    if bytes.len() < HEADER_SIZE {
        return Err(PeekError::TooShort);
    }
    if &bytes[0..4] != expected_magic {
        return Err(PeekError::InvalidMagic);
    }
    let version_bytes: [u8; 4] = bytes[4..8]
        .try_into()
        .map_err(|_| PeekError::InvalidVersion)?;
    Ok(u32::from_be_bytes(version_bytes))
}

/// Serialize an artifact payload with magic bytes and version header.
pub(crate) fn serialize_artifact<T: Serialize + ?Sized>(
    magic: &[u8; 4],
    payload: &T,
) -> Result<Vec<u8>, SerializeError> {
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    buf.extend_from_slice(magic);
    buf.extend_from_slice(&ARTIFACT_VERSION.to_be_bytes());
    let payload_bytes = rmp_serde::to_vec(payload).map_err(SerializeError)?;
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Deserialize an artifact, validating magic bytes and version.
pub(crate) fn deserialize_artifact<T: DeserializeOwned>(
    magic: &[u8; 4],
    bytes: &[u8],
) -> Result<T, DeserializeError> {
    let version = peek_version(bytes, magic)?;
    if version != ARTIFACT_VERSION {
        return Err(DeserializeError::UnsupportedVersion {
            got: version,
            expected: ARTIFACT_VERSION,
        });
    }
    rmp_serde::from_slice(&bytes[HEADER_SIZE..]).map_err(DeserializeError::Payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut valuation = Valuation::new();
        valuation.insert("a".to_string(), PlainValue::Scalar(4.0));
        valuation.insert("v".to_string(), PlainValue::Vector(vec![1.0, 2.0]));

        let bytes = serialize_artifact(&INPUTS_MAGIC, &valuation).unwrap();
        assert_eq!(peek_inputs_version(&bytes).unwrap(), ARTIFACT_VERSION);

        let back: Valuation = deserialize_artifact(&INPUTS_MAGIC, &bytes).unwrap();
        assert_eq!(back, valuation);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            peek_graph_version(b"HDA").unwrap_err(),
            PeekError::TooShort
        );
    }

    #[test]
    fn test_wrong_magic() {
        let bytes = serialize_artifact(&INPUTS_MAGIC, &Valuation::new()).unwrap();
        assert_eq!(
            peek_outputs_version(&bytes).unwrap_err(),
            PeekError::InvalidMagic
        );
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = serialize_artifact(&GRAPH_MAGIC, &Valuation::new()).unwrap();
        bytes[4..8].copy_from_slice(&99u32.to_be_bytes());
        match deserialize_artifact::<Valuation>(&GRAPH_MAGIC, &bytes).unwrap_err() {
            DeserializeError::UnsupportedVersion { got, expected } => {
                assert_eq!(got, 99);
                assert_eq!(expected, ARTIFACT_VERSION);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
