//! Binary payloads carried as encoded strings.
//!
//! Mirrors the date machinery: a [`DataStrategy`] names the text encoding,
//! [`DataValue`] keeps the source string and replays it verbatim on encode.

use std::ops::Deref;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::DecodeError;
use crate::keyed::{FieldCodec, Keyed};
use crate::node::{FromNode, ToNode};

/// A text encoding for binary payloads.
pub trait DataStrategy {
    fn decode(raw: &str) -> Result<Vec<u8>, DecodeError>;

    fn encode(data: &[u8]) -> String;
}

/// Standard base64 with padding, strict decode.
pub struct Base64Strategy;

impl DataStrategy for Base64Strategy {
    fn decode(raw: &str) -> Result<Vec<u8>, DecodeError> {
        STANDARD
            .decode(raw)
            .map_err(|err| DecodeError::data_corrupted(format!("invalid base64 payload: {err}")))
    }

    fn encode(data: &[u8]) -> String {
        STANDARD.encode(data)
    }
}

/// A binary field bound to a text encoding.
pub struct DataValue<S: DataStrategy> {
    raw: String,
    data: Vec<u8>,
    _strategy: std::marker::PhantomData<S>,
}

impl<S: DataStrategy> DataValue<S> {
    /// Constructs from bytes; the raw text is derived by the strategy.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        DataValue {
            raw: S::encode(&data),
            data,
            _strategy: std::marker::PhantomData,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Replaces the payload and re-derives the raw text.
    pub fn set_bytes(&mut self, data: Vec<u8>) {
        self.raw = S::encode(&data);
        self.data = data;
    }

    /// Replays the stored raw text verbatim.
    pub fn encode(&self) -> Value {
        Value::String(self.raw.clone())
    }
}

impl<S: DataStrategy> FromNode for DataValue<S> {
    const EXPECTED: &'static str = "string";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let raw = String::from_node(node)?;
        let data = S::decode(&raw)?;
        Ok(DataValue {
            raw,
            data,
            _strategy: std::marker::PhantomData,
        })
    }
}

impl<S: DataStrategy> ToNode for DataValue<S> {
    fn to_node(&self) -> Value {
        self.encode()
    }
}

impl<S: DataStrategy> FieldCodec for DataValue<S> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

impl<S: DataStrategy> Deref for DataValue<S> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<S: DataStrategy> std::fmt::Debug for DataValue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataValue")
            .field("raw", &self.raw)
            .field("len", &self.data.len())
            .finish()
    }
}

impl<S: DataStrategy> Clone for DataValue<S> {
    fn clone(&self) -> Self {
        DataValue {
            raw: self.raw.clone(),
            data: self.data.clone(),
            _strategy: std::marker::PhantomData,
        }
    }
}

impl<S: DataStrategy> PartialEq for DataValue<S> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_standard_base64() {
        let bound = DataValue::<Base64Strategy>::from_node(&json!("SGVsbG8gV29ybGQh")).unwrap();
        assert_eq!(bound.bytes(), b"Hello World!");
        assert_eq!(bound.encode(), json!("SGVsbG8gV29ybGQh"));
    }

    #[test]
    fn from_bytes_derives_the_raw_text() {
        let bound = DataValue::<Base64Strategy>::from_bytes(b"lorem ipsum".to_vec());
        assert_eq!(bound.raw(), "bG9yZW0gaXBzdW0=");
        assert_eq!(bound.encode(), json!("bG9yZW0gaXBzdW0="));
    }

    #[test]
    fn set_bytes_rederives_the_raw_text() {
        let mut bound = DataValue::<Base64Strategy>::from_bytes(Vec::new());
        bound.set_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bound.raw(), "3q2+7w==");
    }

    #[test]
    fn malformed_base64_is_data_corrupted() {
        let err = DataValue::<Base64Strategy>::from_node(&json!("%%% not base64 %%%")).unwrap_err();
        assert!(matches!(err, DecodeError::DataCorrupted { .. }));
    }

    #[test]
    fn non_string_node_is_a_type_mismatch() {
        let err = DataValue::<Base64Strategy>::from_node(&json!(17)).unwrap_err();
        assert!(err.is_type_mismatch());
    }
}
