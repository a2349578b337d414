//! Lossy collection decoding: discard bad elements, keep the rest.
//!
//! [`LossyVec`] and [`LossyMap`] decode a *present* collection element by
//! element and drop whatever fails, preserving source order and verbatim key
//! text. This is distinct from composing [`Defaulted`] with an empty-default
//! provider, which maps a missing or invalid *whole* collection to empty.
//!
//! [`AuditedVec`] keeps the same policy but records a [`FailedDecode`] per
//! discarded element so schema drift can be diagnosed without failing the
//! parse. The audit trail is never encoded.
//!
//! [`Defaulted`]: crate::default_value::Defaulted

use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use json_lenient_pointer::{Path, PathSegment};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::keyed::{FieldCodec, Keyed};
use crate::node::{expect_array, expect_object, FromNode, NodeKind, ToNode};

/// Immutable audit record for one discarded element.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedDecode {
    /// Where the element sat relative to the collection node.
    pub path: Path,
    /// Why it was discarded.
    pub error: DecodeError,
}

/// An array that drops elements which fail to decode.
pub struct LossyVec<T> {
    values: Vec<T>,
}

impl<T> LossyVec<T> {
    pub fn new(values: Vec<T>) -> Self {
        LossyVec { values }
    }

    pub fn into_inner(self) -> Vec<T> {
        self.values
    }
}

impl<T: ToNode> LossyVec<T> {
    /// Encodes exactly the surviving elements; no placeholders.
    pub fn encode(&self) -> Value {
        self.values.to_node()
    }
}

impl<T: FromNode> FromNode for LossyVec<T> {
    const EXPECTED: &'static str = "array";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let elements = expect_array(node)?;
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            if let Ok(value) = T::from_node(element) {
                values.push(value);
            }
        }
        Ok(LossyVec { values })
    }
}

impl<T: ToNode> ToNode for LossyVec<T> {
    fn to_node(&self) -> Value {
        self.values.to_node()
    }
}

impl<T: FromNode> FieldCodec for LossyVec<T> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

/// [`LossyVec`] with an audit trail: one [`FailedDecode`] per discarded
/// element, in encounter order.
pub struct AuditedVec<T> {
    values: Vec<T>,
    failures: Vec<FailedDecode>,
}

impl<T> AuditedVec<T> {
    pub fn new(values: Vec<T>) -> Self {
        AuditedVec {
            values,
            failures: Vec::new(),
        }
    }

    pub fn failures(&self) -> &[FailedDecode] {
        &self.failures
    }

    pub fn into_inner(self) -> Vec<T> {
        self.values
    }
}

impl<T: ToNode> AuditedVec<T> {
    /// Encodes the survivors; the audit trail is not persisted.
    pub fn encode(&self) -> Value {
        self.values.to_node()
    }
}

impl<T: FromNode> FromNode for AuditedVec<T> {
    const EXPECTED: &'static str = "array";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let elements = expect_array(node)?;
        let mut values = Vec::with_capacity(elements.len());
        let mut failures = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            match T::from_node(element) {
                Ok(value) => values.push(value),
                Err(error) => failures.push(FailedDecode {
                    path: vec![PathSegment::Index(index)],
                    error: error.at(index),
                }),
            }
        }
        Ok(AuditedVec { values, failures })
    }
}

impl<T: ToNode> ToNode for AuditedVec<T> {
    fn to_node(&self) -> Value {
        self.values.to_node()
    }
}

impl<T: FromNode> FieldCodec for AuditedVec<T> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Key domain for [`LossyMap`]: string keys (verbatim) or integer keys.
///
/// A malformed *value* is optional data loss and gets discarded; a malformed
/// *key* indicates a schema violation and is a hard error. Other key domains
/// are unrepresentable by construction.
pub trait LossyKey: sealed::Sealed + Sized + Eq + Hash {
    /// Interpret one document key. Failure is fatal for the whole map.
    fn parse_key(key: &str) -> Result<Self, DecodeError>;

    fn render_key(&self) -> String;
}

impl sealed::Sealed for String {}

impl LossyKey for String {
    fn parse_key(key: &str) -> Result<Self, DecodeError> {
        Ok(key.to_string())
    }

    fn render_key(&self) -> String {
        self.clone()
    }
}

macro_rules! integer_key {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl LossyKey for $ty {
            fn parse_key(key: &str) -> Result<Self, DecodeError> {
                key.parse::<$ty>().map_err(|_| DecodeError::TypeMismatch {
                    path: vec![PathSegment::key(key)],
                    expected: concat!($name, " key"),
                    actual: NodeKind::String,
                })
            }

            fn render_key(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

integer_key!(
    i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64",
    u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64",
);

/// A keyed collection that drops entries whose value fails to decode.
///
/// Keys come from the raw document map, so string keys are original text
/// regardless of any [`KeyStyle`] transform on the enclosing container.
///
/// [`KeyStyle`]: crate::keyed::KeyStyle
pub struct LossyMap<K: LossyKey, V> {
    entries: IndexMap<K, V>,
}

impl<K: LossyKey, V> LossyMap<K, V> {
    pub fn new(entries: IndexMap<K, V>) -> Self {
        LossyMap { entries }
    }

    pub fn into_inner(self) -> IndexMap<K, V> {
        self.entries
    }
}

impl<K: LossyKey, V: ToNode> LossyMap<K, V> {
    pub fn encode(&self) -> Value {
        let mut out = Map::new();
        for (key, value) in &self.entries {
            out.insert(key.render_key(), value.to_node());
        }
        Value::Object(out)
    }
}

impl<K: LossyKey, V: FromNode> FromNode for LossyMap<K, V> {
    const EXPECTED: &'static str = "object";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let object = expect_object(node)?;
        let mut entries = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            let parsed = K::parse_key(key)?;
            if let Ok(decoded) = V::from_node(value) {
                entries.insert(parsed, decoded);
            }
        }
        Ok(LossyMap { entries })
    }
}

impl<K: LossyKey, V: ToNode> ToNode for LossyMap<K, V> {
    fn to_node(&self) -> Value {
        self.encode()
    }
}

impl<K: LossyKey, V: FromNode> FieldCodec for LossyMap<K, V> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

impl<T> Deref for LossyVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T> DerefMut for LossyVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl<T> Deref for AuditedVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T> DerefMut for AuditedVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl<K: LossyKey, V> Deref for LossyMap<K, V> {
    type Target = IndexMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<K: LossyKey, V> DerefMut for LossyMap<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entries
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LossyVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LossyVec").field(&self.values).finish()
    }
}

impl<T: Clone> Clone for LossyVec<T> {
    fn clone(&self) -> Self {
        LossyVec::new(self.values.clone())
    }
}

impl<T: PartialEq> PartialEq for LossyVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for AuditedVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditedVec")
            .field("values", &self.values)
            .field("failures", &self.failures)
            .finish()
    }
}

impl<K: LossyKey + std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for LossyMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LossyMap").field(&self.entries).finish()
    }
}

impl<K: LossyKey + Clone, V: Clone> Clone for LossyMap<K, V> {
    fn clone(&self) -> Self {
        LossyMap::new(self.entries.clone())
    }
}

impl<K: LossyKey, V: PartialEq> PartialEq for LossyMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
