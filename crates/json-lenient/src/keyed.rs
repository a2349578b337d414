//! Keyed-container helper and container-level decode interception.
//!
//! Bindings that only see a node cannot observe key absence, so defaulting
//! wrappers implement [`FieldCodec`] to intercept the decode-for-key path:
//! an absent key behaves exactly like a value that failed to decode. Model
//! types go through [`Keyed`] for field access; a [`KeyStyle`] transform
//! applies to struct-field lookup only, never to the raw document keys
//! (see [`Keyed::raw`]).

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::node::{expect_object, FromNode};

/// How declared field names map onto document keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStyle {
    /// Field names are document keys, verbatim.
    #[default]
    Preserve,
    /// `camelCase` field names look up `snake_case` document keys.
    SnakeCase,
}

/// Converts a `camelCase` identifier to `snake_case`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// A view over one keyed container of the document.
#[derive(Debug, Clone, Copy)]
pub struct Keyed<'a> {
    map: &'a Map<String, Value>,
    style: KeyStyle,
}

impl<'a> Keyed<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Keyed {
            map,
            style: KeyStyle::Preserve,
        }
    }

    /// Borrows the object at `node`, failing with the usual classification
    /// when the node is not a keyed container.
    pub fn from_node(node: &'a Value) -> Result<Self, DecodeError> {
        expect_object(node).map(Keyed::new)
    }

    pub fn with_style(mut self, style: KeyStyle) -> Self {
        self.style = style;
        self
    }

    /// The untransformed view of this container. Lossy maps read keys from
    /// here so original key text survives any [`KeyStyle`] transform.
    pub fn raw(&self) -> &'a Map<String, Value> {
        self.map
    }

    /// The document key a declared field name resolves to.
    pub fn lookup_key(&self, field: &str) -> String {
        match self.style {
            KeyStyle::Preserve => field.to_string(),
            KeyStyle::SnakeCase => to_snake_case(field),
        }
    }

    /// The node for `field`, if the (transformed) key is present.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(&self.lookup_key(field))
    }

    /// The node for `field`, or [`DecodeError::KeyNotFound`].
    pub fn node(&self, field: &str) -> Result<&'a Value, DecodeError> {
        let key = self.lookup_key(field);
        self.map
            .get(&key)
            .ok_or_else(|| DecodeError::key_not_found(key))
    }

    /// Required-field decode: the key must be present and the value must
    /// decode naturally. Errors carry the field's key on their path.
    pub fn required<T: FromNode>(&self, field: &str) -> Result<T, DecodeError> {
        let key = self.lookup_key(field);
        match self.map.get(&key) {
            Some(node) => T::from_node(node).map_err(|err| err.at(key.as_str())),
            None => Err(DecodeError::key_not_found(key)),
        }
    }

    /// Strategy-aware field decode; the binding decides what key absence and
    /// decode failure mean.
    pub fn decode<T: FieldCodec>(&self, field: &str) -> Result<T, DecodeError> {
        T::decode_field(self, field)
    }
}

/// Container-level decode-for-key contract.
///
/// Implementations observe the enclosing container rather than a single node,
/// which is what lets a binding treat "key absent" as "decode failed" (for
/// example `Defaulted<DefaultFalse>` producing `false` for a missing key).
pub trait FieldCodec: Sized {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError>;
}

/// Optional fields: absent key and explicit null both decode to `None`.
impl<T: FromNode> FieldCodec for Option<T> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        match container.raw().get(&key) {
            None | Some(Value::Null) => Ok(None),
            Some(node) => T::from_node(node).map(Some).map_err(|err| err.at(key.as_str())),
        }
    }
}
