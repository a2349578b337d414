//! Discriminator-driven decoding of heterogeneous object families.
//!
//! A [`PolymorphicFamily`] maps discriminator tags to variants of a closed
//! enum. Decoding reads the tag field from the object, dispatches to the
//! matching variant's decoder, and hands it the whole object so variant
//! payloads live beside the tag rather than nested under it. Encoding
//! writes the discriminator first, then the variant's own fields; when a
//! variant emits a field with the discriminator's name, the variant's
//! value wins.

use std::ops::{Deref, DerefMut};

use serde_json::{Map, Value};

use crate::error::{DecodeError, EncodeError};
use crate::keyed::{FieldCodec, Keyed};
use crate::node::FromNode;

/// A closed family of variants selected by a string discriminator.
pub trait PolymorphicFamily {
    type Value;

    /// Field carrying the variant tag.
    const DISCRIMINATOR: &'static str = "type";

    /// Maps a tag to a variant decoder; `None` for unknown tags.
    fn from_tag(tag: &str) -> Option<fn(&Keyed<'_>) -> Result<Self::Value, DecodeError>>;

    /// The tag a value encodes under.
    fn tag(value: &Self::Value) -> &'static str;

    /// The variant's own fields, discriminator excluded.
    fn encode_value(value: &Self::Value) -> Result<Map<String, Value>, EncodeError>;
}

/// A field holding one member of a polymorphic family.
pub struct Polymorphic<F: PolymorphicFamily> {
    value: F::Value,
}

impl<F: PolymorphicFamily> Polymorphic<F> {
    pub fn new(value: F::Value) -> Self {
        Polymorphic { value }
    }

    pub fn into_inner(self) -> F::Value {
        self.value
    }

    /// Emits the discriminator first, then the variant's fields. A variant
    /// field named like the discriminator overwrites it.
    pub fn encode(&self) -> Result<Value, EncodeError> {
        let mut object = Map::new();
        object.insert(
            F::DISCRIMINATOR.to_string(),
            Value::String(F::tag(&self.value).to_string()),
        );
        for (key, node) in F::encode_value(&self.value)? {
            object.insert(key, node);
        }
        Ok(Value::Object(object))
    }
}

impl<F: PolymorphicFamily> FromNode for Polymorphic<F> {
    const EXPECTED: &'static str = "object";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let keyed = Keyed::from_node(node)?;
        let tag_node = keyed
            .raw()
            .get(F::DISCRIMINATOR)
            .ok_or_else(|| DecodeError::key_not_found(F::DISCRIMINATOR))?;
        let tag = tag_node
            .as_str()
            .ok_or_else(|| {
                DecodeError::type_mismatch("string", tag_node).at(F::DISCRIMINATOR)
            })?;
        let decode = F::from_tag(tag).ok_or_else(|| {
            DecodeError::data_corrupted(format!(
                "unknown discriminator `{tag}` in field `{}`",
                F::DISCRIMINATOR
            ))
        })?;
        decode(&keyed).map(Polymorphic::new)
    }
}

impl<F: PolymorphicFamily> FieldCodec for Polymorphic<F> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

impl<F: PolymorphicFamily> Deref for Polymorphic<F> {
    type Target = F::Value;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<F: PolymorphicFamily> DerefMut for Polymorphic<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<F: PolymorphicFamily> std::fmt::Debug for Polymorphic<F>
where
    F::Value: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Polymorphic").field(&self.value).finish()
    }
}

impl<F: PolymorphicFamily> Clone for Polymorphic<F>
where
    F::Value: Clone,
{
    fn clone(&self) -> Self {
        Polymorphic {
            value: self.value.clone(),
        }
    }
}

impl<F: PolymorphicFamily> PartialEq for Polymorphic<F>
where
    F::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
