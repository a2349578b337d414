//! Default-value binding: decode failures fall back to a provider's value.
//!
//! [`Defaulted`] attempts the natural decode and substitutes
//! [`DefaultValueProvider::default_value`] on any failure; the fallback only
//! affects decode, encode is always the natural encoding of the held value.
//! Boolean providers additionally coerce alternate scalar shapes (integers,
//! logical strings) before giving up, but only on a type mismatch — a null
//! or corrupted value goes straight to the default.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::DecodeError;
use crate::keyed::{FieldCodec, Keyed};
use crate::node::{FromNode, ToNode};
use crate::truthy;

/// Supplies the fallback used when decoding fails entirely for a field.
///
/// Providers are stateless policies; [`coerce`](Self::coerce) is an optional
/// alternate-shape recovery hook attempted on type mismatch before the
/// default applies.
pub trait DefaultValueProvider {
    type Value: FromNode + ToNode;

    fn default_value() -> Self::Value;

    fn coerce(_node: &Value) -> Option<Self::Value> {
        None
    }
}

/// A field bound to a [`DefaultValueProvider`]. Decode never fails.
pub struct Defaulted<P: DefaultValueProvider> {
    value: P::Value,
}

impl<P: DefaultValueProvider> Defaulted<P> {
    pub fn new(value: P::Value) -> Self {
        Defaulted { value }
    }

    pub fn into_inner(self) -> P::Value {
        self.value
    }

    pub fn encode(&self) -> Value {
        self.value.to_node()
    }
}

impl<P: DefaultValueProvider> FromNode for Defaulted<P> {
    const EXPECTED: &'static str = <P::Value as FromNode>::EXPECTED;

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let value = match P::Value::from_node(node) {
            Ok(value) => value,
            Err(err) if err.is_type_mismatch() => {
                P::coerce(node).unwrap_or_else(P::default_value)
            }
            Err(_) => P::default_value(),
        };
        Ok(Defaulted::new(value))
    }
}

impl<P: DefaultValueProvider> ToNode for Defaulted<P> {
    fn to_node(&self) -> Value {
        self.value.to_node()
    }
}

/// Key absent behaves exactly like a failed decode: the default applies.
impl<P: DefaultValueProvider> FieldCodec for Defaulted<P> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        match container.get(field) {
            Some(node) => Self::from_node(node),
            None => Ok(Defaulted::new(P::default_value())),
        }
    }
}

impl<P: DefaultValueProvider> Deref for Defaulted<P> {
    type Target = P::Value;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<P: DefaultValueProvider> DerefMut for Defaulted<P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<P: DefaultValueProvider> Default for Defaulted<P> {
    fn default() -> Self {
        Defaulted::new(P::default_value())
    }
}

impl<P: DefaultValueProvider> std::fmt::Debug for Defaulted<P>
where
    P::Value: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Defaulted").field(&self.value).finish()
    }
}

impl<P: DefaultValueProvider> Clone for Defaulted<P>
where
    P::Value: Clone,
{
    fn clone(&self) -> Self {
        Defaulted::new(self.value.clone())
    }
}

impl<P: DefaultValueProvider> PartialEq for Defaulted<P>
where
    P::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

// ── Providers ─────────────────────────────────────────────────────────────

fn coerce_bool(node: &Value) -> Option<bool> {
    match node {
        Value::Number(n) => n.as_i64().and_then(truthy::from_exact_int),
        Value::String(s) => truthy::from_str(s),
        _ => None,
    }
}

/// Booleans default to `false`; `1`/`0` and logical strings coerce.
pub struct DefaultFalse;

impl DefaultValueProvider for DefaultFalse {
    type Value = bool;

    fn default_value() -> bool {
        false
    }

    fn coerce(node: &Value) -> Option<bool> {
        coerce_bool(node)
    }
}

/// Booleans default to `true`; `1`/`0` and logical strings coerce.
pub struct DefaultTrue;

impl DefaultValueProvider for DefaultTrue {
    type Value = bool;

    fn default_value() -> bool {
        true
    }

    fn coerce(node: &Value) -> Option<bool> {
        coerce_bool(node)
    }
}

/// Any `Default` type falls back to `T::default()`.
pub struct DefaultInit<T>(PhantomData<T>);

impl<T: FromNode + ToNode + Default> DefaultValueProvider for DefaultInit<T> {
    type Value = T;

    fn default_value() -> T {
        T::default()
    }
}

/// Numbers default to zero (`T::default()` for every numeric width).
pub type DefaultZero<T> = DefaultInit<T>;

/// Strings default to `""`.
pub struct DefaultEmptyString;

impl DefaultValueProvider for DefaultEmptyString {
    type Value = String;

    fn default_value() -> String {
        String::new()
    }
}

/// Arrays default to `[]` when the whole collection is missing or invalid.
pub struct DefaultEmptyVec<T>(PhantomData<T>);

impl<T: FromNode + ToNode> DefaultValueProvider for DefaultEmptyVec<T> {
    type Value = Vec<T>;

    fn default_value() -> Vec<T> {
        Vec::new()
    }
}

/// Maps default to `{}` when the whole collection is missing or invalid.
pub struct DefaultEmptyMap<V>(PhantomData<V>);

impl<V: FromNode + ToNode> DefaultValueProvider for DefaultEmptyMap<V> {
    type Value = IndexMap<String, V>;

    fn default_value() -> IndexMap<String, V> {
        IndexMap::new()
    }
}

/// Optionals default to `None` instead of surfacing the decode error.
pub struct DefaultNil<T>(PhantomData<T>);

impl<T: FromNode + ToNode> DefaultValueProvider for DefaultNil<T> {
    type Value = Option<T>;

    fn default_value() -> Option<T> {
        None
    }
}

/// Optionals that swallow failures (for example a malformed URL string).
pub type LossyOption<T> = Defaulted<DefaultNil<T>>;
