//! Lossless type coercion: preserve a value's information across wire types.
//!
//! When a field's natural decode fails, [`Lossless`] walks an ordered probe
//! list, takes the first alternate scalar type that decodes, and feeds its
//! canonical text into the target's textual constructor. The originally
//! probed type is remembered so encode can regenerate a value of that type;
//! if the held value has been mutated into something the origin type cannot
//! represent, encode fails loudly rather than silently corrupting data.
//!
//! Probe ordering is part of the contract: [`STANDARD_PROBES`] is string,
//! bool, integers, floats; [`BOOL_FIRST_PROBES`] additionally places a
//! bool-from-integer probe right after string so `1`/`0` decode (and
//! re-encode) as booleans when both readings are plausible.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use serde_json::{Number, Value};

use crate::error::{DecodeError, EncodeError};
use crate::keyed::{FieldCodec, Keyed};
use crate::node::{expect_array, FromNode, ToNode};
use crate::truthy;

// ── Textual constructors ──────────────────────────────────────────────────

/// The textual seam of the coercion engine: every coercible target type can
/// be constructed from, and rendered as, canonical text.
pub trait LosslessText: Sized {
    fn from_text(text: &str) -> Option<Self>;

    fn to_text(&self) -> String;
}

impl LosslessText for String {
    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

/// Strict `true`/`false` only. The logical vocabulary (`yes`, `t`, numeric
/// strings) belongs to the bool-first strategy's own constructor; keeping it
/// out of the shared seam means a standard-order probe never accepts text
/// its origin type cannot revive.
impl LosslessText for bool {
    fn from_text(text: &str) -> Option<Self> {
        match text {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }
}

macro_rules! numeric_text {
    ($($ty:ty),* $(,)?) => {$(
        impl LosslessText for $ty {
            fn from_text(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn to_text(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

numeric_text!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

// ── Probes ────────────────────────────────────────────────────────────────

/// Result of a successful probe: the canonical text of the probed scalar
/// plus enough to rebuild a wire value of the probed type later.
#[derive(Debug, Clone)]
pub struct Probed {
    pub text: String,
    pub type_name: &'static str,
    pub revive: fn(&str) -> Option<Value>,
}

/// One "try decode as alternate type" attempt. Stateless, order-sensitive.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub name: &'static str,
    pub run: fn(&Value) -> Option<Probed>,
}

fn revive_string(text: &str) -> Option<Value> {
    Some(Value::String(text.to_string()))
}

fn revive_bool(text: &str) -> Option<Value> {
    match text {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn revive_i64(text: &str) -> Option<Value> {
    text.parse::<i64>().ok().map(Value::from)
}

fn revive_u64(text: &str) -> Option<Value> {
    text.parse::<u64>().ok().map(Value::from)
}

fn revive_f64(text: &str) -> Option<Value> {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn probe_string(node: &Value) -> Option<Probed> {
    node.as_str().map(|s| Probed {
        text: s.to_string(),
        type_name: "string",
        revive: revive_string,
    })
}

fn probe_bool(node: &Value) -> Option<Probed> {
    node.as_bool().map(|b| Probed {
        text: b.to_text(),
        type_name: "bool",
        revive: revive_bool,
    })
}

/// Reads an integer as a boolean by the sign rule (truthy iff `> 0`) and
/// remembers `bool` as the origin, so `1` re-encodes as `true` rather than
/// round-tripping through an integer slot.
fn probe_bool_from_int(node: &Value) -> Option<Probed> {
    node.as_i64().map(|i| Probed {
        text: truthy::from_int_sign(i).to_text(),
        type_name: "bool",
        revive: revive_bool,
    })
}

fn probe_i64(node: &Value) -> Option<Probed> {
    node.as_i64().map(|i| Probed {
        text: i.to_string(),
        type_name: "i64",
        revive: revive_i64,
    })
}

fn probe_u64(node: &Value) -> Option<Probed> {
    node.as_u64().map(|u| Probed {
        text: u.to_string(),
        type_name: "u64",
        revive: revive_u64,
    })
}

fn probe_f64(node: &Value) -> Option<Probed> {
    node.as_f64().map(|f| Probed {
        text: f.to_string(),
        type_name: "f64",
        revive: revive_f64,
    })
}

pub const STRING_PROBE: Probe = Probe {
    name: "string",
    run: probe_string,
};
pub const BOOL_PROBE: Probe = Probe {
    name: "bool",
    run: probe_bool,
};
pub const BOOL_FROM_INT_PROBE: Probe = Probe {
    name: "bool_from_int",
    run: probe_bool_from_int,
};
pub const I64_PROBE: Probe = Probe {
    name: "i64",
    run: probe_i64,
};
pub const U64_PROBE: Probe = Probe {
    name: "u64",
    run: probe_u64,
};
pub const F64_PROBE: Probe = Probe {
    name: "f64",
    run: probe_f64,
};

macro_rules! width_probe {
    ($($fn_name:ident, $const_name:ident, $ty:ty => $name:literal),* $(,)?) => {$(
        fn $fn_name(node: &Value) -> Option<Probed> {
            let wide = node.as_i64()?;
            <$ty>::try_from(wide).ok().map(|narrow| Probed {
                text: narrow.to_string(),
                type_name: $name,
                revive: revive_i64,
            })
        }

        pub const $const_name: Probe = Probe {
            name: $name,
            run: $fn_name,
        };
    )*};
}

// Width-specific probes for custom policies; the default orders use the
// 64-bit probes since narrower widths share their canonical text.
width_probe!(
    probe_i8, I8_PROBE, i8 => "i8",
    probe_i16, I16_PROBE, i16 => "i16",
    probe_i32, I32_PROBE, i32 => "i32",
);

/// Default probe order: string first, then boolean, then integers, then
/// floats.
pub const STANDARD_PROBES: &[Probe] = &[STRING_PROBE, BOOL_PROBE, I64_PROBE, U64_PROBE, F64_PROBE];

/// Boolean-prioritizing order: the bool-from-integer probe sits between
/// string and the generic boolean probe.
pub const BOOL_FIRST_PROBES: &[Probe] = &[
    STRING_PROBE,
    BOOL_FROM_INT_PROBE,
    BOOL_PROBE,
    I64_PROBE,
    U64_PROBE,
    F64_PROBE,
];

// ── Strategy & binding ────────────────────────────────────────────────────

/// Pluggable coercion policy: a target type plus an ordered probe list.
pub trait LosslessStrategy {
    type Value: FromNode + ToNode + LosslessText;

    fn probes() -> &'static [Probe];

    /// Constructs the target from probed text. Defaults to the value type's
    /// own constructor; strategies may widen it.
    fn from_text(text: &str) -> Option<Self::Value> {
        Self::Value::from_text(text)
    }
}

/// The default policy for any coercible target type.
pub struct StandardLossless<T>(PhantomData<T>);

impl<T: FromNode + ToNode + LosslessText> LosslessStrategy for StandardLossless<T> {
    type Value = T;

    fn probes() -> &'static [Probe] {
        STANDARD_PROBES
    }
}

/// The boolean-prioritizing policy. Its textual constructor accepts the
/// full logical vocabulary (`yes`, `t`, signed numeric strings), and its
/// bool-from-integer probe records `bool` as the origin, so everything the
/// widened constructor accepts still revives on encode.
pub struct BoolFirstLossless;

impl LosslessStrategy for BoolFirstLossless {
    type Value = bool;

    fn probes() -> &'static [Probe] {
        BOOL_FIRST_PROBES
    }

    fn from_text(text: &str) -> Option<bool> {
        truthy::from_str(text)
    }
}

#[derive(Clone, Copy)]
struct Origin {
    type_name: &'static str,
    revive: fn(&str) -> Option<Value>,
}

fn natural_revive<T: LosslessText + ToNode>(text: &str) -> Option<Value> {
    T::from_text(text).map(|value| value.to_node())
}

fn natural_origin<T: FromNode + ToNode + LosslessText>() -> Origin {
    Origin {
        type_name: T::EXPECTED,
        revive: natural_revive::<T>,
    }
}

/// A field bound to the coercion engine.
pub struct Lossless<S: LosslessStrategy> {
    value: S::Value,
    origin: Origin,
}

/// The default-policy binding.
pub type LosslessValue<T> = Lossless<StandardLossless<T>>;

/// A boolean field that also reads integers as truthy/falsy.
pub type LosslessBool = Lossless<BoolFirstLossless>;

impl<S: LosslessStrategy> Lossless<S> {
    /// Constructs from an in-memory value; the origin is the natural type.
    pub fn new(value: S::Value) -> Self {
        Lossless {
            value,
            origin: natural_origin::<S::Value>(),
        }
    }

    pub fn into_inner(self) -> S::Value {
        self.value
    }

    /// Name of the wire type the value originally decoded from.
    pub fn origin_type(&self) -> &'static str {
        self.origin.type_name
    }

    /// Renders the held value as text and re-encodes it as the originally
    /// probed wire type. Fails with [`EncodeError::InvalidValue`] when the
    /// value has been mutated out of the origin type's domain.
    pub fn encode(&self) -> Result<Value, EncodeError> {
        let text = self.value.to_text();
        (self.origin.revive)(&text).ok_or_else(|| {
            EncodeError::invalid_value(format!(
                "unable to encode `{text}` back to source type `{}`",
                self.origin.type_name
            ))
        })
    }
}

impl<S: LosslessStrategy> FromNode for Lossless<S> {
    const EXPECTED: &'static str = <S::Value as FromNode>::EXPECTED;

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        match S::Value::from_node(node) {
            Ok(value) => Ok(Lossless {
                value,
                origin: natural_origin::<S::Value>(),
            }),
            Err(original) => {
                for probe in S::probes() {
                    if let Some(probed) = (probe.run)(node) {
                        // First successful probe wins; a rejected text still
                        // surfaces the original error.
                        return match S::from_text(&probed.text) {
                            Some(value) => Ok(Lossless {
                                value,
                                origin: Origin {
                                    type_name: probed.type_name,
                                    revive: probed.revive,
                                },
                            }),
                            None => Err(original),
                        };
                    }
                }
                Err(original)
            }
        }
    }
}

impl<S: LosslessStrategy> FieldCodec for Lossless<S> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

impl<S: LosslessStrategy> Deref for Lossless<S> {
    type Target = S::Value;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<S: LosslessStrategy> DerefMut for Lossless<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<S: LosslessStrategy> std::fmt::Debug for Lossless<S>
where
    S::Value: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lossless")
            .field("value", &self.value)
            .field("origin", &self.origin.type_name)
            .finish()
    }
}

impl<S: LosslessStrategy> Clone for Lossless<S>
where
    S::Value: Clone,
{
    fn clone(&self) -> Self {
        Lossless {
            value: self.value.clone(),
            origin: self.origin,
        }
    }
}

/// Equality ignores the remembered origin, like the held value it wraps.
impl<S: LosslessStrategy> PartialEq for Lossless<S>
where
    S::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

// ── Optional variant ──────────────────────────────────────────────────────

/// Coercion that resolves to `None` on total failure instead of erroring.
pub struct OptionalLossless<S: LosslessStrategy> {
    value: Option<S::Value>,
    origin: Origin,
}

/// The default-policy optional binding.
pub type OptionalLosslessValue<T> = OptionalLossless<StandardLossless<T>>;

impl<S: LosslessStrategy> OptionalLossless<S> {
    pub fn new(value: Option<S::Value>) -> Self {
        OptionalLossless {
            value,
            origin: natural_origin::<S::Value>(),
        }
    }

    pub fn into_inner(self) -> Option<S::Value> {
        self.value
    }

    /// Encodes the held value as the origin wire type, or an explicit null.
    pub fn encode(&self) -> Result<Value, EncodeError> {
        match &self.value {
            Some(value) => {
                let text = value.to_text();
                (self.origin.revive)(&text).ok_or_else(|| {
                    EncodeError::invalid_value(format!(
                        "unable to encode `{text}` back to source type `{}`",
                        self.origin.type_name
                    ))
                })
            }
            None => Ok(Value::Null),
        }
    }
}

impl<S: LosslessStrategy> FromNode for OptionalLossless<S> {
    const EXPECTED: &'static str = <S::Value as FromNode>::EXPECTED;

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        match S::Value::from_node(node) {
            Ok(value) => Ok(OptionalLossless {
                value: Some(value),
                origin: natural_origin::<S::Value>(),
            }),
            Err(_) => {
                for probe in S::probes() {
                    if let Some(probed) = (probe.run)(node) {
                        if let Some(value) = S::from_text(&probed.text) {
                            return Ok(OptionalLossless {
                                value: Some(value),
                                origin: Origin {
                                    type_name: probed.type_name,
                                    revive: probed.revive,
                                },
                            });
                        }
                        break;
                    }
                }
                Ok(OptionalLossless::new(None))
            }
        }
    }
}

/// Key absence resolves to `None`, never an error.
impl<S: LosslessStrategy> FieldCodec for OptionalLossless<S> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        match container.get(field) {
            Some(node) => Self::from_node(node),
            None => Ok(OptionalLossless::new(None)),
        }
    }
}

impl<S: LosslessStrategy> Deref for OptionalLossless<S> {
    type Target = Option<S::Value>;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<S: LosslessStrategy> DerefMut for OptionalLossless<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<S: LosslessStrategy> std::fmt::Debug for OptionalLossless<S>
where
    S::Value: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalLossless")
            .field("value", &self.value)
            .field("origin", &self.origin.type_name)
            .finish()
    }
}

impl<S: LosslessStrategy> PartialEq for OptionalLossless<S>
where
    S::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

// ── Lossless arrays ───────────────────────────────────────────────────────

/// An array whose elements go through the coercion engine, with lossy
/// element semantics: elements that neither decode nor coerce are dropped.
pub struct LosslessVec<S: LosslessStrategy> {
    values: Vec<S::Value>,
}

/// The default-policy array binding.
pub type LosslessArray<T> = LosslessVec<StandardLossless<T>>;

impl<S: LosslessStrategy> LosslessVec<S> {
    pub fn new(values: Vec<S::Value>) -> Self {
        LosslessVec { values }
    }

    pub fn into_inner(self) -> Vec<S::Value> {
        self.values
    }

    /// Elements encode naturally; per-element origins are not retained.
    pub fn encode(&self) -> Value {
        self.values.to_node()
    }
}

impl<S: LosslessStrategy> FromNode for LosslessVec<S> {
    const EXPECTED: &'static str = "array";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let elements = expect_array(node)?;
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            if let Ok(coerced) = Lossless::<S>::from_node(element) {
                values.push(coerced.into_inner());
            }
        }
        Ok(LosslessVec { values })
    }
}

impl<S: LosslessStrategy> ToNode for LosslessVec<S> {
    fn to_node(&self) -> Value {
        self.encode()
    }
}

impl<S: LosslessStrategy> FieldCodec for LosslessVec<S> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

impl<S: LosslessStrategy> Deref for LosslessVec<S> {
    type Target = Vec<S::Value>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<S: LosslessStrategy> DerefMut for LosslessVec<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl<S: LosslessStrategy> std::fmt::Debug for LosslessVec<S>
where
    S::Value: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LosslessVec").field(&self.values).finish()
    }
}

impl<S: LosslessStrategy> PartialEq for LosslessVec<S>
where
    S::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
