//! Host-runtime contract over `serde_json::Value`.
//!
//! [`FromNode`] and [`ToNode`] are the scalar/container decode-encode surface
//! that every strategy binding builds on: scalars across the full signed and
//! unsigned width set, arrays, keyed containers, and optionals. Decode errors
//! come back classified (see [`DecodeError`]) so bindings can branch on the
//! failure kind.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::error::DecodeError;

/// The wire-level shape of a document node, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl NodeKind {
    pub fn of(node: &Value) -> Self {
        match node {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Bool,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Array(_) => NodeKind::Array,
            Value::Object(_) => NodeKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes `Self` from a document node.
pub trait FromNode: Sized {
    /// Type name used in `expected ...` error messages.
    const EXPECTED: &'static str;

    fn from_node(node: &Value) -> Result<Self, DecodeError>;
}

/// Encodes `self` as a document node. Infallible: types whose encoding can
/// fail (lossless reconstruction, polymorphic families) expose a fallible
/// inherent `encode` instead.
pub trait ToNode {
    fn to_node(&self) -> Value;
}

fn mismatch_or_null(expected: &'static str, node: &Value) -> DecodeError {
    if node.is_null() {
        DecodeError::value_not_found(expected)
    } else {
        DecodeError::type_mismatch(expected, node)
    }
}

/// Borrow the object map of `node`, or fail with the usual classification.
pub fn expect_object(node: &Value) -> Result<&Map<String, Value>, DecodeError> {
    node.as_object().ok_or_else(|| mismatch_or_null("object", node))
}

/// Borrow the array elements of `node`, or fail with the usual classification.
pub fn expect_array(node: &Value) -> Result<&Vec<Value>, DecodeError> {
    node.as_array().ok_or_else(|| mismatch_or_null("array", node))
}

impl FromNode for bool {
    const EXPECTED: &'static str = "bool";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        node.as_bool()
            .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))
    }
}

impl ToNode for bool {
    fn to_node(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromNode for String {
    const EXPECTED: &'static str = "string";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        node.as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))
    }
}

impl ToNode for String {
    fn to_node(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromNode for i64 {
    const EXPECTED: &'static str = "i64";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        node.as_i64()
            .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))
    }
}

impl ToNode for i64 {
    fn to_node(&self) -> Value {
        Value::from(*self)
    }
}

impl FromNode for u64 {
    const EXPECTED: &'static str = "u64";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        node.as_u64()
            .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))
    }
}

impl ToNode for u64 {
    fn to_node(&self) -> Value {
        Value::from(*self)
    }
}

macro_rules! narrow_signed {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FromNode for $ty {
            const EXPECTED: &'static str = $name;

            fn from_node(node: &Value) -> Result<Self, DecodeError> {
                let wide = node
                    .as_i64()
                    .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))?;
                <$ty>::try_from(wide).map_err(|_| {
                    DecodeError::data_corrupted(format!(
                        "number {wide} out of range for {}",
                        $name
                    ))
                })
            }
        }

        impl ToNode for $ty {
            fn to_node(&self) -> Value {
                Value::from(i64::from(*self))
            }
        }
    )*};
}

macro_rules! narrow_unsigned {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl FromNode for $ty {
            const EXPECTED: &'static str = $name;

            fn from_node(node: &Value) -> Result<Self, DecodeError> {
                let wide = node
                    .as_u64()
                    .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))?;
                <$ty>::try_from(wide).map_err(|_| {
                    DecodeError::data_corrupted(format!(
                        "number {wide} out of range for {}",
                        $name
                    ))
                })
            }
        }

        impl ToNode for $ty {
            fn to_node(&self) -> Value {
                Value::from(u64::from(*self))
            }
        }
    )*};
}

narrow_signed!(i8 => "i8", i16 => "i16", i32 => "i32");
narrow_unsigned!(u8 => "u8", u16 => "u16", u32 => "u32");

impl FromNode for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        node.as_f64()
            .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))
    }
}

impl ToNode for f64 {
    fn to_node(&self) -> Value {
        // Non-finite floats have no JSON form.
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl FromNode for f32 {
    const EXPECTED: &'static str = "f32";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        node.as_f64()
            .map(|wide| wide as f32)
            .ok_or_else(|| mismatch_or_null(Self::EXPECTED, node))
    }
}

impl ToNode for f32 {
    fn to_node(&self) -> Value {
        Number::from_f64(f64::from(*self)).map_or(Value::Null, Value::Number)
    }
}

impl<T: FromNode> FromNode for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        if node.is_null() {
            Ok(None)
        } else {
            T::from_node(node).map(Some)
        }
    }
}

impl<T: ToNode> ToNode for Option<T> {
    fn to_node(&self) -> Value {
        match self {
            Some(value) => value.to_node(),
            None => Value::Null,
        }
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let elements = expect_array(node)?;
        let mut out = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            out.push(T::from_node(element).map_err(|err| err.at(index))?);
        }
        Ok(out)
    }
}

impl<T: ToNode> ToNode for Vec<T> {
    fn to_node(&self) -> Value {
        Value::Array(self.iter().map(ToNode::to_node).collect())
    }
}

impl<T: FromNode> FromNode for IndexMap<String, T> {
    const EXPECTED: &'static str = "object";

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let object = expect_object(node)?;
        let mut out = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            let decoded = T::from_node(value).map_err(|err| err.at(key.as_str()))?;
            out.insert(key.clone(), decoded);
        }
        Ok(out)
    }
}

impl<T: ToNode> ToNode for IndexMap<String, T> {
    fn to_node(&self) -> Value {
        let mut out = Map::new();
        for (key, value) in self {
            out.insert(key.clone(), value.to_node());
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_kind_of_matrix() {
        assert_eq!(NodeKind::of(&json!(null)), NodeKind::Null);
        assert_eq!(NodeKind::of(&json!(true)), NodeKind::Bool);
        assert_eq!(NodeKind::of(&json!(1.5)), NodeKind::Number);
        assert_eq!(NodeKind::of(&json!("x")), NodeKind::String);
        assert_eq!(NodeKind::of(&json!([])), NodeKind::Array);
        assert_eq!(NodeKind::of(&json!({})), NodeKind::Object);
    }

    #[test]
    fn scalar_roundtrips() {
        assert_eq!(bool::from_node(&json!(true)).unwrap(), true);
        assert_eq!(String::from_node(&json!("x")).unwrap(), "x");
        assert_eq!(i64::from_node(&json!(-7)).unwrap(), -7);
        assert_eq!(u64::from_node(&json!(7)).unwrap(), 7);
        assert_eq!(i8::from_node(&json!(-128)).unwrap(), -128);
        assert_eq!(f64::from_node(&json!(7.1)).unwrap(), 7.1);
        // Integers decode as floats too.
        assert_eq!(f64::from_node(&json!(7)).unwrap(), 7.0);
        assert_eq!((-7i64).to_node(), json!(-7));
        assert_eq!(7.5f64.to_node(), json!(7.5));
    }

    #[test]
    fn null_classifies_as_value_not_found() {
        assert_eq!(
            bool::from_node(&json!(null)).unwrap_err(),
            DecodeError::value_not_found("bool")
        );
        assert_eq!(
            i64::from_node(&json!(null)).unwrap_err(),
            DecodeError::value_not_found("i64")
        );
    }

    #[test]
    fn wrong_type_classifies_as_type_mismatch() {
        let err = bool::from_node(&json!("true")).unwrap_err();
        assert_eq!(err, DecodeError::type_mismatch("bool", &json!("true")));
        assert!(i64::from_node(&json!(1.5)).unwrap_err().is_type_mismatch());
        assert!(u64::from_node(&json!(-1)).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn narrow_widths_range_check() {
        assert!(matches!(
            i8::from_node(&json!(300)).unwrap_err(),
            DecodeError::DataCorrupted { .. }
        ));
        assert_eq!(u8::from_node(&json!(255)).unwrap(), 255);
    }

    #[test]
    fn option_null_is_none() {
        assert_eq!(Option::<i64>::from_node(&json!(null)).unwrap(), None);
        assert_eq!(Option::<i64>::from_node(&json!(3)).unwrap(), Some(3));
        assert_eq!(None::<i64>.to_node(), json!(null));
    }

    #[test]
    fn vec_errors_carry_index_path() {
        let err = Vec::<i64>::from_node(&json!([1, "x", 3])).unwrap_err();
        assert_eq!(err.pointer(), "/1");
    }

    #[test]
    fn map_preserves_order_and_paths() {
        let decoded = IndexMap::<String, i64>::from_node(&json!({"b": 2, "a": 1})).unwrap();
        assert_eq!(
            decoded.keys().collect::<Vec<_>>(),
            vec!["b", "a"],
            "encounter order kept"
        );
        let err = IndexMap::<String, i64>::from_node(&json!({"a": "x"})).unwrap_err();
        assert_eq!(err.pointer(), "/a");
    }

    #[test]
    fn non_finite_floats_encode_as_null() {
        assert_eq!(f64::NAN.to_node(), json!(null));
    }
}
