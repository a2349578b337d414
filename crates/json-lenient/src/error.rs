//! Decode/encode error taxonomy.
//!
//! Every decode failure is classified as one of four kinds so strategies can
//! branch on the classification (the boolean default policy, for instance,
//! only coerces on [`DecodeError::TypeMismatch`]). Each variant carries the
//! path of the offending field; bindings prefix segments outward with
//! [`DecodeError::at`] as the error propagates.

use json_lenient_pointer::{format_pointer, Path, PathSegment};
use thiserror::Error;

use crate::node::NodeKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// The value is present but its wire type does not match the declared type.
    #[error("type mismatch at `{}`: expected {expected}, found {actual}", format_pointer(.path))]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        actual: NodeKind,
    },
    /// The value is present but null where a non-null value was declared.
    #[error("value not found at `{}`: expected {expected}, found null", format_pointer(.path))]
    ValueNotFound { path: Path, expected: &'static str },
    /// A keyed container does not contain the requested key.
    #[error("key `{key}` not found at `{}`", format_pointer(.path))]
    KeyNotFound { path: Path, key: String },
    /// The value is structurally present but its content is invalid.
    #[error("data corrupted at `{}`: {message}", format_pointer(.path))]
    DataCorrupted { path: Path, message: String },
}

impl DecodeError {
    pub fn type_mismatch(expected: &'static str, node: &serde_json::Value) -> Self {
        DecodeError::TypeMismatch {
            path: Vec::new(),
            expected,
            actual: NodeKind::of(node),
        }
    }

    pub fn value_not_found(expected: &'static str) -> Self {
        DecodeError::ValueNotFound {
            path: Vec::new(),
            expected,
        }
    }

    pub fn key_not_found(key: impl Into<String>) -> Self {
        DecodeError::KeyNotFound {
            path: Vec::new(),
            key: key.into(),
        }
    }

    pub fn data_corrupted(message: impl Into<String>) -> Self {
        DecodeError::DataCorrupted {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Prefixes `segment` onto the error's path. Called at each container
    /// boundary on the way out, so the final path reads root-first.
    pub fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path_mut().insert(0, segment.into());
        self
    }

    pub fn path(&self) -> &Path {
        match self {
            DecodeError::TypeMismatch { path, .. }
            | DecodeError::ValueNotFound { path, .. }
            | DecodeError::KeyNotFound { path, .. }
            | DecodeError::DataCorrupted { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut Path {
        match self {
            DecodeError::TypeMismatch { path, .. }
            | DecodeError::ValueNotFound { path, .. }
            | DecodeError::KeyNotFound { path, .. }
            | DecodeError::DataCorrupted { path, .. } => path,
        }
    }

    /// The RFC 6901 pointer to the offending field.
    pub fn pointer(&self) -> String {
        format_pointer(self.path())
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, DecodeError::TypeMismatch { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    /// The held value can no longer be represented in its original wire type.
    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}

impl EncodeError {
    pub fn invalid_value(message: impl Into<String>) -> Self {
        EncodeError::InvalidValue {
            message: message.into(),
        }
    }
}
