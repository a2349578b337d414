//! Typed document paths with RFC 6901 pointer formatting.
//!
//! Every error surfaced by `json-lenient` carries a [`Path`] locating the
//! offending field inside the source document. Paths render as JSON Pointers
//! (`/orders/3/sku`) so producer/consumer schema drift can be debugged
//! against the raw payload.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("json pointer must be absolute or empty")]
    NotAbsolute,
}

/// One step into a document: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(&escape_component(key)),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A sequence of segments from the document root (or a binding boundary).
pub type Path = Vec<PathSegment>;

/// Escapes one JSON Pointer token component.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Unescapes one JSON Pointer token component.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Format segments into an RFC 6901 pointer. The empty path renders as `""`.
pub fn format_pointer(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for segment in path {
        out.push('/');
        match segment {
            PathSegment::Key(key) => out.push_str(&escape_component(key)),
            PathSegment::Index(index) => out.push_str(&index.to_string()),
        }
    }
    out
}

/// Parse an absolute RFC 6901 pointer into segments.
///
/// Purely numeric tokens parse as [`PathSegment::Index`]; everything else is
/// an unescaped [`PathSegment::Key`].
///
/// Examples:
/// - `"" -> []`
/// - `"/a~1b/~0k/0" -> [Key("a/b"), Key("~k"), Index(0)]`
pub fn parse_pointer(pointer: &str) -> Result<Path, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(PointerError::NotAbsolute);
    }
    Ok(pointer
        .split('/')
        .skip(1)
        .map(|token| {
            // "01" stays a key; only canonical indexes become Index.
            if token == "0" || (!token.is_empty() && !token.starts_with('0')) {
                if let Ok(index) = token.parse::<usize>() {
                    return PathSegment::Index(index);
                }
            }
            PathSegment::Key(unescape_component(token))
        })
        .collect())
}
