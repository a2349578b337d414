//! Resilience layer between untyped JSON documents and typed models.
//!
//! Field bindings absorb four classes of schema drift without failing the
//! whole decode: missing or null values fall back to defaults, malformed
//! collection elements are dropped, scalars carried as the wrong wire type
//! are coerced losslessly, and heterogeneous objects dispatch on a
//! discriminator field. Date and binary fields decode through pluggable
//! wire-format strategies and replay their source text verbatim on encode.

pub use json_lenient_pointer as pointer;

mod truthy;

pub mod data_value;
pub mod date_value;
pub mod default_value;
pub mod error;
pub mod keyed;
pub mod lossless;
pub mod lossy;
pub mod node;
pub mod polymorphic;

pub use data_value::{Base64Strategy, DataStrategy, DataValue};
pub use date_value::{
    DateStrategy, DateValue, Iso8601FractionalStrategy, Iso8601Strategy, OptionalDateValue,
    Rfc2822Strategy, Rfc3339Strategy, TimestampStrategy, YearMonthDayStrategy,
};
pub use default_value::{
    DefaultEmptyMap, DefaultEmptyString, DefaultEmptyVec, DefaultFalse, DefaultInit, DefaultNil,
    DefaultTrue, DefaultValueProvider, DefaultZero, Defaulted, LossyOption,
};
pub use error::{DecodeError, EncodeError};
pub use keyed::{FieldCodec, KeyStyle, Keyed};
pub use lossless::{
    BoolFirstLossless, Lossless, LosslessArray, LosslessBool, LosslessStrategy, LosslessText,
    LosslessValue, LosslessVec, OptionalLossless, OptionalLosslessValue, Probe, Probed,
    StandardLossless, BOOL_FIRST_PROBES, STANDARD_PROBES,
};
pub use lossy::{AuditedVec, FailedDecode, LossyKey, LossyMap, LossyVec};
pub use node::{FromNode, NodeKind, ToNode};
pub use polymorphic::{Polymorphic, PolymorphicFamily};
