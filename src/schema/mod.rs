//! Schema primitives for aerodb-codec
//!
//! A schema describes one value in two representations: the wire form the data
//! store exchanges (text timestamps, 0/1 booleans) and the validated domain
//! form. Decoding goes wire to domain, encoding goes domain to wire.
//!
//! # Design Principles
//!
//! - Schemas are immutable values, shared freely across threads
//! - Struct fields keep declaration order
//! - Table columns declare per-operation schemas with `FieldKind::Projected`
//! - Parsing never mutates its input and reports the first failure with its path

mod errors;
mod parser;
mod transform;
mod types;

pub use errors::{Direction, ParseError, ParseIssue, ParseResult, PathSegment, SchemaError};
pub use parser::{ExcessProperty, ParseOptions};
pub use transform::{
    BooleanFromNumber, DateFromString, FnTransformation, NumberFromString, Transformation,
};
pub use types::{Brand, ColumnProjection, Field, FieldKind, Schema, StructSchema, Transform};
