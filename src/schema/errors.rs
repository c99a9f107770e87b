//! Schema error types
//!
//! Two families:
//! - `ParseError`: a value violated a schema while being decoded or encoded
//! - `SchemaError`: a schema itself was assembled incorrectly

use std::fmt;

use thiserror::Error;

/// Which way a value was travelling when parsing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Wire representation to domain representation
    Decode,
    /// Domain representation to wire representation
    Encode,
}

impl Direction {
    /// Returns the lowercase direction name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Decode => "decode",
            Direction::Encode => "encode",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the location of a failing value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property
    Key(String),
    /// Array element
    Index(usize),
}

/// The rule a value broke
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseIssue {
    /// Required property absent
    #[error("is missing")]
    Missing,

    /// Property not declared by the schema
    #[error("is unexpected")]
    Unexpected,

    /// Value has the wrong JSON type
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Value differs from the literal the schema demands
    #[error("expected literal {expected}, got {actual}")]
    LiteralMismatch { expected: String, actual: String },

    /// Schema admits no value here
    #[error("is forbidden: {0}")]
    Forbidden(String),

    /// A transformation rejected its input
    #[error("transformation '{name}' failed: {message}")]
    Transformation { name: String, message: String },

    /// Every member of a union rejected the value
    #[error("matched none of {} union members", .0.len())]
    Union(Vec<ParseError>),

    /// Converting between a Rust value and its JSON form failed
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// A value violated a schema.
///
/// Carries the direction, the path to the offending value, and the issue so a
/// diagnostic can be built without re-running the parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    direction: Direction,
    path: Vec<PathSegment>,
    issue: ParseIssue,
}

impl ParseError {
    /// Create an error at the given path
    pub fn new(direction: Direction, path: Vec<PathSegment>, issue: ParseIssue) -> Self {
        Self {
            direction,
            path,
            issue,
        }
    }

    /// Create an error for a failed serde conversion at the root
    pub fn serialization(direction: Direction, err: impl fmt::Display) -> Self {
        Self::new(
            direction,
            Vec::new(),
            ParseIssue::Serialization(err.to_string()),
        )
    }

    /// Returns the direction that failed
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the path to the offending value
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Returns the broken rule
    pub fn issue(&self) -> &ParseIssue {
        &self.issue
    }

    /// Renders the path as `todos[1].id`, or `$root` when empty
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "$root".to_string();
        }

        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(i) => {
                    out.push_str(&format!("[{}]", i));
                }
            }
        }
        out
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed at {}: {}", self.direction, self.path_string(), self.issue)
    }
}

impl std::error::Error for ParseError {}

/// Mistakes made while assembling a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two struct schemas declare the same property
    #[error("duplicate property '{0}'")]
    DuplicateField(String),

    /// A combinator named a property the struct does not declare
    #[error("unknown property '{0}'")]
    UnknownField(String),
}

/// Result type for schema parsing
pub type ParseResult<T> = Result<T, ParseError>;
