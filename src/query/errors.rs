//! # Query Errors
//!
//! The closed set of failures a codec pipeline can settle with, and the
//! classification of raw operation failures into that set.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::schema::ParseError;

/// Result type for codec pipelines
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Everything a codec pipeline can fail with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatabaseError {
    /// Input or output violated its schema. Raised before the operation runs
    /// (encode) or after it succeeded (decode).
    #[error("Query parse error: {0}")]
    QueryParse(#[from] ParseError),

    /// The operation expected exactly one result and found none
    #[error("Not found")]
    NotFound,

    /// Any other operation failure
    #[error("Query error: {message}")]
    Query { message: String },
}

impl DatabaseError {
    /// Create a parse error
    pub fn query_parse(err: ParseError) -> Self {
        Self::QueryParse(err)
    }

    /// Create a not found error
    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn is_query_parse(&self) -> bool {
        matches!(self, Self::QueryParse(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }

    /// Returns the validation failure, if this is a parse error
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::QueryParse(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the operation's message, if this is a query error
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Query { message } => Some(message),
            _ => None,
        }
    }

    /// Error kind name
    pub fn tag(&self) -> &'static str {
        match self {
            Self::QueryParse(_) => "QueryParseError",
            Self::NotFound => "NotFoundError",
            Self::Query { .. } => "QueryError",
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::QueryParse(_) => "QUERY_PARSE_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Query { .. } => "QUERY_ERROR",
        }
    }
}

/// Signal from an operation that it expected a row and found none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("no result")]
pub struct NoResultError;

/// A failed operation, before classification.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into a rejection, so
/// operations can return their driver's own error type.
#[derive(Debug)]
pub enum Rejection {
    /// Expected exactly one result, found none
    NoResult,
    /// A typed error
    Error(Box<dyn std::error::Error + Send + Sync>),
    /// A failure that is not an error type
    Other(Value),
}

impl Rejection {
    pub fn no_result() -> Self {
        Self::NoResult
    }

    /// Failure described only by text
    pub fn message(message: impl Into<String>) -> Self {
        Self::Other(Value::String(message.into()))
    }

    /// Failure carried as an arbitrary value
    pub fn value(value: Value) -> Self {
        Self::Other(value)
    }

    /// Wrap an already boxed error
    pub fn boxed(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        if is_no_result(err.as_ref()) {
            Self::NoResult
        } else {
            Self::Error(err)
        }
    }

    /// Map onto the error taxonomy. Total: every rejection yields `NotFound`
    /// or `Query`.
    pub fn classify(self) -> DatabaseError {
        match self {
            Self::NoResult => DatabaseError::NotFound,
            Self::Error(err) => {
                let message = err.to_string();
                if message.is_empty() {
                    DatabaseError::query(format!("{:?}", err))
                } else {
                    DatabaseError::query(message)
                }
            }
            Self::Other(Value::String(message)) => DatabaseError::query(message),
            Self::Other(value) => DatabaseError::query(value.to_string()),
        }
    }
}

impl<E> From<E> for Rejection
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::boxed(Box::new(err))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResult => write!(f, "no result"),
            Self::Error(err) => write!(f, "{}", err),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

fn is_no_result(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    err.is::<NoResultError>()
        || err
            .downcast_ref::<DatabaseError>()
            .is_some_and(DatabaseError::is_not_found)
}
