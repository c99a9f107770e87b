//! # Query Codec Module
//!
//! Typed boundary around data store operations.
//!
//! ## Design Principles
//!
//! - Encode strictly precedes execute, which strictly precedes decode
//! - Malformed input never reaches the operation
//! - Every failure is a `DatabaseError` value, never a panic
//! - No retries, no caching, no timeouts: the caller owns scheduling
//! - Templates are stateless and safe to run concurrently

mod codec;
mod errors;

pub use codec::{with_codec, with_decoder, with_encoder, WithCodec, WithDecoder, WithEncoder};
pub use errors::{DatabaseError, DatabaseResult, NoResultError, Rejection};
