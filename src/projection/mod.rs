//! Column Projection Engine
//!
//! A table is described once, with each column either plain (same schema for
//! every operation) or projected (separate select, insert and update schemas).
//! The engine derives the select, insert and update shapes from that single
//! description so the three can never drift apart.
//!
//! # Invariants
//!
//! - Derived schemas never contain projected fields
//! - Field order is declaration order minus dropped columns
//! - Every field of an update schema may be omitted
//! - Projecting a derived schema again for the same kind is the identity

mod engine;
mod table;

pub use engine::{insertable, project, project_struct, selectable, updateable, QueryKind};
pub use table::{column_type, generated, TableSchemas};
