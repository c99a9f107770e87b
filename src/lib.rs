//! aerodb-codec - Per-operation table schemas and a typed codec pipeline
//!
//! A table is described once. Columns that behave differently on select,
//! insert and update carry a `ColumnProjection`; the projection engine derives
//! the three shapes from that single description. The query codec wraps an
//! asynchronous data store operation, encoding domain input to wire values,
//! running the operation and decoding its result, with every failure reported
//! as a `DatabaseError`.
//!
//! ```ignore
//! use aerodb_codec::prelude::*;
//!
//! let todo = TableSchemas::derive(&StructSchema::new()
//!     .column("id", column_type(Schema::int(), Schema::never(), Schema::never()))
//!     .field("content", Schema::string())
//!     .field("completed", Schema::boolean_from_number())
//!     .into());
//!
//! let insert = with_codec::<NewTodo, TodoId, _>(
//!     todo.insertable().clone(),
//!     StructSchema::new().field("id", Schema::int()).into(),
//!     |row| async move { store.insert("todo", row).await },
//! );
//! let id = insert.run(new_todo).await?;
//! ```

pub mod config;
pub mod observability;
pub mod projection;
pub mod query;
pub mod schema;

/// Everything needed to declare tables and wrap queries
pub mod prelude {
    pub use crate::config::CodecConfig;
    pub use crate::projection::{
        column_type, generated, insertable, project, selectable, updateable, QueryKind,
        TableSchemas,
    };
    pub use crate::query::{
        with_codec, with_decoder, with_encoder, DatabaseError, DatabaseResult, NoResultError,
        Rejection,
    };
    pub use crate::schema::{ParseOptions, Schema, StructSchema};
}
