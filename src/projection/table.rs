//! Table definition helpers

use crate::schema::{ColumnProjection, Schema};

use super::engine::{project, QueryKind};

/// A column with separate select, insert and update schemas
pub fn column_type(select: Schema, insert: Schema, update: Schema) -> ColumnProjection {
    ColumnProjection::new(select, insert, update)
}

/// A server-generated column: always selected, omittable on insert, updatable
pub fn generated(schema: Schema) -> ColumnProjection {
    column_type(schema.clone(), schema.clone().optional(), schema)
}

/// The three derived schemas of one table, computed once
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchemas {
    selectable: Schema,
    insertable: Schema,
    updateable: Schema,
}

impl TableSchemas {
    /// Project a table schema for every query kind
    pub fn derive(table: &Schema) -> Self {
        Self {
            selectable: project(table, QueryKind::Select),
            insertable: project(table, QueryKind::Insert),
            updateable: project(table, QueryKind::Update),
        }
    }

    pub fn selectable(&self) -> &Schema {
        &self.selectable
    }

    pub fn insertable(&self) -> &Schema {
        &self.insertable
    }

    pub fn updateable(&self) -> &Schema {
        &self.updateable
    }

    pub fn for_kind(&self, kind: QueryKind) -> &Schema {
        match kind {
            QueryKind::Select => &self.selectable,
            QueryKind::Insert => &self.insertable,
            QueryKind::Update => &self.updateable,
        }
    }
}
