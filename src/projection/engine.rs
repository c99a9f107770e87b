//! Column projection
//!
//! Rewrites the top-level field list of a table schema for one query kind:
//! - Plain fields are copied unchanged
//! - Projected fields take the sub-schema for the query kind
//! - Fields whose resolved schema is `Never` are dropped, plain or projected
//! - Insert marks a field optional when its schema is a union with absent or null
//! - Update makes every surviving field optional
//!
//! Only the outermost struct is rewritten. Anything that is not a struct is
//! returned unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnProjection, Field, FieldKind, Schema, StructSchema};

/// The operation a derived schema is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Reading full rows
    Select,
    /// Creating rows
    Insert,
    /// Partially modifying rows
    Update,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [QueryKind::Select, QueryKind::Insert, QueryKind::Update];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "select",
            QueryKind::Insert => "insert",
            QueryKind::Update => "update",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ColumnProjection {
    /// Returns the sub-schema used for `kind`
    pub fn for_kind(&self, kind: QueryKind) -> &Schema {
        match kind {
            QueryKind::Select => &self.select,
            QueryKind::Insert => &self.insert,
            QueryKind::Update => &self.update,
        }
    }
}

/// Derive the schema of `kind` from a table schema.
///
/// The result never contains a projected field.
pub fn project(schema: &Schema, kind: QueryKind) -> Schema {
    match schema {
        Schema::Struct(table) => Schema::Struct(project_struct(table, kind)),
        other => other.clone(),
    }
}

/// Derive the struct schema of `kind` from a table's field list
pub fn project_struct(table: &StructSchema, kind: QueryKind) -> StructSchema {
    StructSchema::from_fields(
        table
            .fields()
            .iter()
            .filter_map(|field| project_field(field, kind)),
    )
}

fn project_field(field: &Field, kind: QueryKind) -> Option<Field> {
    let resolved = match &field.kind {
        FieldKind::Plain(schema) => schema,
        FieldKind::Projected(projection) => projection.for_kind(kind),
    };
    if resolved.is_never() {
        return None;
    }
    let resolved = resolved.clone();

    let (schema, optional) = match kind {
        QueryKind::Select => (resolved, field.optional),
        QueryKind::Insert => {
            let optional = field.optional || resolved.is_optional_type();
            (resolved, optional)
        }
        QueryKind::Update => (resolved.optional(), true),
    };

    Some(Field::plain(field.name.clone(), schema).with_optional(optional))
}

/// Schema for reading full rows
pub fn selectable(schema: &Schema) -> Schema {
    project(schema, QueryKind::Select)
}

/// Schema for creating rows
pub fn insertable(schema: &Schema) -> Schema {
    project(schema, QueryKind::Insert)
}

/// Schema for partial updates
pub fn updateable(schema: &Schema) -> Schema {
    project(schema, QueryKind::Update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo_table() -> Schema {
        StructSchema::new()
            .column(
                "id",
                ColumnProjection::new(
                    Schema::number_from_string(),
                    Schema::number().optional(),
                    Schema::number(),
                ),
            )
            .field("name", Schema::string())
            .into()
    }

    fn fields(schema: &Schema) -> &[Field] {
        schema.as_struct().expect("struct schema").fields()
    }

    #[test]
    fn test_selectable() {
        let derived = selectable(&todo_table());
        let fields = fields(&derived);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "id");
        match fields[0].schema() {
            Some(Schema::Transform(t)) => {
                assert_eq!(t.wire(), &Schema::String);
                assert_eq!(t.domain(), &Schema::Number);
            }
            other => panic!("expected transform, got {:?}", other),
        }
        assert!(!fields[0].optional);

        assert_eq!(fields[1].name, "name");
        assert_eq!(fields[1].schema(), Some(&Schema::String));
        assert!(!fields[1].optional);
    }

    #[test]
    fn test_insertable() {
        let derived = insertable(&todo_table());
        let fields = fields(&derived);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "id");
        assert!(fields[0].optional);
        assert_eq!(
            fields[0].schema(),
            Some(&Schema::Union(vec![Schema::Number, Schema::Absent]))
        );

        assert_eq!(fields[1].name, "name");
        assert!(!fields[1].optional);
        assert_eq!(fields[1].schema(), Some(&Schema::String));
    }

    #[test]
    fn test_updateable() {
        let derived = updateable(&todo_table());
        let fields = fields(&derived);

        assert_eq!(fields.len(), 2);
        for (field, inner) in fields.iter().zip([Schema::Number, Schema::String]) {
            assert!(field.optional, "{} should be optional", field.name);
            assert_eq!(field.schema(), Some(&Schema::Union(vec![inner, Schema::Absent])));
        }
    }

    #[test]
    fn test_never_drops_column_per_kind() {
        let table: Schema = StructSchema::new()
            .column(
                "updated_at",
                ColumnProjection::new(
                    Schema::date_from_string(),
                    Schema::never(),
                    Schema::date_from_string(),
                ),
            )
            .into();

        assert_eq!(fields(&selectable(&table)).len(), 1);
        assert!(fields(&insertable(&table)).is_empty());
        assert_eq!(fields(&updateable(&table)).len(), 1);
    }

    #[test]
    fn test_nullable_column_is_optional_on_insert() {
        let table: Schema = StructSchema::new()
            .field("deleted_at", Schema::string().nullable())
            .into();
        assert!(fields(&insertable(&table))[0].optional);
        assert!(!fields(&selectable(&table))[0].optional);
    }

    #[test]
    fn test_non_struct_passes_through() {
        let schema = Schema::array(Schema::int());
        for kind in QueryKind::ALL {
            assert_eq!(project(&schema, kind), schema);
        }
    }

    #[test]
    fn test_nested_struct_is_not_rewritten() {
        let inner: Schema = StructSchema::new()
            .column(
                "id",
                ColumnProjection::new(Schema::int(), Schema::never(), Schema::never()),
            )
            .into();
        let table: Schema = StructSchema::new().field("meta", inner.clone()).into();

        let derived = selectable(&table);
        assert_eq!(fields(&derived)[0].schema(), Some(&inner));
    }

    #[test]
    fn test_query_kind_display() {
        assert_eq!(QueryKind::Insert.to_string(), "insert");
        assert_eq!(
            serde_json::to_string(&QueryKind::Update).unwrap(),
            "\"update\""
        );
    }
}
