//! Schema type definitions
//!
//! A `Schema` describes both the shape a value must have and how it converts
//! between its wire form (what the data store exchanges) and its domain form
//! (what the application works with).
//!
//! Supported nodes:
//! - string, number, int, boolean: JSON scalars
//! - null: the null literal
//! - absent: "this value may be omitted"
//! - never: admits no value at all
//! - unknown: admits any value unchanged
//! - literal, union, array, struct
//! - transform: wire schema + domain schema + conversion
//! - brand: nominal label over another schema

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::errors::SchemaError;
use super::transform::{
    BooleanFromNumber, DateFromString, FnTransformation, NumberFromString, Transformation,
};

/// A schema node
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// UTF-8 string
    String,
    /// Any JSON number
    Number,
    /// 64-bit integer
    Int,
    /// Boolean
    Boolean,
    /// The null literal
    Null,
    /// Value may be omitted
    Absent,
    /// No value is valid
    Never,
    /// Any value, passed through
    Unknown,
    /// Exactly this value
    Literal(Value),
    /// First matching member wins
    Union(Vec<Schema>),
    /// Homogeneous array
    Array(Box<Schema>),
    /// Ordered record of named fields
    Struct(StructSchema),
    /// Wire/domain conversion
    Transform(Transform),
    /// Nominal label
    Brand(Brand),
}

impl Schema {
    pub fn string() -> Self {
        Schema::String
    }

    pub fn number() -> Self {
        Schema::Number
    }

    pub fn int() -> Self {
        Schema::Int
    }

    pub fn boolean() -> Self {
        Schema::Boolean
    }

    pub fn null() -> Self {
        Schema::Null
    }

    pub fn absent() -> Self {
        Schema::Absent
    }

    pub fn never() -> Self {
        Schema::Never
    }

    pub fn unknown() -> Self {
        Schema::Unknown
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Schema::Literal(value.into())
    }

    pub fn union(members: Vec<Schema>) -> Self {
        Schema::Union(members)
    }

    pub fn array(element: Schema) -> Self {
        Schema::Array(Box::new(element))
    }

    /// Build a transform from a wire schema, a domain schema and a conversion
    pub fn transform(from: Schema, to: Schema, transformation: impl Transformation + 'static) -> Self {
        Schema::Transform(Transform {
            from: Box::new(from),
            to: Box::new(to),
            transformation: Arc::new(transformation),
        })
    }

    /// Build a transform from a pair of closures
    pub fn transform_with<D, E>(
        from: Schema,
        to: Schema,
        name: impl Into<String>,
        decode: D,
        encode: E,
    ) -> Self
    where
        D: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
        E: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::transform(from, to, FnTransformation::new(name, decode, encode))
    }

    /// Numeric text on the wire, a number in the domain
    pub fn number_from_string() -> Self {
        Self::transform(Schema::String, Schema::Number, NumberFromString)
    }

    /// `1`/`0` on the wire, a boolean in the domain
    pub fn boolean_from_number() -> Self {
        Self::transform(Schema::Number, Schema::Boolean, BooleanFromNumber)
    }

    /// Timestamp text on the wire, an RFC 3339 UTC string in the domain
    pub fn date_from_string() -> Self {
        Self::transform(Schema::String, Schema::String, DateFromString)
    }

    /// Attach a nominal label
    pub fn brand(self, name: impl Into<String>) -> Self {
        Schema::Brand(Brand {
            inner: Box::new(self),
            name: name.into(),
        })
    }

    /// Union with `Absent`.
    ///
    /// A schema that already admits `Absent` is returned unchanged, and a union
    /// gains `Absent` as an extra member instead of being nested.
    pub fn optional(self) -> Self {
        if self.admits_absent() {
            return self;
        }
        match self {
            Schema::Union(mut members) => {
                members.push(Schema::Absent);
                Schema::Union(members)
            }
            other => Schema::Union(vec![other, Schema::Absent]),
        }
    }

    /// Union with the null literal
    pub fn nullable(self) -> Self {
        if self.accepts_null() {
            return self;
        }
        match self {
            Schema::Union(mut members) => {
                members.push(Schema::Null);
                Schema::Union(members)
            }
            other => Schema::Union(vec![other, Schema::Null]),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Schema::Never)
    }

    /// True if the value may be omitted entirely
    pub fn admits_absent(&self) -> bool {
        match self {
            Schema::Absent => true,
            Schema::Union(members) => members.iter().any(Schema::admits_absent),
            _ => false,
        }
    }

    /// True if an explicit null is a valid value
    pub fn accepts_null(&self) -> bool {
        match self {
            Schema::Null | Schema::Unknown => true,
            Schema::Literal(v) => v.is_null(),
            Schema::Union(members) => members.iter().any(Schema::accepts_null),
            Schema::Brand(b) => b.inner.accepts_null(),
            Schema::Transform(t) => t.from.accepts_null() || t.to.accepts_null(),
            _ => false,
        }
    }

    /// True if this is a union carrying an `Absent`, `Null` or `literal(null)` member.
    ///
    /// This is the signal a column uses to declare itself omittable on insert.
    pub fn is_optional_type(&self) -> bool {
        match self {
            Schema::Union(members) => members
                .iter()
                .any(|m| match m {
                    Schema::Absent | Schema::Null => true,
                    Schema::Literal(v) => v.is_null(),
                    _ => false,
                }),
            _ => false,
        }
    }

    /// Returns the struct node, if this is one
    pub fn as_struct(&self) -> Option<&StructSchema> {
        match self {
            Schema::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::String => "string",
            Schema::Number => "number",
            Schema::Int => "int",
            Schema::Boolean => "boolean",
            Schema::Null => "null",
            Schema::Absent => "absent",
            Schema::Never => "never",
            Schema::Unknown => "unknown",
            Schema::Literal(_) => "literal",
            Schema::Union(_) => "union",
            Schema::Array(_) => "array",
            Schema::Struct(_) => "struct",
            Schema::Transform(_) => "transform",
            Schema::Brand(_) => "brand",
        }
    }
}

impl From<StructSchema> for Schema {
    fn from(s: StructSchema) -> Self {
        Schema::Struct(s)
    }
}

/// Wire schema, domain schema and the conversion between them
#[derive(Clone)]
pub struct Transform {
    pub(crate) from: Box<Schema>,
    pub(crate) to: Box<Schema>,
    pub(crate) transformation: Arc<dyn Transformation>,
}

impl Transform {
    /// Wire-side schema
    pub fn wire(&self) -> &Schema {
        &self.from
    }

    /// Domain-side schema
    pub fn domain(&self) -> &Schema {
        &self.to
    }

    pub fn name(&self) -> &str {
        self.transformation.name()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name())
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.transformation, &other.transformation)
            || self.name() == other.name())
            && self.from == other.from
            && self.to == other.to
    }
}

/// Nominal label over another schema
#[derive(Debug, Clone, PartialEq)]
pub struct Brand {
    pub(crate) inner: Box<Schema>,
    pub(crate) name: String,
}

impl Brand {
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The three per-operation schemas of one column.
///
/// A sub-schema of `Schema::Never` removes the column from that operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProjection {
    pub select: Schema,
    pub insert: Schema,
    pub update: Schema,
}

impl ColumnProjection {
    pub fn new(select: Schema, insert: Schema, update: Schema) -> Self {
        Self {
            select,
            insert,
            update,
        }
    }
}

/// How a field is defined
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Same schema for select, insert and update
    Plain(Schema),
    /// Per-operation schemas
    Projected(ColumnProjection),
}

/// A named struct property
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    /// Whether the property may be left out
    pub optional: bool,
}

impl Field {
    /// Create a required plain field
    pub fn plain(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Plain(schema),
            optional: false,
        }
    }

    /// Create a field with per-operation schemas
    pub fn projected(name: impl Into<String>, projection: ColumnProjection) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Projected(projection),
            optional: false,
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Returns the plain schema, if the field is not projected
    pub fn schema(&self) -> Option<&Schema> {
        match &self.kind {
            FieldKind::Plain(s) => Some(s),
            FieldKind::Projected(_) => None,
        }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self.kind, FieldKind::Projected(_))
    }
}

/// Ordered record schema.
///
/// Field names are unique; declaration order is kept and shows up in the
/// key order of parsed values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructSchema {
    fields: Vec<Field>,
}

impl StructSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a field list; a repeated name overwrites the earlier entry in place
    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Self {
        fields.into_iter().fold(Self::new(), StructSchema::with)
    }

    /// Add or replace a field
    pub fn with(mut self, field: Field) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Add a required plain field
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with(Field::plain(name, schema))
    }

    /// Add an optional plain field
    pub fn optional_field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with(Field::plain(name, schema).with_optional(true))
    }

    /// Add a column with per-operation schemas
    pub fn column(self, name: impl Into<String>, projection: ColumnProjection) -> Self {
        self.with(Field::projected(name, projection))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keep only the named fields, in declaration order
    pub fn pick(&self, names: &[&str]) -> Result<Self, SchemaError> {
        if let Some(missing) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(SchemaError::UnknownField(missing.to_string()));
        }
        Ok(Self {
            fields: self
                .fields
                .iter()
                .filter(|f| names.contains(&f.name.as_str()))
                .cloned()
                .collect(),
        })
    }

    /// Drop the named fields
    pub fn omit(&self, names: &[&str]) -> Result<Self, SchemaError> {
        if let Some(missing) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(SchemaError::UnknownField(missing.to_string()));
        }
        Ok(Self {
            fields: self
                .fields
                .iter()
                .filter(|f| !names.contains(&f.name.as_str()))
                .cloned()
                .collect(),
        })
    }

    /// Append another struct's fields; shared names are an error
    pub fn extend(&self, other: &StructSchema) -> Result<Self, SchemaError> {
        let mut fields = self.fields.clone();
        for field in &other.fields {
            if self.get(&field.name).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            fields.push(field.clone());
        }
        Ok(Self { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo() -> StructSchema {
        StructSchema::new()
            .field("id", Schema::int())
            .field("content", Schema::string())
            .field("user_id", Schema::int())
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        assert_eq!(todo().field_names(), vec!["id", "content", "user_id"]);
    }

    #[test]
    fn test_repeated_name_replaces_in_place() {
        let s = todo().field("id", Schema::string());
        assert_eq!(s.len(), 3);
        assert_eq!(s.field_names(), vec!["id", "content", "user_id"]);
        assert_eq!(s.get("id").unwrap().schema(), Some(&Schema::String));
    }

    #[test]
    fn test_optional_is_idempotent_and_flat() {
        let once = Schema::int().optional();
        assert_eq!(once, Schema::Union(vec![Schema::Int, Schema::Absent]));
        assert_eq!(once.clone().optional(), once);

        let widened = Schema::union(vec![Schema::Int, Schema::String]).optional();
        assert_eq!(
            widened,
            Schema::Union(vec![Schema::Int, Schema::String, Schema::Absent])
        );
    }

    #[test]
    fn test_optional_type_signals() {
        assert!(Schema::int().optional().is_optional_type());
        assert!(Schema::int().nullable().is_optional_type());
        assert!(!Schema::int().is_optional_type());
        assert!(!Schema::absent().is_optional_type());
        assert!(!Schema::int().brand("UserId").is_optional_type());
    }

    #[test]
    fn test_null_literal_member_is_optional_type() {
        let schema = Schema::union(vec![Schema::string(), Schema::literal(Value::Null)]);
        assert!(schema.is_optional_type());
        assert!(!Schema::literal("null").is_optional_type());
    }

    #[test]
    fn test_pick_keeps_declaration_order() {
        let picked = todo().pick(&["user_id", "id"]).unwrap();
        assert_eq!(picked.field_names(), vec!["id", "user_id"]);
    }

    #[test]
    fn test_pick_unknown_field() {
        assert_eq!(
            todo().pick(&["nope"]),
            Err(SchemaError::UnknownField("nope".into()))
        );
    }

    #[test]
    fn test_omit() {
        let omitted = todo().omit(&["user_id"]).unwrap();
        assert_eq!(omitted.field_names(), vec!["id", "content"]);
    }

    #[test]
    fn test_extend_appends() {
        let user = StructSchema::new().field("username", Schema::string());
        let joined = todo().extend(&user).unwrap();
        assert_eq!(
            joined.field_names(),
            vec!["id", "content", "user_id", "username"]
        );
    }

    #[test]
    fn test_extend_rejects_duplicates() {
        let other = StructSchema::new().field("id", Schema::string());
        assert_eq!(
            todo().extend(&other),
            Err(SchemaError::DuplicateField("id".into()))
        );
    }

    #[test]
    fn test_brand_keeps_inner() {
        match Schema::int().brand("UserId") {
            Schema::Brand(b) => {
                assert_eq!(b.name(), "UserId");
                assert_eq!(b.inner(), &Schema::Int);
            }
            other => panic!("expected brand, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_equality_by_name() {
        assert_eq!(Schema::date_from_string(), Schema::date_from_string());
        assert_ne!(Schema::date_from_string(), Schema::number_from_string());
    }
}
