//! Decode/encode walker
//!
//! Parsing semantics:
//! - Struct input must be an object; fields are checked in declaration order
//! - Output objects list keys in declaration order
//! - A missing key is accepted iff the field is optional or admits absent
//! - Excess keys are dropped or rejected per `ExcessProperty`
//! - A projected column cannot be parsed; the schema must be projected first
//! - Unions try members in order, first success wins
//! - The first failure aborts the walk
//!
//! The walker never mutates its input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{Direction, ParseError, ParseIssue, ParseResult, PathSegment};
use super::types::{FieldKind, Schema, StructSchema, Transform};

/// What to do with object keys the struct does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcessProperty {
    /// Drop them from the output
    #[default]
    Ignore,
    /// Fail with `ParseIssue::Unexpected`
    Error,
}

/// Parse behaviour knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Undeclared object keys (default: ignore)
    #[serde(default)]
    pub on_excess_property: ExcessProperty,

    /// Treat `null` as missing on fields that admit absent but not null
    /// (default: true)
    #[serde(default = "default_null_as_absent")]
    pub null_as_absent: bool,
}

fn default_null_as_absent() -> bool {
    true
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            on_excess_property: ExcessProperty::default(),
            null_as_absent: default_null_as_absent(),
        }
    }
}

impl ParseOptions {
    /// Options that reject undeclared keys
    pub fn strict() -> Self {
        Self {
            on_excess_property: ExcessProperty::Error,
            ..Self::default()
        }
    }
}

impl Schema {
    /// Wire value to domain value with default options
    pub fn decode(&self, wire: &Value) -> ParseResult<Value> {
        self.decode_with(wire, &ParseOptions::default())
    }

    /// Domain value to wire value with default options
    pub fn encode(&self, domain: &Value) -> ParseResult<Value> {
        self.encode_with(domain, &ParseOptions::default())
    }

    pub fn decode_with(&self, wire: &Value, options: &ParseOptions) -> ParseResult<Value> {
        Parser::new(Direction::Decode, options).parse(self, wire, &mut Vec::new())
    }

    pub fn encode_with(&self, domain: &Value, options: &ParseOptions) -> ParseResult<Value> {
        Parser::new(Direction::Encode, options).parse(self, domain, &mut Vec::new())
    }

    /// True if `value` decodes without error
    pub fn is_valid(&self, value: &Value) -> bool {
        self.decode(value).is_ok()
    }
}

struct Parser<'a> {
    direction: Direction,
    options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    fn new(direction: Direction, options: &'a ParseOptions) -> Self {
        Self { direction, options }
    }

    fn fail(&self, path: &[PathSegment], issue: ParseIssue) -> ParseError {
        ParseError::new(self.direction, path.to_vec(), issue)
    }

    fn mismatch(&self, path: &[PathSegment], expected: &str, actual: &Value) -> ParseError {
        self.fail(
            path,
            ParseIssue::TypeMismatch {
                expected: expected.to_string(),
                actual: json_type_name(actual).to_string(),
            },
        )
    }

    fn parse(&self, schema: &Schema, value: &Value, path: &mut Vec<PathSegment>) -> ParseResult<Value> {
        match schema {
            Schema::String => self.expect(value.is_string(), schema, value, path),
            Schema::Number => self.expect(value.is_number(), schema, value, path),
            Schema::Int => self.expect(value.is_i64() || value.is_u64(), schema, value, path),
            Schema::Boolean => self.expect(value.is_boolean(), schema, value, path),
            Schema::Null => self.expect(value.is_null(), schema, value, path),
            Schema::Unknown => Ok(value.clone()),
            // A present value is never "absent"; omission is handled by the struct walk
            Schema::Absent => Err(self.mismatch(path, "absent", value)),
            Schema::Never => Err(self.fail(
                path,
                ParseIssue::Forbidden("no value is allowed here".to_string()),
            )),
            Schema::Literal(expected) => {
                if value == expected {
                    Ok(value.clone())
                } else {
                    Err(self.fail(
                        path,
                        ParseIssue::LiteralMismatch {
                            expected: expected.to_string(),
                            actual: value.to_string(),
                        },
                    ))
                }
            }
            Schema::Union(members) => self.parse_union(members, value, path),
            Schema::Array(element) => self.parse_array(element, value, path),
            Schema::Struct(fields) => self.parse_struct(fields, value, path),
            Schema::Transform(transform) => self.parse_transform(transform, value, path),
            Schema::Brand(brand) => self.parse(&brand.inner, value, path),
        }
    }

    fn expect(
        &self,
        ok: bool,
        schema: &Schema,
        value: &Value,
        path: &[PathSegment],
    ) -> ParseResult<Value> {
        if ok {
            Ok(value.clone())
        } else {
            Err(self.mismatch(path, schema.type_name(), value))
        }
    }

    fn parse_union(
        &self,
        members: &[Schema],
        value: &Value,
        path: &mut Vec<PathSegment>,
    ) -> ParseResult<Value> {
        let mut failures = Vec::new();
        for member in members {
            // Absent members only matter for omitted keys
            if matches!(member, Schema::Absent) {
                continue;
            }
            match self.parse(member, value, path) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => failures.push(e),
            }
        }
        Err(self.fail(path, ParseIssue::Union(failures)))
    }

    fn parse_array(
        &self,
        element: &Schema,
        value: &Value,
        path: &mut Vec<PathSegment>,
    ) -> ParseResult<Value> {
        let items = value
            .as_array()
            .ok_or_else(|| self.mismatch(path, "array", value))?;

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            path.push(PathSegment::Index(i));
            let parsed = self.parse(element, item, path);
            path.pop();
            out.push(parsed?);
        }
        Ok(Value::Array(out))
    }

    fn parse_struct(
        &self,
        schema: &StructSchema,
        value: &Value,
        path: &mut Vec<PathSegment>,
    ) -> ParseResult<Value> {
        let obj = value
            .as_object()
            .ok_or_else(|| self.mismatch(path, "object", value))?;

        if self.options.on_excess_property == ExcessProperty::Error {
            if let Some(key) = obj.keys().find(|k| schema.get(k).is_none()) {
                path.push(PathSegment::Key(key.clone()));
                let err = self.fail(path, ParseIssue::Unexpected);
                path.pop();
                return Err(err);
            }
        }

        let mut out = Map::new();
        for field in schema.fields() {
            path.push(PathSegment::Key(field.name.clone()));
            let parsed = self.parse_field(&field.kind, field.optional, obj.get(&field.name), path);
            path.pop();
            if let Some(parsed) = parsed? {
                out.insert(field.name.clone(), parsed);
            }
        }
        Ok(Value::Object(out))
    }

    /// Returns `None` when the field is legitimately omitted
    fn parse_field(
        &self,
        kind: &FieldKind,
        optional: bool,
        value: Option<&Value>,
        path: &mut Vec<PathSegment>,
    ) -> ParseResult<Option<Value>> {
        let schema = match kind {
            FieldKind::Plain(schema) => schema,
            FieldKind::Projected(_) => {
                return Err(self.fail(
                    path,
                    ParseIssue::Forbidden(
                        "column projection must be resolved for select, insert or update first"
                            .to_string(),
                    ),
                ));
            }
        };

        let omittable = optional || schema.admits_absent();
        let value = match value {
            Some(Value::Null)
                if self.options.null_as_absent && omittable && !schema.accepts_null() =>
            {
                None
            }
            other => other,
        };

        match value {
            Some(v) => self.parse(schema, v, path).map(Some),
            None if omittable => Ok(None),
            None => Err(self.fail(path, ParseIssue::Missing)),
        }
    }

    fn parse_transform(
        &self,
        transform: &Transform,
        value: &Value,
        path: &mut Vec<PathSegment>,
    ) -> ParseResult<Value> {
        let (first, last) = match self.direction {
            Direction::Decode => (&transform.from, &transform.to),
            Direction::Encode => (&transform.to, &transform.from),
        };

        let validated = self.parse(first, value, path)?;
        let converted = match self.direction {
            Direction::Decode => transform.transformation.decode(&validated),
            Direction::Encode => transform.transformation.encode(&validated),
        }
        .map_err(|message| {
            self.fail(
                path,
                ParseIssue::Transformation {
                    name: transform.name().to_string(),
                    message,
                },
            )
        })?;
        self.parse(last, &converted, path)
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
