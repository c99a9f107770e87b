//! Wire/domain transformations
//!
//! A `Transformation` converts an already-validated wire value into its domain
//! form and back. Failures are plain messages; the parser attaches the path.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

/// Bidirectional conversion between a wire value and a domain value
pub trait Transformation: Send + Sync {
    /// Name used in error messages
    fn name(&self) -> &str;

    /// Wire to domain
    fn decode(&self, wire: &Value) -> Result<Value, String>;

    /// Domain to wire
    fn encode(&self, domain: &Value) -> Result<Value, String>;
}

/// Closure-backed transformation
pub struct FnTransformation<D, E> {
    name: String,
    decode: D,
    encode: E,
}

impl<D, E> FnTransformation<D, E>
where
    D: Fn(&Value) -> Result<Value, String> + Send + Sync,
    E: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, decode: D, encode: E) -> Self {
        Self {
            name: name.into(),
            decode,
            encode,
        }
    }
}

impl<D, E> Transformation for FnTransformation<D, E>
where
    D: Fn(&Value) -> Result<Value, String> + Send + Sync,
    E: Fn(&Value) -> Result<Value, String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, wire: &Value) -> Result<Value, String> {
        (self.decode)(wire)
    }

    fn encode(&self, domain: &Value) -> Result<Value, String> {
        (self.encode)(domain)
    }
}

/// Numeric text on the wire, a number in the domain
pub struct NumberFromString;

impl Transformation for NumberFromString {
    fn name(&self) -> &str {
        "NumberFromString"
    }

    fn decode(&self, wire: &Value) -> Result<Value, String> {
        let text = wire
            .as_str()
            .ok_or_else(|| "expected numeric text".to_string())?
            .trim();

        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::from(i));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Ok(Value::from(u));
        }

        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{}' is not a finite number", text))
    }

    fn encode(&self, domain: &Value) -> Result<Value, String> {
        match domain {
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err("expected a number".to_string()),
        }
    }
}

/// `1`/`0` on the wire, a boolean in the domain.
///
/// Any number other than `1` decodes to `false`.
pub struct BooleanFromNumber;

impl Transformation for BooleanFromNumber {
    fn name(&self) -> &str {
        "BooleanFromNumber"
    }

    fn decode(&self, wire: &Value) -> Result<Value, String> {
        let n = wire
            .as_f64()
            .ok_or_else(|| "expected a number".to_string())?;
        Ok(Value::Bool(n == 1.0))
    }

    fn encode(&self, domain: &Value) -> Result<Value, String> {
        match domain {
            Value::Bool(true) => Ok(Value::from(1)),
            Value::Bool(false) => Ok(Value::from(0)),
            _ => Err("expected a boolean".to_string()),
        }
    }
}

/// Timestamp text on the wire, an RFC 3339 UTC timestamp in the domain.
///
/// Decoding accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` layout
/// (`YYYY-MM-DD HH:MM:SS`, read as UTC). Output is always millisecond RFC 3339
/// with a `Z` suffix.
///
/// Encoding accepts any RFC 3339 instant and canonicalizes it, so
/// `decode(encode(v)) == v` holds for canonical domain text (everything
/// `decode` produces); other spellings of the same instant come back in
/// canonical form.
pub struct DateFromString;

const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f";

impl DateFromString {
    fn parse(text: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(text, SQLITE_TIMESTAMP)
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("'{}' is not a timestamp: {}", text, e))
    }

    fn render(dt: DateTime<Utc>) -> Value {
        Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Transformation for DateFromString {
    fn name(&self) -> &str {
        "DateFromString"
    }

    fn decode(&self, wire: &Value) -> Result<Value, String> {
        let text = wire
            .as_str()
            .ok_or_else(|| "expected timestamp text".to_string())?;
        Self::parse(text).map(Self::render)
    }

    fn encode(&self, domain: &Value) -> Result<Value, String> {
        let text = domain
            .as_str()
            .ok_or_else(|| "expected an RFC 3339 timestamp".to_string())?;
        Self::parse(text).map(Self::render)
    }
}
