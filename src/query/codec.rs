//! Codec Pipeline
//!
//! Wraps an asynchronous data store operation so that:
//! - caller input is encoded to its wire form before the operation runs
//! - the operation's wire result is decoded to its domain form afterwards
//! - every failure settles as a `DatabaseError`
//!
//! Order within one run: encode → execute → decode, stopping at the first
//! failure. The operation runs at most once per run and never when encoding
//! fails. Wrappers hold no per-run state; `run` builds a fresh lazy future
//! each time.

use std::future::Future;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::observability::{log_event, Event, Logger};
use crate::schema::{Direction, ParseError, ParseOptions, Schema};

use super::errors::{DatabaseError, DatabaseResult, Rejection};

/// Encode caller input, then run the operation; the raw result is returned as is
pub fn with_encoder<I, F>(encoder: Schema, query: F) -> WithEncoder<I, F> {
    WithEncoder {
        encoder,
        query,
        options: ParseOptions::default(),
        _input: PhantomData,
    }
}

/// Run the operation without input, then decode its result
pub fn with_decoder<O, F>(decoder: Schema, query: F) -> WithDecoder<O, F> {
    WithDecoder {
        decoder,
        query,
        options: ParseOptions::default(),
        _output: PhantomData,
    }
}

/// Encode caller input, run the operation, decode its result
pub fn with_codec<I, O, F>(encoder: Schema, decoder: Schema, query: F) -> WithCodec<I, O, F> {
    WithCodec {
        encoder,
        decoder,
        query,
        options: ParseOptions::default(),
        _types: PhantomData,
    }
}

/// Pipeline template produced by [`with_encoder`]
pub struct WithEncoder<I, F> {
    encoder: Schema,
    query: F,
    options: ParseOptions,
    _input: PhantomData<fn(I)>,
}

impl<I, F> WithEncoder<I, F> {
    /// Override the parse options
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Take the parse options from a config
    pub fn with_config(self, config: &CodecConfig) -> Self {
        self.with_options(config.parse)
    }

    pub fn encoder(&self) -> &Schema {
        &self.encoder
    }

    /// Encode `input` and run the operation with the wire value
    pub async fn run<Fut, R, E>(&self, input: I) -> DatabaseResult<R>
    where
        I: Serialize,
        F: Fn(Value) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Into<Rejection>,
    {
        let encoded = encode_input(&self.encoder, &input, &self.options)?;
        execute((self.query)(encoded)).await
    }
}

/// Pipeline template produced by [`with_decoder`]
pub struct WithDecoder<O, F> {
    decoder: Schema,
    query: F,
    options: ParseOptions,
    _output: PhantomData<fn() -> O>,
}

impl<O, F> WithDecoder<O, F> {
    /// Override the parse options
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Take the parse options from a config
    pub fn with_config(self, config: &CodecConfig) -> Self {
        self.with_options(config.parse)
    }

    pub fn decoder(&self) -> &Schema {
        &self.decoder
    }

    /// Run the operation and decode its result
    pub async fn run<Fut, R, E>(&self) -> DatabaseResult<O>
    where
        O: DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: Serialize,
        E: Into<Rejection>,
    {
        let raw = execute((self.query)()).await?;
        decode_output(&self.decoder, raw, &self.options)
    }
}

/// Pipeline template produced by [`with_codec`]
pub struct WithCodec<I, O, F> {
    encoder: Schema,
    decoder: Schema,
    query: F,
    options: ParseOptions,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> WithCodec<I, O, F> {
    /// Override the parse options
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Take the parse options from a config
    pub fn with_config(self, config: &CodecConfig) -> Self {
        self.with_options(config.parse)
    }

    pub fn encoder(&self) -> &Schema {
        &self.encoder
    }

    pub fn decoder(&self) -> &Schema {
        &self.decoder
    }

    /// Encode `input`, run the operation, decode its result
    pub async fn run<Fut, R, E>(&self, input: I) -> DatabaseResult<O>
    where
        I: Serialize,
        O: DeserializeOwned,
        F: Fn(Value) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: Serialize,
        E: Into<Rejection>,
    {
        let encoded = encode_input(&self.encoder, &input, &self.options)?;
        let raw = execute((self.query)(encoded)).await?;
        decode_output(&self.decoder, raw, &self.options)
    }
}

/// Domain input to wire value
fn encode_input<I: Serialize>(
    schema: &Schema,
    input: &I,
    options: &ParseOptions,
) -> DatabaseResult<Value> {
    serde_json::to_value(input)
        .map_err(|e| ParseError::serialization(Direction::Encode, e))
        .and_then(|domain| schema.encode_with(&domain, options))
        .map_err(|e| failed(Event::QueryEncodeFailed, DatabaseError::QueryParse(e)))
}

/// Await the operation and classify its failure
async fn execute<Fut, R, E>(query: Fut) -> DatabaseResult<R>
where
    Fut: Future<Output = Result<R, E>>,
    E: Into<Rejection>,
{
    query
        .await
        .map_err(|e| failed(Event::QueryExecuteFailed, e.into().classify()))
}

/// Wire result to domain output
fn decode_output<R: Serialize, O: DeserializeOwned>(
    schema: &Schema,
    raw: R,
    options: &ParseOptions,
) -> DatabaseResult<O> {
    serde_json::to_value(raw)
        .map_err(|e| ParseError::serialization(Direction::Decode, e))
        .and_then(|wire| schema.decode_with(&wire, options))
        .and_then(|domain| {
            serde_json::from_value(domain)
                .map_err(|e| ParseError::serialization(Direction::Decode, e))
        })
        .map_err(|e| failed(Event::QueryDecodeFailed, DatabaseError::QueryParse(e)))
}

/// Trace the failure when TRACE is enabled; the error is returned as is
fn failed(event: Event, err: DatabaseError) -> DatabaseError {
    if Logger::enabled(event.severity()) {
        let detail = err.to_string();
        log_event(event, &[("error", err.tag()), ("detail", detail.as_str())]);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::errors::NoResultError;
    use crate::schema::{ParseIssue, StructSchema};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Serialize)]
    struct NewTodo {
        content: String,
        completed: bool,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inserted {
        id: i64,
    }

    fn todo_insert() -> Schema {
        StructSchema::new()
            .field("content", Schema::string())
            .field("completed", Schema::boolean_from_number())
            .into()
    }

    fn id_row() -> Schema {
        StructSchema::new().field("id", Schema::int()).into()
    }

    #[tokio::test]
    async fn test_encoder_passes_wire_value() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&seen);
        let insert = with_encoder(todo_insert(), move |wire: Value| {
            *sink.lock().unwrap() = Some(wire);
            async { Ok::<_, NoResultError>(3u64) }
        });

        let rows = insert
            .run(NewTodo {
                content: "write tests".into(),
                completed: true,
            })
            .await
            .unwrap();

        assert_eq!(rows, 3);
        assert_eq!(
            seen.lock().unwrap().take(),
            Some(json!({ "content": "write tests", "completed": 1 }))
        );
    }

    #[tokio::test]
    async fn test_encode_failure_skips_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let insert = with_encoder(todo_insert(), move |_wire: Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, NoResultError>(()) }
        });

        let err = insert.run(json!({ "content": 5, "completed": true })).await.unwrap_err();

        assert!(err.is_query_parse());
        assert_eq!(err.parse_error().unwrap().direction(), Direction::Encode);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_decoder() {
        let select = with_decoder::<Inserted, _>(id_row(), || async {
            Ok::<_, NoResultError>(json!({ "id": 9, "ignored": true }))
        });
        assert_eq!(select.run().await.unwrap(), Inserted { id: 9 });
    }

    #[tokio::test]
    async fn test_decoder_missing_field() {
        let select = with_decoder::<Inserted, _>(id_row(), || async {
            Ok::<_, NoResultError>(json!({}))
        });
        let err = select.run().await.unwrap_err();
        let parse = err.parse_error().unwrap();
        assert_eq!(parse.issue(), &ParseIssue::Missing);
        assert_eq!(parse.direction(), Direction::Decode);
    }

    #[tokio::test]
    async fn test_codec_round_trip() {
        let insert = with_codec::<NewTodo, Inserted, _>(todo_insert(), id_row(), |wire: Value| async move {
            assert_eq!(wire["completed"], json!(0));
            Ok::<_, NoResultError>(json!({ "id": 1 }))
        });

        let inserted = insert
            .run(NewTodo {
                content: "c".into(),
                completed: false,
            })
            .await
            .unwrap();
        assert_eq!(inserted, Inserted { id: 1 });
    }

    #[tokio::test]
    async fn test_no_result_is_not_found() {
        let select = with_decoder::<Inserted, _>(id_row(), || async {
            Err::<Value, _>(NoResultError)
        });
        assert_eq!(select.run().await.unwrap_err(), DatabaseError::NotFound);
    }

    #[tokio::test]
    async fn test_rejection_message_is_query_error() {
        let insert = with_encoder(todo_insert(), |_wire: Value| async {
            Err::<(), _>(Rejection::message("UNIQUE constraint failed"))
        });
        let err = insert
            .run(NewTodo {
                content: "c".into(),
                completed: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err, DatabaseError::query("UNIQUE constraint failed"));
    }

    #[tokio::test]
    async fn test_domain_type_mismatch_is_parse_error() {
        #[derive(Debug, Deserialize)]
        struct Wrong {
            #[allow(dead_code)]
            id: String,
        }

        let select = with_decoder::<Wrong, _>(id_row(), || async {
            Ok::<_, NoResultError>(json!({ "id": 1 }))
        });
        let err = select.run().await.unwrap_err();
        assert!(matches!(
            err.parse_error().unwrap().issue(),
            ParseIssue::Serialization(_)
        ));
    }

    #[tokio::test]
    async fn test_strict_options_apply() {
        let insert = with_encoder(todo_insert(), |_wire: Value| async {
            Ok::<_, NoResultError>(())
        })
        .with_options(ParseOptions::strict());

        let err = insert
            .run(json!({ "content": "c", "completed": true, "extra": 1 }))
            .await
            .unwrap_err();
        assert_eq!(err.parse_error().unwrap().issue(), &ParseIssue::Unexpected);
    }

    #[test]
    fn test_failed_returns_error_unchanged() {
        assert!(!Logger::enabled(Event::QueryExecuteFailed.severity()));
        let err = DatabaseError::query("UNIQUE constraint failed");
        assert_eq!(failed(Event::QueryExecuteFailed, err.clone()), err);
    }

    #[test]
    fn test_construction_runs_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let insert = with_encoder(todo_insert(), move |_wire: Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, NoResultError>(()) }
        });

        let pending = insert.run(json!({ "content": "c", "completed": true }));
        drop(pending);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
