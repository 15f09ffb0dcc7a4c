//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with one of two event formats, both
//! of which stamp every line with the request id in scope (or `-` outside
//! a request):
//!
//! - [`PlainFormat`]: `2024-05-01T12:00:00.000Z  INFO target [id] message k=v`
//! - [`JsonFormat`]: one JSON object per line, fields nested under `fields`
//!
//! Format is auto-detected from the profile and terminal but can be forced
//! via `--json` or `--pretty`.
//!
//! Some events fire after the request's task-local binding has ended, such
//! as `TraceLayer` end-of-stream events emitted while the body streams.
//! [`SpanRequestIds`] copies the `request_id` field of the `request` span
//! into span extensions so those lines still carry the id.

use std::fmt;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;
use crate::config::Profile;
use crate::middleware::request_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool, profile: Profile) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty {
        LogFormat::Pretty
    } else if profile == Profile::Production {
        LogFormat::Json
    } else if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let tracing_level = level.to_tracing_level();
    let filter = tracing_subscriber::filter::Targets::new().with_default(tracing_level);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().event_format(JsonFormat))
                .with(SpanRequestIds)
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().event_format(PlainFormat))
                .with(SpanRequestIds)
                .init();
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Records each span's `request_id` field in its extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanRequestIds;

struct SpanRequestId(String);

impl<S> Layer<S> for SpanRequestIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = RequestIdField::default();
        attrs.record(&mut visitor);
        if let (Some(value), Some(span)) = (visitor.0, ctx.span(id)) {
            span.extensions_mut().insert(SpanRequestId(value));
        }
    }
}

#[derive(Default)]
struct RequestIdField(Option<String>);

impl Visit for RequestIdField {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "request_id" {
            self.0 = Some(value.to_owned());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "request_id" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

/// The id bound to the running request, else the one recorded on the
/// nearest enclosing span, else [`request_id::PLACEHOLDER`].
fn event_request_id<S, N>(ctx: &FmtContext<'_, S, N>) -> String
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    if let Some(id) = request_id::current() {
        return id.to_string();
    }
    ctx.event_scope()
        .and_then(|mut scope| {
            scope.find_map(|span| {
                let extensions = span.extensions();
                extensions.get::<SpanRequestId>().map(|id| id.0.clone())
            })
        })
        .unwrap_or_else(|| request_id::PLACEHOLDER.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormat;

impl<S, N> FormatEvent<S, N> for PlainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} {:>5} {} [{}] ",
            timestamp(),
            meta.level(),
            meta.target(),
            event_request_id(ctx)
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = JsonFields::default();
        event.record(&mut fields);

        let mut record = Map::new();
        record.insert("timestamp".into(), Value::String(timestamp()));
        record.insert("level".into(), Value::String(meta.level().to_string()));
        record.insert("target".into(), Value::String(meta.target().to_string()));
        record.insert(
            "request_id".into(),
            Value::String(event_request_id(ctx)),
        );
        record.insert("fields".into(), Value::Object(fields.0));

        writeln!(writer, "{}", Value::Object(record))
    }
}

#[derive(Default)]
struct JsonFields(Map<String, Value>);

impl Visit for JsonFields {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0
            .insert(field.name().into(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0
            .insert(field.name().into(), Value::String(format!("{value:?}")));
    }
}
