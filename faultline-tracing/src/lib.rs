#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Tracing integration for faultline errors.
//!
//! This crate connects faultline with the [`tracing`] ecosystem in both
//! directions:
//!
//! - Span fields become error metadata. The [`span`] decorator attaches the
//!   fields of the spans active at the wrap site as key/value metadata, so
//!   that an error remembers which request or user it was created for.
//! - Errors become structured events. [`emit`] and [`emit_error`] log one
//!   event carrying the error's message, tag, metadata and flattened trace.
//!
//! # How It Works
//!
//! You add [`FaultlineLayer`] to your tracing subscriber alongside your
//! existing layers. It records the field values of every span in the span's
//! extensions, where the [`span`] decorator can read them back later.
//!
//! # Quick Start
//!
//! ```
//! use faultline::{Fault, ResultExt, values};
//! use faultline_tracing::{FaultlineLayer, SpanExt};
//! use tracing_subscriber::{Registry, layer::SubscriberExt};
//!
//! // 1. Set up tracing with FaultlineLayer (required)
//! let subscriber = Registry::default()
//!     .with(FaultlineLayer) // Captures span field values for errors
//!     .with(tracing_subscriber::fmt::layer()); // Your normal console output
//! tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");
//!
//! // 2. Wrap errors with the span decorator
//! #[tracing::instrument(fields(user_id = 42))]
//! fn load_profile() -> Result<(), Fault> {
//!     Err(Fault::new("profile not found")).wrap_span()
//! }
//!
//! let err = load_profile().unwrap_err();
//! assert_eq!(values::get(&err)["user_id"], "42");
//!
//! // 3. Log the error as one structured event
//! faultline_tracing::emit_error(&err);
//! ```
//!
//! # Environment Variables
//!
//! - `FAULTLINE_TRACING` - Comma-separated options:
//!   - `current` - Only capture the fields of the innermost span, not of its
//!     parents

use std::{fmt, sync::OnceLock};

use faultline::{
    BoxError, Decorator, ErrorInfo, Fault, flatten, msg, tag,
    values::{self, Values},
};
use tracing::{
    Level, Span,
    field::{Field, Visit},
};
use tracing_subscriber::registry::LookupSpan;

/// The key under which [`span`] records the names of the captured spans.
pub const SPANS_KEY: &str = "spans";

/// Captured field values for a span.
#[derive(Clone, Debug, Default)]
struct CapturedFields(Vec<(&'static str, String)>);

impl CapturedFields {
    fn set(&mut self, name: &'static str, value: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }
}

impl Visit for CapturedFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field.name(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field.name(), format!("{value:?}"));
    }
}

/// A tracing layer that captures span field values for faultline errors.
///
/// **Required for faultline-tracing.** Add this to your subscriber alongside
/// your other layers. It captures the fields a span is created with as well as
/// fields recorded later with [`Span::record`], without affecting your other
/// layers.
///
/// # Examples
///
/// ```
/// use faultline_tracing::FaultlineLayer;
/// use tracing_subscriber::{Registry, layer::SubscriberExt};
///
/// let subscriber = Registry::default()
///     .with(FaultlineLayer) // Captures span data for errors
///     .with(tracing_subscriber::fmt::layer()); // Example: console output
///
/// tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct FaultlineLayer;

impl<S> tracing_subscriber::Layer<S> for FaultlineLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = CapturedFields::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<CapturedFields>() {
            Some(fields) => values.record(fields),
            None => {
                let mut fields = CapturedFields::default();
                values.record(&mut fields);
                extensions.insert(fields);
            }
        }
    }
}

#[derive(Debug)]
struct FaultlineTracingEnvOptions {
    current_span_only: bool,
}

impl FaultlineTracingEnvOptions {
    fn get() -> &'static Self {
        static FAULTLINE_TRACING_FLAGS: OnceLock<FaultlineTracingEnvOptions> = OnceLock::new();

        FAULTLINE_TRACING_FLAGS.get_or_init(|| {
            let mut current_span_only = false;

            if let Some(var) = std::env::var_os("FAULTLINE_TRACING") {
                for v in var.to_string_lossy().split(',') {
                    if v.trim().eq_ignore_ascii_case("current") {
                        current_span_only = true;
                    }
                }
            }

            FaultlineTracingEnvOptions { current_span_only }
        })
    }
}

/// Captures the fields of the active spans as error metadata.
///
/// # Examples
///
/// Capture only the innermost span, regardless of the environment:
///
/// ```
/// use faultline_tracing::SpanCapture;
///
/// let capture = SpanCapture {
///     capture_parent_spans: false,
/// };
/// let err = faultline::wrap("timed out", [capture.decorator()]);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct SpanCapture {
    /// Whether to capture the fields of every span in the current scope, or
    /// only of the innermost one.
    ///
    /// When a field appears in several spans, the innermost value wins.
    pub capture_parent_spans: bool,
}

impl SpanCapture {
    /// Creates a new [`SpanCapture`] with default settings.
    ///
    /// Configuration is controlled by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FAULTLINE_TRACING` - Comma-separated options:
    ///   - `current` - Only capture the fields of the innermost span
    pub fn new() -> Self {
        let env_options = FaultlineTracingEnvOptions::get();
        Self {
            capture_parent_spans: !env_options.current_span_only,
        }
    }

    /// The fields of the current span scope.
    ///
    /// Field values are recorded as strings. The names of the captured spans
    /// are listed under [`SPANS_KEY`], outermost first. Only spans recorded
    /// by a [`FaultlineLayer`] are captured, so this returns an empty map
    /// when there is no current span or the subscriber has no
    /// [`FaultlineLayer`].
    pub fn capture(&self) -> Values {
        Span::current()
            .with_subscriber(|(id, dispatch)| {
                let registry = dispatch.downcast_ref::<tracing_subscriber::Registry>()?;
                let span_ref = registry.span(id)?;

                let mut values = Values::default();
                let mut names = Vec::new();
                let scope = span_ref
                    .scope()
                    .take(if self.capture_parent_spans { usize::MAX } else { 1 });

                for span in scope {
                    let extensions = span.extensions();
                    let Some(fields) = extensions.get::<CapturedFields>() else {
                        continue;
                    };
                    names.push(serde_json::Value::from(span.name()));
                    for (name, value) in &fields.0 {
                        values
                            .entry((*name).to_owned())
                            .or_insert_with(|| serde_json::Value::from(value.as_str()));
                    }
                }

                // No span in scope was seen by a `FaultlineLayer`.
                if names.is_empty() {
                    return None;
                }

                names.reverse();
                values
                    .entry(SPANS_KEY.to_owned())
                    .or_insert(serde_json::Value::Array(names));
                Some(values)
            })
            .flatten()
            .unwrap_or_default()
    }

    /// A decorator attaching the fields of the current span scope.
    ///
    /// The fields are captured when this method is called.
    pub fn decorator(&self) -> Decorator {
        values::with(self.capture())
    }
}

impl Default for SpanCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// A decorator attaching the fields of the active spans as key/value
/// metadata.
///
/// Shorthand for `SpanCapture::new().decorator()`.
///
/// # Examples
///
/// ```
/// use faultline::Fault;
///
/// #[tracing::instrument(fields(order_id = 7))]
/// fn ship() -> Fault {
///     faultline::wrap(Fault::new("carrier unavailable"), [faultline_tracing::span()])
/// }
///
/// let err = ship();
/// ```
pub fn span() -> Decorator {
    SpanCapture::new().decorator()
}

/// Extension trait for wrapping errors with the fields of the active spans.
///
/// # Examples
///
/// ```
/// use faultline::Fault;
/// use faultline_tracing::SpanExt;
///
/// #[tracing::instrument]
/// fn might_fail() -> Result<(), Fault> {
///     Err(std::io::Error::other("disk full")).wrap_span()
/// }
///
/// let result = might_fail();
/// ```
pub trait SpanExt<V> {
    /// Wraps the error with the [`span`] decorator, recording the caller's
    /// location. `Ok` values pass through untouched.
    #[track_caller]
    fn wrap_span(self) -> Result<V, Fault>;
}

impl<V, E> SpanExt<V> for Result<V, E>
where
    E: Into<BoxError>,
{
    #[inline(always)]
    fn wrap_span(self) -> Result<V, Fault> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(faultline::wrap(e, [span()])),
        }
    }
}

macro_rules! event_at {
    ($level:expr, $err:expr) => {{
        let err = $err;
        let info = ErrorInfo::new(err);
        let tag = tag::get(err).map(faultline::Tag::as_str);
        let user_message = msg::user_message(err);
        let values = serde_json::to_string(&info.values).unwrap_or_default();
        let trace = flatten(err);
        tracing::event!(
            target: "faultline",
            $level,
            error.tag = tag,
            error.values = %values,
            error.user_message = %user_message,
            error.trace = %trace,
            "{}",
            info.message,
        );
    }};
}

/// Logs an error as a single structured [`tracing`] event.
///
/// The event message is the error's message chain. The event carries the
/// following fields:
///
/// - `error.tag`: the most recent [`Tag`](faultline::Tag), if any
/// - `error.values`: the merged key/value metadata, as JSON
/// - `error.user_message`: the joined end-user messages
/// - `error.trace`: the flattened chain, one step per line
///
/// # Examples
///
/// ```
/// use faultline::{Fault, msg};
///
/// let err = faultline::wrap(Fault::new("db error"), [msg::with("failed to get user")]);
/// faultline_tracing::emit(tracing::Level::WARN, &err);
/// ```
pub fn emit(level: Level, err: &(dyn std::error::Error + 'static)) {
    match level {
        Level::TRACE => event_at!(Level::TRACE, err),
        Level::DEBUG => event_at!(Level::DEBUG, err),
        Level::INFO => event_at!(Level::INFO, err),
        Level::WARN => event_at!(Level::WARN, err),
        _ => event_at!(Level::ERROR, err),
    }
}

/// Logs an error as a single structured event at [`Level::ERROR`].
///
/// See [`emit`] for the recorded fields.
pub fn emit_error(err: &(dyn std::error::Error + 'static)) {
    emit(Level::ERROR, err);
}
