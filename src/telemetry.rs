//! Tracing setup and request-scoped trace ids.
//!
//! The subscriber is installed once at startup. `log::` macros coming out of
//! the SeaORM/sqlx stack are bridged into tracing, and each HTTP request runs
//! inside a task-local [`TraceContext`] so error responses can expose the
//! trace id they were produced under.

use std::future::Future;
use std::sync::OnceLock;

use log::LevelFilter;
use thiserror::Error;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::AppConfig;

/// Correlation data carried for the duration of one request.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static CURRENT: TraceContext;
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("log bridge installation failed: {0}")]
    LogBridge(#[from] log::SetLoggerError),
    #[error("tracing subscriber installation failed: {0}")]
    Subscriber(#[from] TryInitError),
}

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the global tracing subscriber and the `log` bridge.
///
/// Idempotent: repeated calls are no-ops, so tests may build the app as many
/// times as they like. `FORMAPILOT_LOG_LEVEL` provides the default filter and
/// `RUST_LOG` still wins when set; `log_format = "pretty"` swaps the JSON
/// output for a human-readable layout during local work.
pub fn init_tracing(config: &AppConfig) -> Result<(), TelemetryInitError> {
    if INSTALLED.set(()).is_err() {
        return Ok(());
    }

    // The bridge must be in place before the subscriber so no `log::` record
    // is dropped. A logger registered by the host process is left alone.
    if LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init()
        .is_err()
    {
        eprintln!("a logger is already registered, `log::` output keeps its current sink");
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let output = match config.log_format.as_str() {
        "pretty" => fmt::layer().pretty().boxed(),
        _ => fmt::layer().json().boxed(),
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
    {
        eprintln!("a tracing subscriber is already installed, keeping it: {err}");
    }

    Ok(())
}

/// Run `future` with `context` visible through [`current_trace_id`].
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: Future<Output = R>,
{
    CURRENT.scope(context, future).await
}

/// Trace id of the running request, when one is active.
pub fn current_trace_id() -> Option<String> {
    CURRENT.try_with(|ctx| ctx.trace_id.clone()).ok()
}
