use std::io;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::env::first_env;

const DEFAULT_SERVICE_NAME: &str = "shroomp-service";
const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// One JSON object per line on stdout, which is what container log collectors expect.
pub fn init_logging_json() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Pick the output format from `LOG_FORMAT` (`json` or anything else for compact).
pub fn init_logging_from_env() {
    match first_env(&["LOG_FORMAT"]).as_deref() {
        Some(f) if f.eq_ignore_ascii_case("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

/// Service name attached to structured events.
/// `K_SERVICE` is set by Cloud Run; `SERVICE_NAME` is the generic override.
pub fn service_name() -> String {
    first_env(&["K_SERVICE", "SERVICE_NAME"]).unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    /// Unrecoverable for the process. Emitted at error level; exiting is up to the caller.
    Fatal,
}

/// Key-value context attached to a structured event.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Sink for structured events raised by request handling.
///
/// Implementations own timestamping, service tagging and emission.
pub trait StructuredLogger: Send + Sync {
    fn log(&self, severity: Severity, message: &str, metadata: Metadata);
}

/// [`StructuredLogger`] that forwards to the active `tracing` subscriber.
#[derive(Clone, Debug)]
pub struct TracingLogger {
    service: String,
}

impl TracingLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    pub fn from_env() -> Self {
        Self::new(service_name())
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl StructuredLogger for TracingLogger {
    fn log(&self, severity: Severity, message: &str, metadata: Metadata) {
        let service = self.service.as_str();
        let metadata = serde_json::Value::Object(metadata);
        match severity {
            Severity::Debug => debug!(service, %metadata, "{message}"),
            Severity::Info => info!(service, %metadata, "{message}"),
            Severity::Warning => warn!(service, %metadata, "{message}"),
            Severity::Error => error!(service, %metadata, "{message}"),
            Severity::Fatal => error!(service, severity = "FATAL", %metadata, "{message}"),
        }
    }
}
