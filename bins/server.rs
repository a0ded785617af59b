use common::utils::logging::{Metadata, Severity, StructuredLogger, TracingLogger};
use dotenvy::dotenv;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // load .env first so RUST_LOG and LOG_FORMAT take effect
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "shroomp", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    let logger = TracingLogger::from_env();
    std::panic::set_hook(Box::new(move |info| {
        let mut meta = Metadata::new();
        meta.insert("event".into(), json!("panic"));
        meta.insert("service_id".into(), json!(service_id.to_string()));
        meta.insert("pid".into(), json!(pid));
        meta.insert("panic".into(), json!(info.to_string()));
        logger.log(Severity::Fatal, "unhandled panic occurred", meta);
    }));

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "shroomp", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    let worker_threads = cfg.server.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "shroomp", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "shroomp",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        data_file = %cfg.storage.data_file.display(),
        "sighting service starting"
    );

    // server::run returns once Ctrl+C has drained in-flight requests
    rt.block_on(async move {
        match server::run(cfg).await {
            Ok(()) => {
                info!(service = "shroomp", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "shroomp", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
