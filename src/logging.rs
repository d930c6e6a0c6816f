use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize structured logging with tracing.
/// JSON lines go to stderr so stdout stays clean for command output.
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::fmt;
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
            );

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("[Logging] Failed to set global tracing subscriber: {}", e);
            return;
        }

        tracing::info!("Structured logging initialized");
    });
}

/// Log a model call outcome with latency.
pub fn log_model_call(model: &str, stage: &str, success: bool, latency_ms: u64) {
    tracing::info!(
        model = model,
        stage = stage,
        success = success,
        latency_ms = latency_ms,
        "Model call"
    );
}

pub fn log_timeout(model: &str, duration_secs: u64) {
    tracing::error!(model = model, duration_secs = duration_secs, "Timeout exceeded");
}
