pub mod actions;
pub mod analytics;
pub mod cache;
pub mod circuit_breaker;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod genai;
pub mod habits;
pub mod logging;
pub mod metrics;
pub mod planner;
pub mod sleep;
pub mod state;
pub mod store;
pub mod wellness;

use std::process::ExitCode;
use clap::Parser;

pub fn run() -> ExitCode {
    // Initialize structured logging first
    logging::init_logging();
    let cli = cli::Cli::parse();

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            let err = error::SynaptiqError::new(format!("Failed to create async runtime: {}", e), "startup");
            tracing::error!(error = %err, "Startup failed");
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let config = config::get_config();
    let state = state::AppState::from_config();

    match rt.block_on(cli::execute(cli, &state, config)) {
        Ok(()) => {
            tracing::debug!(metrics = ?state.metrics.snapshot(), "Command finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            state.metrics.record_error();
            tracing::error!(stage = %e.stage, error = %e, "Command failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
