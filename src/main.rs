use std::process::ExitCode;
use std::sync::Arc;

use perf_recorder::config::{config_schema, load_config};
use perf_recorder::startup;
use perf_recorder::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| arg == "--schema") {
        return match config_schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("Failed to generate config schema: {}", err);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("Failed to initialise logging: {}", err);
        return ExitCode::FAILURE;
    }

    match startup::run(Arc::new(config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Dashboard exited with error: {}", err);
            ExitCode::FAILURE
        }
    }
}
