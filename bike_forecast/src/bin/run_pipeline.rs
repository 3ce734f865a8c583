//! Batch entry point: load the configuration and run the pipeline once.

use bike_forecast::config::PipelineConfig;
use bike_forecast::pipeline::run_pipeline;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/pipeline.yaml".to_string());

    let config = match PipelineConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, config = %config_path, "could not load configuration");
            return ExitCode::FAILURE;
        }
    };

    match run_pipeline(&config) {
        Ok(report) => {
            info!(
                stock_rows = report.stock_rows,
                forecast_rows = report.forecast_rows,
                modeled = report.modeled,
                skipped = report.skipped,
                failed = report.failed,
                "pipeline run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "pipeline run aborted");
            ExitCode::FAILURE
        }
    }
}
