//! # Bike Forecast
//!
//! A Rust library that reconstructs hourly per-station bike inventory from
//! flow counts and fits an independent autoregressive forecasting model per
//! station.
//!
//! ## Pipeline
//!
//! - Hourly flow counts join station metadata and become a continuous
//!   stock series per station, seeded each day by an overnight rebalancing
//!   assumption ([`stock::derive_stock`])
//! - Every station with enough positive-inventory history gets its own
//!   fixed-order model: fitted on the full series, scored on a held-out
//!   tail, and forecast over the configured horizon
//!   ([`trainer::train_and_forecast`])
//! - Forecasts rejoin station metadata and are ordered for presentation
//!   ([`assemble::assemble`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use bike_forecast::config::PipelineConfig;
//! use bike_forecast::pipeline::run_pipeline;
//!
//! # fn main() -> bike_forecast::Result<()> {
//! let config = PipelineConfig::load("config/pipeline.yaml")?;
//! let report = run_pipeline(&config)?;
//! println!(
//!     "modeled {} stations, skipped {}",
//!     report.modeled, report.skipped
//! );
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod stock;
pub mod store;
pub mod trainer;

// Re-export commonly used types
pub use crate::error::{PipelineError, Result};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::pipeline::{run_pipeline, PipelineReport};
pub use crate::stock::derive_stock;
pub use crate::trainer::train_and_forecast;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
