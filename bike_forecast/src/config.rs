//! Run configuration for the batch pipeline.

use crate::error::{PipelineError, Result};
use crate::models::arima::{FitOptions, ModelOrder};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

/// Immutable configuration for one pipeline run, passed by reference into
/// each component's entry point
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub tables: TableConfig,
    pub stock: StockConfig,
    pub model: ModelConfig,
    pub horizon: HorizonConfig,
}

/// Locations of the input and output tables
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Hourly flow counts per station
    pub trips: String,
    /// Station metadata
    pub stations: String,
    /// Derived stock output
    pub stock: String,
    /// Forecasts joined with metadata, ordered for presentation
    pub predictions: String,
    /// Per-station holdout scores
    pub scores: String,
}

/// Stock derivation options
#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    /// Fraction of capacity restored by overnight rebalancing
    #[serde(default = "default_rebalancing_proportion")]
    pub rebalancing_proportion: f64,
}

fn default_rebalancing_proportion() -> f64 {
    0.65
}

/// Model options
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Fixed (p, d, q) order fitted for every station
    pub order: ModelOrder,
    /// Engine hyperparameters, passed through opaquely
    #[serde(default)]
    pub fit: FitOptions,
}

/// Forecast horizon, hourly cadence, inclusive start and exclusive end
#[derive(Debug, Clone, Deserialize)]
pub struct HorizonConfig {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl PipelineConfig {
    /// Load and validate a configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|err| PipelineError::Config(format!("failed to read config file: {}", err)))?;

        let config: PipelineConfig = serde_yaml::from_str(&content)
            .map_err(|err| PipelineError::Config(format!("failed to parse config: {}", err)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.stock.rebalancing_proportion) {
            return Err(PipelineError::Config(format!(
                "rebalancing_proportion must lie in [0, 1], got {}",
                self.stock.rebalancing_proportion
            )));
        }

        if self.horizon.start >= self.horizon.end {
            return Err(PipelineError::Config(
                "horizon start must fall before horizon end".to_string(),
            ));
        }

        if self.model.order.p == 0 && self.model.order.q == 0 {
            return Err(PipelineError::Config(
                "model order needs at least one autoregressive or moving-average lag".to_string(),
            ));
        }

        let tables = [
            ("tables.trips", &self.tables.trips),
            ("tables.stations", &self.tables.stations),
            ("tables.stock", &self.tables.stock),
            ("tables.predictions", &self.tables.predictions),
            ("tables.scores", &self.tables.scores),
        ];
        for (label, value) in tables {
            if value.is_empty() {
                return Err(PipelineError::Config(format!("{} cannot be empty", label)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
tables:
  trips: data/flows.csv
  stations: data/stations.csv
  stock: output/bike_stock.csv
  predictions: output/predictions.csv
  scores: output/station_mapes.csv
stock:
  rebalancing_proportion: 0.65
model:
  order:
    p: 2
    d: 1
    q: 0
horizon:
  start: 2020-07-01T00:00:00
  end: 2020-08-04T00:00:00
"#;

    #[test]
    fn test_parses_valid_config() {
        let config: PipelineConfig = serde_yaml::from_str(VALID).unwrap();
        config.validate().unwrap();

        assert_eq!(config.stock.rebalancing_proportion, 0.65);
        assert_eq!(config.model.order.p, 2);
        assert!(config.model.fit.max_fit_millis.is_none());
    }

    #[test]
    fn test_defaults_rebalancing_proportion() {
        let yaml = VALID.replace("  rebalancing_proportion: 0.65\n", "  {}\n");
        let config: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(config.stock.rebalancing_proportion, 0.65);
    }

    #[test]
    fn test_rejects_out_of_range_proportion() {
        let yaml = VALID.replace("0.65", "1.5");
        let config: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();

        assert!(matches!(
            config.validate(),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_horizon() {
        let yaml = VALID.replace("2020-08-04T00:00:00", "2020-06-01T00:00:00");
        let config: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();

        assert!(matches!(
            config.validate(),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_degenerate_order() {
        let yaml = VALID.replace("    p: 2", "    p: 0");
        let config: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();

        assert!(matches!(
            config.validate(),
            Err(PipelineError::Config(_))
        ));
    }
}
