//! YAML forecast configuration loading

use std::path::Path;

use color_eyre::eyre::{WrapErr, eyre};
use seatcast_core::{ForecastConfig, ForecastInput};

/// Default config file name, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "forecast.yaml";

/// Parse and validate a YAML forecast configuration.
pub fn parse_config_yaml(yaml: &str) -> color_eyre::Result<ForecastConfig> {
    let input: ForecastInput = serde_saphyr::from_str(yaml)
        .map_err(|e| eyre!("Failed to parse forecast config: {e}"))?;
    let config = ForecastConfig::try_from(input).wrap_err("Invalid forecast config")?;
    Ok(config)
}

/// Load, parse and validate the forecast configuration at `path`.
pub fn load_config(path: &Path) -> color_eyre::Result<ForecastConfig> {
    let yaml = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    let config = parse_config_yaml(&yaml)
        .wrap_err_with(|| format!("Failed to load config file {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        lists = config.lists().len(),
        seats = config.seats(),
        sims = config.sims(),
        "Loaded forecast config"
    );
    Ok(config)
}
