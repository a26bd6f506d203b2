use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use roomba_core::DashConfig;

/// Load the dashboard configuration from a JSON file.
///
/// A missing file falls back to defaults. A file that exists but cannot be
/// parsed or fails validation is an error, so a typo never silently reverts
/// the operator's settings.
pub fn load_or_default(path: Option<&Path>) -> Result<DashConfig> {
    let Some(path) = path else {
        log::debug!("No config file given, using defaults");
        return Ok(DashConfig::default());
    };

    if !path.exists() {
        log::warn!("Config file {} not found, using defaults", path.display());
        return Ok(DashConfig::default());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: DashConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    config.validate()?;

    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn save(config: &DashConfig, path: &Path) -> Result<()> {
    config.validate()?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).with_context(|| format!("writing config file {}", path.display()))?;
    log::info!("Configuration saved to {}", path.display());
    Ok(())
}
