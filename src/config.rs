//! Dashboard configuration, read from an optional JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one dashboard session. Keys missing from the file keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    /// Manufacturers with fewer listings are hidden unless asked for.
    pub small_manufacturer_threshold: usize,
    pub histogram_bins: usize,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("vehicles_us.csv"),
            small_manufacturer_threshold: 1000,
            histogram_bins: 40,
            export_width: 1200,
            export_height: 800,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = DashboardConfig::from_json(r#"{ "csv_path": "data/cars.csv", "histogram_bins": 25 }"#).unwrap();
        assert_eq!(config.csv_path, PathBuf::from("data/cars.csv"));
        assert_eq!(config.histogram_bins, 25);
        assert_eq!(config.small_manufacturer_threshold, 1000);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            DashboardConfig::from_json("{ histogram_bins: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let path = std::env::temp_dir().join("car_dashboard_missing_config.json");
        let err = DashboardConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("car_dashboard_missing_config.json"));
    }
}
