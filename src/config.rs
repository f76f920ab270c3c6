use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "salary-lens.json";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "SALARY_LENS_CONFIG";
/// Overrides the dataset opened at startup.
pub const DATA_ENV: &str = "SALARY_LENS_DATA";

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_size: [f32; 2],
    /// Outer padding (in steps) of the categorical parallel-coordinate axes.
    pub point_padding: f64,
    /// Approximate number of ticks on continuous axes.
    pub tick_count: usize,
    /// Dataset opened at startup, if any.
    pub data_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_size: [1400.0, 900.0],
            point_padding: 0.5,
            tick_count: 5,
            data_path: None,
        }
    }
}

impl ViewerConfig {
    /// Parse a config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the startup configuration.
    ///
    /// The file named by `SALARY_LENS_CONFIG` (else `salary-lens.json`) is
    /// read if it exists; a broken file is logged and ignored. The dataset
    /// path is then overridden by `SALARY_LENS_DATA`, then by `cli_path`.
    pub fn resolve(cli_path: Option<PathBuf>) -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Using config {}", path.display());
                    config
                }
                Err(e) => {
                    log::error!("Ignoring config: {e:#}");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_path = Some(PathBuf::from(data));
        }
        if let Some(data) = cli_path {
            config.data_path = Some(data);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salary-lens.json");
        std::fs::write(&path, r#"{ "tick_count": 8, "data_path": "ds_salaries.csv" }"#).unwrap();

        let config = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(config.tick_count, 8);
        assert_eq!(config.data_path, Some(PathBuf::from("ds_salaries.csv")));
        assert_eq!(config.point_padding, ViewerConfig::default().point_padding);
    }

    #[test]
    fn every_field_is_read_from_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salary-lens.json");
        std::fs::write(
            &path,
            r#"{ "window_size": [800, 600], "point_padding": 1.0, "tick_count": 3,
                 "data_path": "/data/ds.parquet" }"#,
        )
        .unwrap();

        let config = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(
            config,
            ViewerConfig {
                window_size: [800.0, 600.0],
                point_padding: 1.0,
                tick_count: 3,
                data_path: Some(PathBuf::from("/data/ds.parquet")),
            }
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salary-lens.json");
        std::fs::write(&path, "{ tick_count: ").unwrap();
        assert!(ViewerConfig::from_file(&path).is_err());
    }
}
