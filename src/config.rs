use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LabError, LabResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabConfig {
    pub service: ServiceConfig,
    pub grid: GridConfig,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the computation service, without trailing slash
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Dimensions both matrix grids are built with at startup
    pub default_rows: usize,
    pub default_cols: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    pub level: String,
    pub log_dir: PathBuf,
    pub enable_file_logging: bool,
    pub enable_json_format: bool,
    pub max_log_files: usize,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
            },
            grid: GridConfig {
                default_rows: 3,
                default_cols: 3,
            },
            logging: LoggingSection {
                level: "info".to_string(),
                log_dir: PathBuf::from("logs"),
                enable_file_logging: true,
                enable_json_format: false,
                max_log_files: 10,
            },
        }
    }
}

impl LabConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LabResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LabError::file_io(path.as_ref().display().to_string(), e))?;

        let config: LabConfig = toml::from_str(&content)
            .map_err(|e| LabError::configuration(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `LABDESK_*` environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("LABDESK_BASE_URL") {
            if !url.trim().is_empty() {
                self.service.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(level) = std::env::var("LABDESK_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(rows) = std::env::var("LABDESK_GRID_ROWS") {
            if let Ok(value) = rows.parse::<usize>() {
                self.grid.default_rows = value;
            }
        }

        if let Ok(cols) = std::env::var("LABDESK_GRID_COLS") {
            if let Ok(value) = cols.parse::<usize>() {
                self.grid.default_cols = value;
            }
        }

        self
    }

    pub fn load_from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LabResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LabError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| LabError::file_io(path.as_ref().display().to_string(), e))?;

        Ok(())
    }

    pub fn validate(&self) -> LabResult<()> {
        let url = self.service.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LabError::configuration(format!(
                "service.base_url must be an http(s) URL, got '{}'",
                self.service.base_url
            )));
        }
        Ok(())
    }
}
