//! Dashboard configuration loaded from `arrears_dss.json`.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use crate::data::export::EXPORT_FILE_NAME;

pub const CONFIG_FILE: &str = "arrears_dss.json";

/// Display and export settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Prefix for monetary KPIs.
    pub currency: String,
    pub word_cloud_max_words: usize,
    /// Cap on rendered table rows; `None` renders every row.
    pub table_row_limit: Option<usize>,
    pub export_file_name: String,
    pub chart_image_width: u32,
    pub chart_image_height: u32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency: "RM".to_string(),
            word_cloud_max_words: 200,
            table_row_limit: None,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            chart_image_width: 1600,
            chart_image_height: 1000,
            window_width: 1400.0,
            window_height: 850.0,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid dashboard configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Load `arrears_dss.json` from the working directory, falling back to defaults.
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{:#}; using default configuration", e);
                Self::default()
            }
        }
    }
}
