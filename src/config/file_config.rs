use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub data_dir: Option<String>,
    pub output_dir: Option<String>,
    pub credentials_path: Option<String>,

    // Sections
    pub catalog: Option<CatalogConfig>,
    pub pipeline: Option<PipelineConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base_url: Option<String>,
    pub auth_url: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub min_request_interval_ms: Option<u64>,
    pub max_rate_limit_retries: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk_size: Option<usize>,
    pub resume_chunk_size: Option<usize>,
    pub progress_every: Option<usize>,
    pub test_mode: Option<bool>,
    pub test_mode_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ReportConfig {
    pub utc_offset_hours: Option<i32>,
    pub top_n: Option<usize>,
    pub genre_slices: Option<usize>,
    pub liked_limit: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
