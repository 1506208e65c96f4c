mod file_config;

pub use file_config::{CatalogConfig, FileConfig, PipelineConfig, ReportConfig};

use crate::enrichment::PipelineSettings;
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const CHUNK_DIR_NAME: &str = "chunks";
pub const FINAL_OUTPUT_FILE_NAME: &str = "audio_features_final.csv";
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "audio_features";
pub const DEFAULT_CREDENTIALS_FILE_NAME: &str = "credentials.json";
/// Upper bound for the spacing between catalog requests.
pub const MAX_REQUEST_INTERVAL_MS: u64 = 60_000;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub credentials_path: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub test_mode: bool,
    pub test_mode_limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub credentials_path: PathBuf,

    // Section settings (with defaults)
    pub catalog: CatalogSettings,
    pub enrich: EnrichSettings,
    pub report: ReportSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("data_dir must be specified via --data-dir or in config file")
            })?;

        if !data_dir.exists() {
            bail!("Data directory does not exist: {:?}", data_dir);
        }
        if !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| cli.output_dir.clone())
            .unwrap_or_else(|| data_dir.join(DEFAULT_OUTPUT_DIR_NAME));

        let credentials_path = file
            .credentials_path
            .map(PathBuf::from)
            .or_else(|| cli.credentials_path.clone())
            .unwrap_or_else(|| data_dir.join(DEFAULT_CREDENTIALS_FILE_NAME));

        let catalog_file = file.catalog.unwrap_or_default();
        let defaults = CatalogSettings::default();
        let catalog = CatalogSettings {
            api_base_url: catalog_file
                .api_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            auth_url: catalog_file.auth_url.unwrap_or(defaults.auth_url),
            request_timeout_sec: catalog_file
                .request_timeout_sec
                .unwrap_or(defaults.request_timeout_sec),
            min_request_interval_ms: catalog_file
                .min_request_interval_ms
                .unwrap_or(defaults.min_request_interval_ms),
            max_rate_limit_retries: catalog_file
                .max_rate_limit_retries
                .unwrap_or(defaults.max_rate_limit_retries),
        };
        if catalog.request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }
        if catalog.min_request_interval_ms > MAX_REQUEST_INTERVAL_MS {
            bail!(
                "min_request_interval_ms must be at most {}, got {}",
                MAX_REQUEST_INTERVAL_MS,
                catalog.min_request_interval_ms
            );
        }

        let pipeline_file = file.pipeline.unwrap_or_default();
        let defaults = EnrichSettings::default();
        let enrich = EnrichSettings {
            chunk_size: pipeline_file.chunk_size.or(cli.chunk_size),
            full_chunk_size: defaults.full_chunk_size,
            resume_chunk_size: pipeline_file
                .resume_chunk_size
                .unwrap_or(defaults.resume_chunk_size),
            progress_every: pipeline_file
                .progress_every
                .unwrap_or(defaults.progress_every),
            test_mode: cli.test_mode || pipeline_file.test_mode.unwrap_or(false),
            test_mode_limit: pipeline_file
                .test_mode_limit
                .or(cli.test_mode_limit)
                .unwrap_or(defaults.test_mode_limit),
        };
        if enrich.chunk_size == Some(0) || enrich.resume_chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }

        let report_file = file.report.unwrap_or_default();
        let defaults = ReportSettings::default();
        let report = ReportSettings {
            utc_offset_hours: report_file
                .utc_offset_hours
                .unwrap_or(defaults.utc_offset_hours),
            top_n: report_file.top_n.unwrap_or(defaults.top_n),
            genre_slices: report_file.genre_slices.unwrap_or(defaults.genre_slices),
            liked_limit: report_file.liked_limit.unwrap_or(defaults.liked_limit),
        };
        if !(-12..=14).contains(&report.utc_offset_hours) {
            bail!(
                "utc_offset_hours must be between -12 and 14, got {}",
                report.utc_offset_hours
            );
        }

        Ok(Self {
            data_dir,
            output_dir,
            credentials_path,
            catalog,
            enrich,
            report,
        })
    }

    pub fn chunk_dir(&self) -> PathBuf {
        self.output_dir.join(CHUNK_DIR_NAME)
    }

    pub fn final_output_path(&self) -> PathBuf {
        self.output_dir.join(FINAL_OUTPUT_FILE_NAME)
    }
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub api_base_url: String,
    pub auth_url: String,
    pub request_timeout_sec: u64,
    pub min_request_interval_ms: u64,
    pub max_rate_limit_retries: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            request_timeout_sec: 30,
            min_request_interval_ms: 50,
            max_rate_limit_retries: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichSettings {
    /// Explicit chunk size; overrides the full/resume defaults.
    pub chunk_size: Option<usize>,
    pub full_chunk_size: usize,
    pub resume_chunk_size: usize,
    pub progress_every: usize,
    pub test_mode: bool,
    pub test_mode_limit: usize,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            chunk_size: None,
            full_chunk_size: 1000,
            resume_chunk_size: 50,
            progress_every: 100,
            test_mode: false,
            test_mode_limit: 76,
        }
    }
}

impl EnrichSettings {
    /// Pipeline settings for a run starting at `offset`.
    ///
    /// Resumed runs and test runs checkpoint in smaller batches unless a chunk
    /// size was given explicitly.
    pub fn pipeline_settings(&self, offset: usize) -> PipelineSettings {
        let chunk_size = self.chunk_size.unwrap_or(if self.test_mode || offset > 0 {
            self.resume_chunk_size
        } else {
            self.full_chunk_size
        });

        PipelineSettings {
            chunk_size,
            progress_every: if self.test_mode { 10 } else { self.progress_every },
            max_records: self.test_mode.then_some(self.test_mode_limit),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub utc_offset_hours: i32,
    pub top_n: usize,
    pub genre_slices: usize,
    pub liked_limit: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: -5,
            top_n: 10,
            genre_slices: 20,
            liked_limit: 20,
        }
    }
}
