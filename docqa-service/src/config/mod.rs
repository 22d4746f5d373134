use serde::Deserialize;
use service_core::config::{self as core_config, get_env, GoogleConfig, ModelConfig};
use service_core::error::AppError;

/// Default per-file upload limit (20MB).
const DEFAULT_MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

/// Default limit for a whole multipart request (100MB).
const DEFAULT_MAX_REQUEST_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct DocQaConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Largest single PDF accepted by `/upload_pdf`.
    pub max_file_bytes: usize,
    /// Largest multipart body accepted by `/upload_pdf`.
    pub max_request_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl DocQaConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        Ok(DocQaConfig {
            common: common_config,
            google: GoogleConfig::load(is_prod)?,
            models: ModelConfig::load(is_prod)?,
            upload: UploadConfig {
                max_file_bytes: parse_bytes(
                    "DOCQA_MAX_UPLOAD_BYTES",
                    DEFAULT_MAX_FILE_BYTES,
                    is_prod,
                )?,
                max_request_bytes: parse_bytes(
                    "DOCQA_MAX_REQUEST_BYTES",
                    DEFAULT_MAX_REQUEST_BYTES,
                    is_prod,
                )?,
            },
        })
    }
}

fn parse_bytes(key: &str, default: usize, is_prod: bool) -> Result<usize, AppError> {
    get_env(key, Some(&default.to_string()), is_prod)?
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid {}: {}", key, e)))
}
