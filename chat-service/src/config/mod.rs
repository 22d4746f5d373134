use serde::Deserialize;
use service_core::config::{self as core_config, GoogleConfig, ModelConfig};
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        Ok(ChatConfig {
            common: common_config,
            google: GoogleConfig::load(is_prod)?,
            models: ModelConfig::load(is_prod)?,
        })
    }
}
