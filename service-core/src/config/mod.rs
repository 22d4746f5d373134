use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Default Gemini REST endpoint.
pub const DEFAULT_GENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model used for one-shot generation and chat sessions (e.g., gemini-2.0-flash)
    pub text_model: String,
}

impl GoogleConfig {
    pub fn load(is_prod: bool) -> Result<Self, AppError> {
        Ok(GoogleConfig {
            api_key: get_env("GOOGLE_API_KEY", None, is_prod)?,
            api_base: get_env("GENAI_API_BASE", Some(DEFAULT_GENAI_API_BASE), is_prod)?,
        })
    }
}

impl ModelConfig {
    pub fn load(is_prod: bool) -> Result<Self, AppError> {
        Ok(ModelConfig {
            text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
        })
    }
}

/// True when `ENVIRONMENT=prod`; every variable then becomes mandatory.
pub fn is_prod() -> bool {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod"
}

pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
