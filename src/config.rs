//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::chat::{ConversationSettings, DEFAULT_CONTEXT_WINDOW};
use crate::error::ErrorCode;
use crate::model::SizeClass;
use crate::model::session::DEFAULT_TEMPERATURE;

pub const DEFAULT_MODELS_DIR: &str = "./models";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8080/v1";
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    pub models_dir: PathBuf,
    pub data_dir: PathBuf,
    pub profile: String,
    pub model_size: SizeClass,
    pub engine_url: String,
    pub engine_timeout: Duration,
    pub temperature: f32,
    pub context_window: usize,
}

impl TutorConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `TUTOR_MODELS_DIR`: model cache directory, default `./models`
    /// - `TUTOR_DATA_DIR`: history store directory, default `./data`
    /// - `TUTOR_PROFILE`: history namespace, default `default`
    /// - `TUTOR_MODEL_SIZE`: `small` (default) or `large`
    /// - `TUTOR_ENGINE_URL`: local engine base URL
    /// - `TUTOR_ENGINE_TIMEOUT_SECS`: default 120
    /// - `TUTOR_TEMPERATURE`: default 0.5
    /// - `TUTOR_CONTEXT_WINDOW`: default 6
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for an unknown model size or a
    /// temperature that is not a number in `0.0..=2.0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_size = match std::env::var("TUTOR_MODEL_SIZE") {
            Ok(raw) => raw.parse::<SizeClass>().map_err(ConfigError::Parse)?,
            Err(_) => SizeClass::default(),
        };
        let temperature = parse_temperature(std::env::var("TUTOR_TEMPERATURE").ok().as_deref())?;
        let profile = std::env::var("TUTOR_PROFILE")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        Ok(Self {
            models_dir: env_path("TUTOR_MODELS_DIR", DEFAULT_MODELS_DIR),
            data_dir: env_path("TUTOR_DATA_DIR", DEFAULT_DATA_DIR),
            profile,
            model_size,
            engine_url: std::env::var("TUTOR_ENGINE_URL")
                .unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            engine_timeout: Duration::from_secs(env_parse("TUTOR_ENGINE_TIMEOUT_SECS", DEFAULT_ENGINE_TIMEOUT_SECS)),
            temperature,
            context_window: env_parse("TUTOR_CONTEXT_WINDOW", DEFAULT_CONTEXT_WINDOW),
        })
    }

    #[must_use]
    pub fn conversation_settings(&self) -> ConversationSettings {
        ConversationSettings {
            context_window: self.context_window,
            temperature: self.temperature,
            model_choice: self.model_size,
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_temperature(raw: Option<&str>) -> Result<f32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TEMPERATURE);
    };
    match raw.trim().parse::<f32>() {
        Ok(t) if (0.0..=2.0).contains(&t) => Ok(t),
        _ => Err(ConfigError::Parse(format!("TUTOR_TEMPERATURE '{raw}' is not a number in 0.0..=2.0"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
