//! Application configuration
//!
//! Values come from built-in defaults, then an optional JSON file, then the
//! environment. Every source goes through [`Config::validate`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable names
pub mod env {
    pub const PROVIDER: &str = "TOOLHOST_PROVIDER";
    pub const MODEL: &str = "TOOLHOST_MODEL";
    pub const API_BASE: &str = "OPENAI_API_BASE";
    pub const MAX_ITERATIONS: &str = "TOOLHOST_MAX_ITERATIONS";
    pub const MAX_TOKENS: &str = "TOOLHOST_MAX_TOKENS";
    pub const TEMPERATURE: &str = "TOOLHOST_TEMPERATURE";
    pub const UTC_OFFSET_HOURS: &str = "TOOLHOST_UTC_OFFSET_HOURS";
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Language-model backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API
    #[default]
    Anthropic,
    /// OpenAI Chat Completions API, or any compatible local server
    OpenAI,
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "openai-compatible" | "local" => Ok(Self::OpenAI),
            other => Err(ConfigError::invalid(
                env::PROVIDER,
                format!("unknown provider '{other}' (expected 'anthropic' or 'openai')"),
            )),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend used for completions
    pub provider: ProviderKind,
    /// Model identifier; `None` picks the provider's default
    pub model: Option<String>,
    /// Base URL for OpenAI-compatible servers
    pub api_base: Option<String>,
    /// Upper bound on model round-trips per instruction
    pub max_iterations: usize,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Offset used by the clock tool, in whole hours east of UTC
    pub utc_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            model: None,
            api_base: None,
            max_iterations: 10,
            max_tokens: 4096,
            temperature: None,
            utc_offset_hours: 9,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment in practice)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get(env::PROVIDER) {
            self.provider = provider.parse()?;
        }
        if let Some(model) = get(env::MODEL) {
            self.model = Some(model);
        }
        if let Some(base) = get(env::API_BASE) {
            self.api_base = Some(base);
        }
        if let Some(value) = get(env::MAX_ITERATIONS) {
            self.max_iterations = parse_number(env::MAX_ITERATIONS, &value)?;
        }
        if let Some(value) = get(env::MAX_TOKENS) {
            self.max_tokens = parse_number(env::MAX_TOKENS, &value)?;
        }
        if let Some(value) = get(env::TEMPERATURE) {
            self.temperature = Some(parse_number(env::TEMPERATURE, &value)?);
        }
        if let Some(value) = get(env::UTC_OFFSET_HOURS) {
            self.utc_offset_hours = parse_number(env::UTC_OFFSET_HOURS, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid(
                env::MAX_ITERATIONS,
                "must be greater than 0",
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid(env::MAX_TOKENS, "must be greater than 0"));
        }
        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(ConfigError::invalid(
                env::TEMPERATURE,
                format!("{t} is outside 0.0..=2.0"),
            ));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::invalid(
                env::UTC_OFFSET_HOURS,
                format!("{} is outside -12..=14", self.utc_offset_hours),
            ));
        }
        if let Some(base) = &self.api_base {
            let parsed = url::Url::parse(base)
                .map_err(|e| ConfigError::invalid(env::API_BASE, e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::invalid(
                    env::API_BASE,
                    format!("unsupported scheme '{}'", parsed.scheme()),
                ));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, format!("'{value}': {e}")))
}
