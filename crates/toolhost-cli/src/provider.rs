//! Language-model backend selection from [`Config`]

use anyhow::Context as _;
use std::sync::Arc;
use toolhost_llm::LLMProvider;
use toolhost_llm::providers::{AnthropicProvider, OpenAIConfig, OpenAIProvider, anthropic, openai};
use toolhost_runtime::ExecutorConfig;
use toolhost_utils::{Config, ProviderKind};
use tracing::info;

/// Model used when the configuration names none
pub fn model_for(config: &Config) -> String {
    config.model.clone().unwrap_or_else(|| {
        match config.provider {
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
            ProviderKind::OpenAI => openai::DEFAULT_MODEL,
        }
        .to_string()
    })
}

/// Build the configured provider, reading credentials from the environment
pub fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config.provider {
        ProviderKind::Anthropic => Arc::new(
            AnthropicProvider::from_env().context("Anthropic provider is not configured")?,
        ),
        ProviderKind::OpenAI => {
            let mut openai_config = match OpenAIConfig::from_env() {
                Ok(c) => c,
                Err(_) if config.api_base.is_some() => OpenAIConfig::default(),
                Err(e) => return Err(e).context("OpenAI provider is not configured"),
            };
            if let Some(base) = &config.api_base {
                openai_config = openai_config.with_api_base(base.clone());
            }
            Arc::new(OpenAIProvider::with_config(openai_config)?)
        }
    };

    info!(provider = provider.name(), model = %model_for(config), "Using LLM provider");
    Ok(provider)
}

/// Executor settings for a sample agent
pub fn executor_config(config: &Config, system_prompt: &str) -> ExecutorConfig {
    ExecutorConfig {
        max_iterations: config.max_iterations,
        model: model_for(config),
        system_prompt: Some(system_prompt.to_string()),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults_follow_provider() {
        let mut config = Config::default();
        assert_eq!(model_for(&config), anthropic::DEFAULT_MODEL);

        config.provider = ProviderKind::OpenAI;
        assert_eq!(model_for(&config), openai::DEFAULT_MODEL);

        config.model = Some("qwen2.5-7b-instruct".to_string());
        assert_eq!(model_for(&config), "qwen2.5-7b-instruct");
    }

    #[test]
    fn test_executor_config_copies_limits() {
        let config = Config {
            max_iterations: 3,
            max_tokens: 512,
            temperature: Some(0.1),
            ..Config::default()
        };
        let exec = executor_config(&config, "Be brief.");
        assert_eq!(exec.max_iterations, 3);
        assert_eq!(exec.max_tokens, 512);
        assert_eq!(exec.temperature, Some(0.1));
        assert_eq!(exec.system_prompt.as_deref(), Some("Be brief."));
    }

    #[test]
    fn test_local_server_needs_no_key() {
        let config = Config {
            provider: ProviderKind::OpenAI,
            api_base: Some("http://localhost:1234/v1".to_string()),
            ..Config::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
