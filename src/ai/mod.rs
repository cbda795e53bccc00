//! AI integration module.
//!
//! Turns a [`ReportInput`] into a prose progress summary using Gemini,
//! Claude, or a local LLM through Ollama.

mod claude;
mod gemini;
mod ollama;
pub mod prompts;

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use async_trait::async_trait;

use crate::core::AiConfig;
use crate::summary::ReportInput;

/// Trait for text-generation backends that write progress summaries.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Write a prose summary of `report`.
    async fn summarize(&self, report: &ReportInput) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is available.
    async fn is_available(&self) -> bool;
}

/// AI error types.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No response from AI")]
    NoResponse,
}

/// Names accepted for `ai.provider`.
pub const PROVIDERS: &[&str] = &["gemini", "claude", "ollama"];

/// Summarizer with fallback support.
///
/// The configured provider is tried first, then every other provider that
/// reports itself available.
pub struct AIManager {
    providers: Vec<Box<dyn Summarizer>>,
}

impl AIManager {
    /// Build the provider chain from configuration.
    pub async fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        if !PROVIDERS.contains(&config.provider.as_str()) {
            return Err(AIError::UnknownProvider(config.provider.clone()).into());
        }

        let order = std::iter::once(config.provider.as_str())
            .chain(PROVIDERS.iter().copied().filter(|p| *p != config.provider));

        let mut providers: Vec<Box<dyn Summarizer>> = Vec::new();
        for name in order {
            // The model override only applies to the configured provider.
            let model = if name == config.provider { config.model.as_deref() } else { None };
            let Some(provider) = build_provider(name, model, config) else {
                continue;
            };
            if provider.is_available().await {
                providers.push(provider);
            } else {
                tracing::debug!(provider = name, "Provider not available");
            }
        }

        Ok(Self { providers })
    }

    /// Create with an explicit provider chain.
    pub fn with_providers(providers: Vec<Box<dyn Summarizer>>) -> Self {
        Self { providers }
    }

    /// Check if any AI provider is available.
    pub fn is_available(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Get the active provider name.
    pub fn active_provider(&self) -> Option<&str> {
        self.providers.first().map(|p| p.name())
    }
}

fn build_provider(name: &str, model: Option<&str>, config: &AiConfig) -> Option<Box<dyn Summarizer>> {
    match name {
        "gemini" => GeminiProvider::new().ok().map(|p| {
            let p = p.with_language(&config.language);
            Box::new(match model {
                Some(m) => p.with_model(m),
                None => p,
            }) as Box<dyn Summarizer>
        }),
        "claude" => ClaudeProvider::new().ok().map(|p| {
            let p = p.with_language(&config.language);
            Box::new(match model {
                Some(m) => p.with_model(m),
                None => p,
            }) as Box<dyn Summarizer>
        }),
        "ollama" => {
            let mut p = OllamaProvider::new().with_language(&config.language);
            if let Some(url) = &config.ollama.base_url {
                p = p.with_base_url(url);
            }
            if let Some(m) = model.or(config.ollama.model.as_deref()) {
                p = p.with_model(m);
            }
            Some(Box::new(p) as Box<dyn Summarizer>)
        }
        _ => None,
    }
}

#[async_trait]
impl Summarizer for AIManager {
    async fn summarize(&self, report: &ReportInput) -> anyhow::Result<String> {
        for provider in &self.providers {
            match provider.summarize(report).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                }
            }
        }

        Err(AIError::ProviderNotAvailable("No AI provider available".to_string()).into())
    }

    fn name(&self) -> &str {
        self.active_provider().unwrap_or("none")
    }

    async fn is_available(&self) -> bool {
        AIManager::is_available(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DateRange;
    use crate::summary::ReportParts;

    struct Fixed {
        name: &'static str,
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl Summarizer for Fixed {
        async fn summarize(&self, _report: &ReportInput) -> anyhow::Result<String> {
            self.reply.map(String::from).ok_or_else(|| anyhow::anyhow!("{} is down", self.name))
        }

        fn name(&self) -> &str {
            self.name
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn empty_report() -> ReportInput {
        ReportInput::assemble(ReportParts {
            date_range: DateRange::new("2026-02-01", "2026-02-07"),
            project_gid: String::new(),
            completed_tasks: Vec::new(),
            merged_mrs: Vec::new(),
            in_progress_tasks: Vec::new(),
            blocked_tasks: Vec::new(),
            open_mrs: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_manager_falls_back_to_next_provider() {
        let providers: Vec<Box<dyn Summarizer>> = vec![
            Box::new(Fixed { name: "first", reply: None }) as Box<dyn Summarizer>,
            Box::new(Fixed { name: "second", reply: Some("summary") }),
        ];
        let manager = AIManager::with_providers(providers);

        assert_eq!(manager.active_provider(), Some("first"));
        assert_eq!(manager.summarize(&empty_report()).await.unwrap(), "summary");
    }

    #[tokio::test]
    async fn test_manager_without_providers_fails() {
        let manager = AIManager::with_providers(Vec::new());
        assert!(!manager.is_available());
        assert_eq!(manager.name(), "none");
        assert!(manager.summarize(&empty_report()).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = AiConfig { provider: "gpt".to_string(), ..Default::default() };
        let err = AIManager::from_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("gpt"));
    }
}
