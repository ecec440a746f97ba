//! Stable provider construction surface for facade consumers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{CompletionSource, HttpChatTransport, OpenAiCompatProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct ProviderBuildConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub fallback_model: Option<String>,
}

impl ProviderBuildConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: Duration::from_secs(90),
            fallback_model: None,
        }
    }

    /// Points the provider at a non-OpenAI endpoint that speaks the same
    /// chat-completions protocol.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }
}

pub fn build_provider_from_api_key(
    api_key: impl Into<String>,
) -> Result<Arc<dyn CompletionSource>, ProviderError> {
    build_provider_with_config(ProviderBuildConfig::new(api_key))
}

pub fn build_provider_with_config(
    config: ProviderBuildConfig,
) -> Result<Arc<dyn CompletionSource>, ProviderError> {
    let api_key = config.api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(ProviderError::authentication(
            "provider API key must not be empty",
        ));
    }

    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    let mut transport = HttpChatTransport::new(http);
    if let Some(base_url) = config.base_url {
        transport = transport.with_base_url(base_url);
    }

    let mut provider = OpenAiCompatProvider::new(Arc::new(transport), api_key);
    if let Some(model) = config.fallback_model {
        provider = provider.with_fallback_model(model);
    }

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::{ProviderBuildConfig, build_provider_with_config};
    use crate::ProviderErrorKind;

    #[test]
    fn blank_api_key_is_rejected_before_any_network_setup() {
        let error = build_provider_with_config(ProviderBuildConfig::new("   "))
            .err()
            .expect("blank key should fail");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }

    #[test]
    fn config_builders_compose() {
        let config = ProviderBuildConfig::new("sk-test")
            .with_base_url("http://localhost:8080/v1")
            .with_fallback_model("local-model");

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.fallback_model.as_deref(), Some("local-model"));
    }
}
