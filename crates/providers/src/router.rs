use async_trait::async_trait;
use shared::llm::{ChatJsonRequest, LlmProvider, ProviderError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Named providers tried in preference order.
///
/// Only transport failures move on to the next provider. Credential,
/// response-shape and cancellation failures are returned to the caller as-is
/// so it can decide whether to re-prompt or abort.
pub struct ProviderRouter {
    providers: Vec<Arc<dyn LlmProvider>>,
    preference: Vec<String>,
}

impl ProviderRouter {
    pub fn new(preference: Vec<String>) -> Self {
        Self {
            providers: Vec::new(),
            preference,
        }
    }

    /// Registers a provider; a later registration with the same name replaces it.
    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers
            .retain(|p| !p.name().eq_ignore_ascii_case(provider.name()));
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Returns the name of the first registered provider in preference order.
    pub fn active_provider(&self) -> Option<&str> {
        self.preference
            .iter()
            .find(|name| self.get(name).is_some())
            .map(|s| s.as_str())
    }

    pub async fn chat_json_with_fallback(
        &self,
        request: &ChatJsonRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let mut last_error = None;

        for name in &self.preference {
            if cancel.is_cancelled() {
                return Err(ProviderError::Canceled {
                    provider: name.clone(),
                });
            }
            let Some(provider) = self.get(name) else {
                last_error = Some(ProviderError::UnknownProvider(name.clone()));
                continue;
            };

            let result = if provider.supports_vision() || request.images_png_base64.is_empty() {
                provider.chat_json(request, cancel).await
            } else {
                let text_only = ChatJsonRequest {
                    images_png_base64: vec![],
                    ..request.clone()
                };
                provider.chat_json(&text_only, cancel).await
            };

            match result {
                Ok(text) => {
                    debug!("{} answered the planner request", provider.name());
                    return Ok(text);
                }
                Err(e) if e.is_retryable() => {
                    warn!("{}; trying next provider", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::UnknownProvider("<none configured>".into())))
    }
}

#[async_trait]
impl LlmProvider for ProviderRouter {
    fn name(&self) -> &str {
        self.active_provider().unwrap_or("router")
    }

    fn supports_vision(&self) -> bool {
        self.active_provider()
            .and_then(|name| self.get(name))
            .is_some_and(|p| p.supports_vision())
    }

    async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>, ProviderError> {
        match self.active_provider().and_then(|name| self.get(name)) {
            Some(provider) => provider.list_models(cancel).await,
            None => Err(ProviderError::UnknownProvider("<none configured>".into())),
        }
    }

    async fn chat_json(
        &self,
        request: &ChatJsonRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        self.chat_json_with_fallback(request, cancel).await
    }
}
