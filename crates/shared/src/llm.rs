//! Capability contracts for language-model backends.
//!
//! Concrete vendor adapters live outside this workspace; they only need to
//! implement [`LlmProvider`] (chat capable) or [`ModelRepository`]
//! (catalog only).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatJsonRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    /// Base64 PNG thumbnails. Providers without vision may ignore them.
    #[serde(default)]
    pub images_png_base64: Vec<String>,
}

/// Failure classes a provider reports to its caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider}: API credentials are missing")]
    MissingCredentials { provider: String },
    #[error("{provider}: credentials were rejected: {detail}")]
    Unauthorized { provider: String, detail: String },
    #[error("{provider}: transport failure: {detail}")]
    Transport { provider: String, detail: String },
    #[error("{provider}: unexpected response: {detail}")]
    MalformedResponse { provider: String, detail: String },
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{provider}: request canceled")]
    Canceled { provider: String },
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::MissingCredentials { provider }
            | ProviderError::Unauthorized { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::MalformedResponse { provider, .. }
            | ProviderError::Canceled { provider } => provider,
            ProviderError::UnknownProvider(name) => name,
        }
    }

    /// Network-level failures are worth retrying or routing elsewhere.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transport { .. })
    }

    /// The caller should prompt for (new) credentials.
    pub fn needs_credentials(&self) -> bool {
        matches!(
            self,
            ProviderError::MissingCredentials { .. } | ProviderError::Unauthorized { .. }
        )
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, ProviderError::Canceled { .. })
    }
}

/// A backend that can execute chat requests.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn supports_vision(&self) -> bool;

    async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>, ProviderError>;

    /// Returns the raw assistant text. It is expected, not guaranteed, to be JSON.
    async fn chat_json(
        &self,
        request: &ChatJsonRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepositoryType {
    Ollama,
    OpenAi,
    HuggingFace,
    GoogleGemini,
    Anthropic,
}

/// A catalog-only model source.
#[async_trait]
pub trait ModelRepository: Send + Sync {
    fn name(&self) -> &str;

    fn repository_type(&self) -> RepositoryType;

    fn enabled(&self) -> bool;

    async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>, ProviderError>;
}
