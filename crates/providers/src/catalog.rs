//! Model listings across the configured repositories.

use parking_lot::RwLock;
use shared::llm::{ModelRepository, ProviderError, RepositoryType};
use shared::settings::AppSettings;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ModelCatalog {
    settings: Arc<RwLock<AppSettings>>,
    repositories: Vec<Arc<dyn ModelRepository>>,
    /// Lowercased repository name -> sorted model ids.
    cache: RwLock<HashMap<String, Vec<String>>>,
}

fn type_enabled(kind: RepositoryType, settings: &AppSettings) -> bool {
    match kind {
        RepositoryType::Ollama | RepositoryType::OpenAi => true,
        RepositoryType::HuggingFace => settings.hugging_face.enabled,
        RepositoryType::GoogleGemini => settings.gemini.has_api_key,
        RepositoryType::Anthropic => settings.anthropic.has_api_key,
    }
}

fn tidy(mut models: Vec<String>) -> Vec<String> {
    models.retain(|m| !m.trim().is_empty());
    models.sort();
    models.dedup();
    models
}

impl ModelCatalog {
    pub fn new(
        settings: Arc<RwLock<AppSettings>>,
        repositories: Vec<Arc<dyn ModelRepository>>,
    ) -> Self {
        Self {
            settings,
            repositories,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Repositories that are switched on and allowed by the current settings.
    pub fn enabled(&self) -> Vec<Arc<dyn ModelRepository>> {
        let settings = self.settings.read();
        self.repositories
            .iter()
            .filter(|r| r.enabled() && type_enabled(r.repository_type(), &settings))
            .cloned()
            .collect()
    }

    fn find_enabled(&self, name: &str) -> Option<Arc<dyn ModelRepository>> {
        self.enabled()
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }

    /// Unknown or disabled repositories yield an empty list.
    pub async fn list_models(
        &self,
        repository_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ProviderError> {
        let Some(repo) = self.find_enabled(repository_name) else {
            debug!("No enabled repository named {}", repository_name);
            return Ok(vec![]);
        };
        let models = tidy(repo.list_models(cancel).await?);
        self.cache
            .write()
            .insert(repo.name().to_lowercase(), models.clone());
        Ok(models)
    }

    pub fn cached_models(&self, repository_name: &str) -> Option<Vec<String>> {
        self.cache.read().get(&repository_name.to_lowercase()).cloned()
    }

    /// Refreshes every enabled repository in the background.
    ///
    /// The handle resolves to the number of repositories that answered. A
    /// failing repository keeps its previous cache entry.
    pub fn spawn_refresh(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<usize> {
        tokio::spawn(async move {
            let mut refreshed = 0;
            for repo in self.enabled() {
                if cancel.is_cancelled() {
                    break;
                }
                match repo.list_models(&cancel).await {
                    Ok(models) => {
                        self.cache
                            .write()
                            .insert(repo.name().to_lowercase(), tidy(models));
                        refreshed += 1;
                    }
                    Err(e) if e.is_canceled() => break,
                    Err(e) => warn!("Model refresh failed: {}", e),
                }
            }
            info!("Refreshed model lists for {} repositories", refreshed);
            refreshed
        })
    }
}
