use shared::context::{BuildProgress, ExtractorOptions, FileContext};
use shared::scan::FileCandidate;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{default_enrichers, ContextEnricher, EnrichOutcome};
use crate::cancel::{ensure_active, Canceled};

/// A built context plus what each applicable enricher reported.
#[derive(Debug, Clone)]
pub struct ContextReport {
    pub context: FileContext,
    pub outcomes: Vec<(&'static str, EnrichOutcome)>,
}

/// Runs the registered enrichers, in registration order, over each candidate.
pub struct FileContextBuilder {
    enrichers: Vec<Box<dyn ContextEnricher>>,
}

impl Default for FileContextBuilder {
    fn default() -> Self {
        Self::new(default_enrichers())
    }
}

impl FileContextBuilder {
    pub fn new(enrichers: Vec<Box<dyn ContextEnricher>>) -> Self {
        Self { enrichers }
    }

    pub fn enricher_names(&self) -> Vec<&'static str> {
        self.enrichers.iter().map(|e| e.name()).collect()
    }

    pub async fn build(
        &self,
        candidate: &FileCandidate,
        options: &ExtractorOptions,
        cancel: &CancellationToken,
    ) -> Result<FileContext, Canceled> {
        Ok(self.build_detailed(candidate, options, cancel).await?.context)
    }

    pub async fn build_detailed(
        &self,
        candidate: &FileCandidate,
        options: &ExtractorOptions,
        cancel: &CancellationToken,
    ) -> Result<ContextReport, Canceled> {
        let mut context = FileContext::seed(candidate);
        let mut outcomes = Vec::new();

        for enricher in &self.enrichers {
            ensure_active(cancel)?;
            if !enricher.can_handle(candidate) {
                continue;
            }
            let outcome = enricher.enrich(candidate, &mut context, options, cancel).await?;
            if let EnrichOutcome::Skipped(reason) = &outcome {
                debug!(
                    "{} skipped for {}: {}",
                    enricher.name(),
                    candidate.full_path.display(),
                    reason
                );
            }
            outcomes.push((enricher.name(), outcome));
        }

        Ok(ContextReport { context, outcomes })
    }

    /// Builds contexts one candidate at a time, reporting `(done, total)` after each.
    pub async fn build_many(
        &self,
        candidates: &[FileCandidate],
        options: &ExtractorOptions,
        progress: Option<&UnboundedSender<BuildProgress>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileContext>, Canceled> {
        let total = candidates.len();
        let mut contexts = Vec::with_capacity(total);

        for (i, candidate) in candidates.iter().enumerate() {
            ensure_active(cancel)?;
            contexts.push(self.build(candidate, options, cancel).await?);
            if let Some(tx) = progress {
                let _ = tx.send(BuildProgress { done: i + 1, total });
            }
        }

        info!("Built {} file contexts", contexts.len());
        Ok(contexts)
    }
}
