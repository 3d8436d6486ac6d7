use async_trait::async_trait;
use shared::context::{ExtractorOptions, FileContext};
use shared::scan::FileCandidate;
use tokio_util::sync::CancellationToken;

use super::{mime, ContextEnricher, EnrichOutcome};
use crate::cancel::Canceled;

/// Size, modification time and MIME type. Handles every candidate and does no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataEnricher;

#[async_trait]
impl ContextEnricher for MetadataEnricher {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn can_handle(&self, _candidate: &FileCandidate) -> bool {
        true
    }

    async fn enrich(
        &self,
        candidate: &FileCandidate,
        context: &mut FileContext,
        _options: &ExtractorOptions,
        _cancel: &CancellationToken,
    ) -> Result<EnrichOutcome, Canceled> {
        context.size_bytes = Some(candidate.size_bytes);
        context.last_write_time = Some(candidate.last_write_time);
        context.mime_type = Some(mime::from_extension(&candidate.extension).to_string());
        Ok(EnrichOutcome::Applied)
    }
}
