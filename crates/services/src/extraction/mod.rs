//! Context enrichment.
//!
//! Each [`ContextEnricher`] owns a disjoint set of [`FileContext`] fields and
//! is selected per candidate by `can_handle`. Enrichment is best-effort: a
//! file that cannot be read still gets a context, only without that signal.

mod builder;
mod metadata;
pub mod mime;
mod text;
mod thumbnail;

pub use builder::{ContextReport, FileContextBuilder};
pub use metadata::MetadataEnricher;
pub use text::TextPreviewEnricher;
pub use thumbnail::ImageThumbnailEnricher;

use async_trait::async_trait;
use shared::context::{ExtractorOptions, FileContext};
use shared::scan::FileCandidate;
use tokio_util::sync::CancellationToken;

use crate::cancel::Canceled;

/// What an enricher did for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    Applied,
    /// Tried and failed recoverably; the reason is kept for diagnostics only.
    Skipped(String),
    /// Disabled by options.
    NotAttempted,
}

#[async_trait]
pub trait ContextEnricher: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_handle(&self, candidate: &FileCandidate) -> bool;

    async fn enrich(
        &self,
        candidate: &FileCandidate,
        context: &mut FileContext,
        options: &ExtractorOptions,
        cancel: &CancellationToken,
    ) -> Result<EnrichOutcome, Canceled>;
}

/// Metadata, then text preview, then image thumbnail.
pub fn default_enrichers() -> Vec<Box<dyn ContextEnricher>> {
    vec![
        Box::new(MetadataEnricher),
        Box::new(TextPreviewEnricher),
        Box::new(ImageThumbnailEnricher),
    ]
}
