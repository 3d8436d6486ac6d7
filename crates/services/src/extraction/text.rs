use async_trait::async_trait;
use shared::context::{ExtractorOptions, FileContext};
use shared::scan::FileCandidate;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use super::{ContextEnricher, EnrichOutcome};
use crate::cancel::{ensure_active, Canceled};

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "csv", "tsv", "log", "xml", "yaml", "yml", "toml", "ini",
];

/// Reads the head of text-like files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPreviewEnricher;

#[async_trait]
impl ContextEnricher for TextPreviewEnricher {
    fn name(&self) -> &'static str {
        "text_preview"
    }

    fn can_handle(&self, candidate: &FileCandidate) -> bool {
        TEXT_EXTENSIONS.contains(&candidate.extension.as_str())
    }

    async fn enrich(
        &self,
        candidate: &FileCandidate,
        context: &mut FileContext,
        options: &ExtractorOptions,
        cancel: &CancellationToken,
    ) -> Result<EnrichOutcome, Canceled> {
        if !options.include_text {
            return Ok(EnrichOutcome::NotAttempted);
        }
        ensure_active(cancel)?;

        let bytes = match read_head(&candidate.full_path, options.max_text_bytes).await {
            Ok(b) => b,
            Err(e) => return Ok(EnrichOutcome::Skipped(e.to_string())),
        };
        ensure_active(cancel)?;

        let text = decode_best_effort(&bytes);
        context.text_preview = Some(truncate_chars(text, options.max_text_chars));
        Ok(EnrichOutcome::Applied)
    }
}

/// The file handle is dropped before returning.
async fn read_head(path: &std::path::Path, max_bytes: usize) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::with_capacity(max_bytes.min(64 * 1024));
    file.take(max_bytes as u64).read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Strict UTF-8 first, then lossy replacement. NUL bytes are stripped.
pub(crate) fn decode_best_effort(bytes: &[u8]) -> String {
    let decoded = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // The read limit can cut a multi-byte sequence in half.
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    };
    decoded.replace('\0', "")
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}
