//! Per-file context handed to a language model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scan::FileCandidate;

/// Controls how much signal each enricher extracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorOptions {
    pub max_text_bytes: usize,
    pub max_text_chars: usize,
    /// Largest width or height of a generated thumbnail
    pub max_image_dimension: u32,
    pub include_text: bool,
    pub include_image_thumbnail: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            max_text_bytes: 64 * 1024,
            max_text_chars: 6_000,
            max_image_dimension: 384,
            include_text: true,
            include_image_thumbnail: true,
        }
    }
}

/// Accumulator filled by successive enrichers.
///
/// Identity fields are seeded from the candidate; every other field is owned
/// by exactly one enricher and stays `None` when that enricher does not run
/// or cannot read the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContext {
    pub source_path: PathBuf,
    pub file_name: String,
    pub extension: String,

    // metadata
    pub size_bytes: Option<u64>,
    pub last_write_time: Option<DateTime<Utc>>,
    pub mime_type: Option<String>,

    // text
    pub text_preview: Option<String>,

    // image
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub thumbnail_png_base64: Option<String>,
}

impl FileContext {
    pub fn seed(candidate: &FileCandidate) -> Self {
        let extension = candidate
            .full_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            source_path: candidate.full_path.clone(),
            file_name: candidate.name.clone(),
            extension,
            size_bytes: None,
            last_write_time: None,
            mime_type: None,
            text_preview: None,
            image_width: None,
            image_height: None,
            thumbnail_png_base64: None,
        }
    }
}

/// `(done, total)` after each candidate during a batch build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProgress {
    pub done: usize,
    pub total: usize,
}
