use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{GenericImageView, ImageOutputFormat};
use shared::context::{ExtractorOptions, FileContext};
use shared::scan::FileCandidate;
use std::io::Cursor;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::{ContextEnricher, EnrichOutcome};
use crate::cancel::{ensure_active, Canceled};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Records native dimensions and a downscaled PNG thumbnail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageThumbnailEnricher;

struct Thumbnail {
    width: u32,
    height: u32,
    png_base64: String,
}

#[async_trait]
impl ContextEnricher for ImageThumbnailEnricher {
    fn name(&self) -> &'static str {
        "image_thumbnail"
    }

    fn can_handle(&self, candidate: &FileCandidate) -> bool {
        IMAGE_EXTENSIONS.contains(&candidate.extension.as_str())
    }

    async fn enrich(
        &self,
        candidate: &FileCandidate,
        context: &mut FileContext,
        options: &ExtractorOptions,
        cancel: &CancellationToken,
    ) -> Result<EnrichOutcome, Canceled> {
        if !options.include_image_thumbnail {
            return Ok(EnrichOutcome::NotAttempted);
        }
        ensure_active(cancel)?;

        let path = candidate.full_path.clone();
        let max_dim = options.max_image_dimension;
        let decoded = tokio::task::spawn_blocking(move || make_thumbnail(&path, max_dim)).await;
        ensure_active(cancel)?;

        match decoded {
            Ok(Ok(thumb)) => {
                context.image_width = Some(thumb.width);
                context.image_height = Some(thumb.height);
                context.thumbnail_png_base64 = Some(thumb.png_base64);
                Ok(EnrichOutcome::Applied)
            }
            Ok(Err(e)) => Ok(EnrichOutcome::Skipped(e.to_string())),
            Err(e) => Ok(EnrichOutcome::Skipped(format!("thumbnail task failed: {}", e))),
        }
    }
}

fn make_thumbnail(path: &Path, max_dimension: u32) -> Result<Thumbnail> {
    let data = std::fs::read(path)?;
    let img = image::load_from_memory(&data)?;
    let (width, height) = img.dimensions();

    let (w, h) = thumbnail_size(width, height, max_dimension);
    let resized = if (w, h) == (width, height) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    };

    let mut buffer = Cursor::new(Vec::new());
    resized.write_to(&mut buffer, ImageOutputFormat::Png)?;

    Ok(Thumbnail {
        width,
        height,
        png_base64: STANDARD.encode(buffer.into_inner()),
    })
}

/// Uniform scale so the larger side fits `max_dimension`; never upscales.
pub(crate) fn thumbnail_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max = max_dimension.max(1) as f64;
    let (w, h) = (width.max(1) as f64, height.max(1) as f64);
    let scale = (max / w).min(max / h).min(1.0);
    let scaled_w = ((w * scale).round() as u32).max(1);
    let scaled_h = ((h * scale).round() as u32).max(1);
    (scaled_w, scaled_h)
}
