//! The image normalizer: any supported source file → one base64 PNG.
//!
//! ```text
//! path ──▶ input ──▶ render | decode(+EXIF) ──▶ orient ──▶ encode
//! ```

use crate::error::SkillError;
use crate::pipeline::encode::{encode_png, NormalizedImage};
use crate::pipeline::input::{resolve_source, SourceKind};
use crate::pipeline::{orient, render};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Normalize a PDF/JPEG/PNG into a base64 PNG suitable for a data URI.
///
/// EXIF orientation is always applied to raster input. With `auto_rotate`,
/// a portrait result is additionally turned to landscape. Only the source
/// file is read; nothing is written.
pub async fn normalize_image(
    path: impl AsRef<Path>,
    auto_rotate: bool,
    max_pixels: u32,
) -> Result<NormalizedImage, SkillError> {
    let path: PathBuf = path.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || normalize_blocking(&path, auto_rotate, max_pixels))
        .await
        .map_err(|e| SkillError::Internal(format!("Normalize task panicked: {}", e)))?
}

/// Synchronous wrapper around [`normalize_image`].
pub fn normalize_image_sync(
    path: impl AsRef<Path>,
    auto_rotate: bool,
    max_pixels: u32,
) -> Result<NormalizedImage, SkillError> {
    normalize_blocking(path.as_ref(), auto_rotate, max_pixels)
}

fn normalize_blocking(
    path: &Path,
    auto_rotate: bool,
    max_pixels: u32,
) -> Result<NormalizedImage, SkillError> {
    let source = resolve_source(path)?;

    let image = match source.kind {
        SourceKind::Pdf => render::render_first_page(&source.path, max_pixels)?,
        SourceKind::Jpeg | SourceKind::Png => render::decode_raster(&source.path)?,
    };

    let image = if auto_rotate {
        orient::auto_rotate(image)
    } else {
        image
    };

    let encoded = encode_png(&image).map_err(|e| SkillError::ImageEncode(e.to_string()))?;
    debug!(
        "Normalized {} → {}x{} PNG",
        source.path.display(),
        encoded.width,
        encoded.height
    );
    Ok(encoded)
}
