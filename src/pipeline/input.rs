//! Input resolution: classify a user-supplied path by extension and make sure
//! it is readable.
//!
//! The extension check runs before anything touches the disk, so an
//! unsupported file fails immediately and never reaches the model.

use crate::error::SkillError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source formats the normalizer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Single- or multi-page PDF; only the first page is used.
    Pdf,
    Jpeg,
    Png,
}

impl SourceKind {
    /// Map a file extension (without the dot, any case) to a source kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "jpg" | "jpeg" => Some(SourceKind::Jpeg),
            "png" => Some(SourceKind::Png),
            _ => None,
        }
    }
}

/// A validated, readable input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Resolve the input path to a readable source file.
pub fn resolve_source(path: impl AsRef<Path>) -> Result<SourceFile, SkillError> {
    let path = path.as_ref().to_path_buf();

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let kind = SourceKind::from_extension(&ext).ok_or_else(|| SkillError::UnsupportedFileType {
        path: path.clone(),
        extension: if ext.is_empty() {
            "<none>".to_string()
        } else {
            format!(".{}", ext.to_ascii_lowercase())
        },
    })?;

    if !path.exists() {
        return Err(SkillError::FileNotFound { path });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SkillError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(SkillError::FileNotFound { path });
        }
    }

    debug!("Resolved {:?} source: {}", kind, path.display());
    Ok(SourceFile { path, kind })
}
