//! Error types for the doc-skills library.
//!
//! Every skill invocation is all-or-nothing: there are no partial results and
//! no retries inside the library. A single [`SkillError`] therefore covers the
//! whole taxonomy, grouped by the stage that failed:
//!
//! | Stage       | Variants |
//! |-------------|----------|
//! | `input`     | [`FileNotFound`](SkillError::FileNotFound), [`PermissionDenied`](SkillError::PermissionDenied), [`UnsupportedFileType`](SkillError::UnsupportedFileType) |
//! | `normalize` | decode / render / encode failures |
//! | `model`     | provider not configured, external call failure |
//! | `parse`     | reply body is not a JSON object |
//! | `schema`    | reply lacks a required field or holds the wrong shape |
//! | `routing`   | a document pair cannot be routed to the two extractors |
//!
//! The caller decides whether to retry, skip, or abort a batch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the doc-skills library.
#[derive(Debug, Error)]
pub enum SkillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Extension is not one of `.pdf`, `.jpg`, `.jpeg`, `.png`.
    #[error("Unsupported file type: '{extension}' ({path})\nSupported: .pdf, .jpg, .jpeg, .png")]
    UnsupportedFileType { path: PathBuf, extension: String },

    // ── Normalization errors ──────────────────────────────────────────────
    /// The raster image could not be decoded.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// PDF header/trailer/xref is corrupt, or the document is encrypted.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF opened fine but has no pages to render.
    #[error("PDF '{path}' has no pages")]
    EmptyPdf { path: PathBuf },

    /// pdfium-render returned an error while rasterising the first page.
    #[error("Rasterisation failed for '{path}': {detail}")]
    RasterisationFailed { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF input needs the pdfium shared library. You can:\n\
  • Install libpdfium system-wide, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or containing directory).\n"
    )]
    PdfiumBindingFailed(String),

    /// Re-encoding the normalized image as PNG failed.
    #[error("Failed to encode normalized image as PNG: {0}")]
    ImageEncode(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// No vision model could be resolved (missing API key etc.).
    #[error("Vision model provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The external model call failed (network, HTTP status, provider error).
    #[error("Model call to '{provider}' failed: {message}")]
    ModelCall { provider: String, message: String },

    // ── Reply errors ──────────────────────────────────────────────────────
    /// The reply body is not a JSON object.
    #[error("Malformed {stage} response: {detail}")]
    MalformedResponse { stage: String, detail: String },

    /// The reply parsed but does not satisfy the target record's schema.
    #[error("{record} failed validation: {detail}")]
    SchemaViolation { record: String, detail: String },

    // ── Routing errors ────────────────────────────────────────────────────
    /// A pair of documents was not one driver license plus one insurance card.
    #[error(
        "Cannot route documents: expected one driver_license and one insurance, \
got {first_type} ('{first}') and {second_type} ('{second}')"
    )]
    Routing {
        first: String,
        first_type: String,
        second: String,
        second_type: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SkillError {
    /// Short label naming the stage that failed, used in log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            SkillError::FileNotFound { .. }
            | SkillError::PermissionDenied { .. }
            | SkillError::UnsupportedFileType { .. } => "input",
            SkillError::ImageDecode { .. }
            | SkillError::CorruptPdf { .. }
            | SkillError::EmptyPdf { .. }
            | SkillError::RasterisationFailed { .. }
            | SkillError::PdfiumBindingFailed(_)
            | SkillError::ImageEncode(_) => "normalize",
            SkillError::ProviderNotConfigured { .. } | SkillError::ModelCall { .. } => "model",
            SkillError::MalformedResponse { .. } => "parse",
            SkillError::SchemaViolation { .. } => "schema",
            SkillError::Routing { .. } => "routing",
            SkillError::InvalidConfig(_) => "config",
            SkillError::Internal(_) => "internal",
        }
    }
}
