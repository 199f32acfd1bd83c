//! # doc-skills
//!
//! Classify identity documents, extract driver-license and insurance-card
//! fields with a Vision Language Model (VLM), and cross-check the two records
//! for a single person.
//!
//! ## Skills
//!
//! | Skill | Function | Model call |
//! |-------|----------|------------|
//! | classify | [`classify()`] | yes (100 tokens) |
//! | extract driver license | [`extract_driver_license`] | yes (300 tokens) |
//! | extract insurance | [`extract_insurance`] | yes (300 tokens) |
//! | validate | [`validate_documents`] | no, pure |
//! | verify a pair | [`verify_pair`] | classify ×2 + extract ×2 + validate |
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / JPEG / PNG
//!  │
//!  ├─ 1. Input      extension check (.pdf .jpg .jpeg .png), readability
//!  ├─ 2. Render     first PDF page via pdfium, or decode + EXIF orientation
//!  ├─ 3. Orient     portrait (h > 1.2 w) → landscape
//!  ├─ 4. Encode     PNG → base64
//!  ├─ 5. VLM        one chat request: instructions + image, JSON-object reply
//!  └─ 6. Reply      JSON → typed record (required fields enforced)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc_skills::{extract_driver_license, extract_insurance, validate_documents, SkillConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Model auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = SkillConfig::default();
//!     let dl = extract_driver_license("license.jpg", &config).await?;
//!     let ins = extract_insurance("insurance_card.pdf", &config).await?;
//!     let report = validate_documents(&dl, &ins);
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a network
//!
//! Every model-backed skill goes through the [`VisionModel`] trait. Inject a
//! fake with [`SkillConfigBuilder::vision_model`] to exercise normalization
//! and reply parsing offline.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc-skills` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod records;
mod skill;
pub mod validate;
pub mod verify;
pub mod vision;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use classify::{classify, classify_batch, classify_sync, BatchEntry};
pub use config::{SkillConfig, SkillConfigBuilder, DEFAULT_MODEL};
pub use error::SkillError;
pub use extract::{
    extract_driver_license, extract_driver_license_sync, extract_insurance, extract_insurance_sync,
};
pub use pipeline::encode::NormalizedImage;
pub use pipeline::normalize::{normalize_image, normalize_image_sync};
pub use records::{
    ClassificationResult, DocumentType, DriverLicenseData, FieldDiscrepancy, InsuranceData,
    MatchStatus, ValidationReport,
};
pub use validate::{validate_documents, validate_json};
pub use verify::{verify_pair, verify_pair_sync, PairVerification};
pub use vision::{
    resolve_vision_model, OpenAiVisionModel, ProviderVisionModel, VisionModel, VisionRequest,
};
