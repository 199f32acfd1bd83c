//! End-to-end check of one person's document pair.
//!
//! ```text
//! file A ─┐                ┌─ extract_driver_license ─┐
//!         ├─ classify ─ route                          ├─ validate ─▶ report
//! file B ─┘                └─ extract_insurance ───────┘
//! ```
//!
//! The two files may be given in either order; classification decides which
//! extractor each one goes to.

use crate::classify::classify;
use crate::config::SkillConfig;
use crate::error::SkillError;
use crate::extract::{extract_driver_license, extract_insurance};
use crate::pipeline::input::resolve_source;
use crate::records::{
    ClassificationResult, DocumentType, DriverLicenseData, InsuranceData, ValidationReport,
};
use crate::skill::block_on;
use crate::validate::validate_documents;
use crate::vision::resolve_vision_model;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Everything produced while verifying one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairVerification {
    /// Classifications in the order the files were given.
    pub classifications: Vec<ClassificationResult>,
    pub driver_license: DriverLicenseData,
    pub insurance: InsuranceData,
    pub report: ValidationReport,
}

/// Classify both files, route them to the matching extractors, and validate.
///
/// # Errors
/// Any skill failure, or [`SkillError::Routing`] unless the pair is exactly
/// one `driver_license` and one `insurance`.
pub async fn verify_pair(
    first: impl AsRef<Path>,
    second: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<PairVerification, SkillError> {
    let (first, second) = (first.as_ref(), second.as_ref());

    // Bad input is reported before any provider lookup.
    resolve_source(first)?;
    resolve_source(second)?;

    // One client for all four calls.
    let mut shared = config.clone();
    shared.vision_model = Some(resolve_vision_model(config)?);

    let a = classify(first, &shared).await?;
    let b = classify(second, &shared).await?;

    let (dl_path, ins_path) = route(&a, &b)?;
    info!("Routed {} → driver license, {} → insurance", dl_path, ins_path);

    let driver_license = extract_driver_license(dl_path, &shared).await?;
    let insurance = extract_insurance(ins_path, &shared).await?;
    let report = validate_documents(&driver_license, &insurance);

    Ok(PairVerification {
        classifications: vec![a, b],
        driver_license,
        insurance,
        report,
    })
}

/// Synchronous wrapper around [`verify_pair`].
pub fn verify_pair_sync(
    first: impl AsRef<Path>,
    second: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<PairVerification, SkillError> {
    block_on(verify_pair(first, second, config))
}

/// Pick (driver license path, insurance path) from two classifications.
pub fn route<'a>(
    a: &'a ClassificationResult,
    b: &'a ClassificationResult,
) -> Result<(&'a str, &'a str), SkillError> {
    match (a.document_type, b.document_type) {
        (DocumentType::DriverLicense, DocumentType::Insurance) => {
            Ok((a.file_path.as_str(), b.file_path.as_str()))
        }
        (DocumentType::Insurance, DocumentType::DriverLicense) => {
            Ok((b.file_path.as_str(), a.file_path.as_str()))
        }
        _ => Err(SkillError::Routing {
            first: a.file_path.clone(),
            first_type: a.document_type.to_string(),
            second: b.file_path.clone(),
            second_type: b.document_type.to_string(),
        }),
    }
}
