//! Driver-license and insurance extractors.
//!
//! Both follow the same contract: the model is told to return `null` for any
//! field it cannot read with confidence, and a reply that lacks a required
//! field fails record construction instead of being patched up. Precision
//! over recall.

use crate::config::SkillConfig;
use crate::error::SkillError;
use crate::pipeline::reply::build_record;
use crate::prompts::{
    DRIVER_LICENSE_PROMPT, DRIVER_LICENSE_USER_PROMPT, EXTRACTION_MAX_TOKENS, INSURANCE_PROMPT,
    INSURANCE_USER_PROMPT,
};
use crate::records::{DriverLicenseData, InsuranceData};
use crate::skill::{ask_model, block_on, log_failure, SkillPrompt};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

const DRIVER_LICENSE: SkillPrompt = SkillPrompt {
    stage: "driver license extraction",
    system: DRIVER_LICENSE_PROMPT,
    user: DRIVER_LICENSE_USER_PROMPT,
    max_tokens: EXTRACTION_MAX_TOKENS,
};

const INSURANCE: SkillPrompt = SkillPrompt {
    stage: "insurance extraction",
    system: INSURANCE_PROMPT,
    user: INSURANCE_USER_PROMPT,
    max_tokens: EXTRACTION_MAX_TOKENS,
};

/// Extract structured data from a driver license (PDF, JPEG or PNG).
///
/// # Errors
/// Unsupported or unreadable input, normalization failure, model call
/// failure, a reply that is not a JSON object, or a reply missing one of
/// `first_name`, `last_name`, `license_number`, `address`, `state`.
pub async fn extract_driver_license(
    path: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<DriverLicenseData, SkillError> {
    let record: DriverLicenseData =
        extract_record(path.as_ref(), config, &DRIVER_LICENSE, "DriverLicenseData").await?;
    info!(
        "Extracted driver license {} ({})",
        record.license_number, record.file_path
    );
    Ok(record)
}

/// Extract structured data from an insurance document (PDF, JPEG or PNG).
///
/// # Errors
/// As [`extract_driver_license`]; the required keys are `first_name`,
/// `last_name` and `address`.
pub async fn extract_insurance(
    path: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<InsuranceData, SkillError> {
    let record: InsuranceData =
        extract_record(path.as_ref(), config, &INSURANCE, "InsuranceData").await?;
    info!(
        "Extracted insurance record for {} ({})",
        record.full_name(),
        record.file_path
    );
    Ok(record)
}

/// Synchronous wrapper around [`extract_driver_license`].
pub fn extract_driver_license_sync(
    path: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<DriverLicenseData, SkillError> {
    block_on(extract_driver_license(path, config))
}

/// Synchronous wrapper around [`extract_insurance`].
pub fn extract_insurance_sync(
    path: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<InsuranceData, SkillError> {
    block_on(extract_insurance(path, config))
}

async fn extract_record<T: DeserializeOwned>(
    path: &Path,
    config: &SkillConfig,
    prompt: &SkillPrompt,
    record: &str,
) -> Result<T, SkillError> {
    info!("Starting {}: {}", prompt.stage, path.display());
    let fields = ask_model(path, config, prompt).await?;
    let file_path = path.to_string_lossy();
    build_record(record, &file_path, fields).inspect_err(|e| log_failure(prompt.stage, path, e))
}
