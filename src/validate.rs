//! Cross-document validation of a driver license against an insurance record.
//!
//! Pure and deterministic: no model call, no I/O. The two records are assumed
//! to describe the same person; picking the pair is the caller's job.
//!
//! Comparison folds case and trims surrounding whitespace, and nothing more.
//! Internal whitespace is not collapsed and punctuation is not stripped, so
//! `"123 Main St"` and `"123 Main Street"` (or a differently wrapped address)
//! are reported as a discrepancy.

use crate::error::SkillError;
use crate::records::{
    DriverLicenseData, FieldDiscrepancy, InsuranceData, MatchStatus, ValidationReport,
};
use tracing::{debug, info};

/// Trim surrounding whitespace and lower-case. Absent values become `""`.
pub fn normalize(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}

/// Compare name, date of birth and address.
///
/// * **name** — `"{first} {last}"` on each side, compared after folding;
///   one discrepancy entry covers both parts.
/// * **date_of_birth** — a match when either side is absent; otherwise
///   compared after folding.
/// * **address** — compared after folding.
///
/// Discrepancies keep the original, unfolded values and are ordered
/// name, date_of_birth, address.
pub fn validate_documents(dl: &DriverLicenseData, insurance: &InsuranceData) -> ValidationReport {
    let mut discrepancies = Vec::new();

    let dl_name = dl.full_name();
    let ins_name = insurance.full_name();
    let name_match = normalize(Some(&dl_name)) == normalize(Some(&ins_name));
    if !name_match {
        discrepancies.push(FieldDiscrepancy {
            field_name: "name".to_string(),
            dl_value: dl_name.clone(),
            insurance_value: ins_name,
        });
    }

    let dob_match = match (&dl.date_of_birth, &insurance.date_of_birth) {
        (Some(a), Some(b)) => normalize(Some(a)) == normalize(Some(b)),
        _ => true,
    };
    if !dob_match {
        discrepancies.push(FieldDiscrepancy {
            field_name: "date_of_birth".to_string(),
            dl_value: dl.date_of_birth.clone().unwrap_or_default(),
            insurance_value: insurance.date_of_birth.clone().unwrap_or_default(),
        });
    }

    let address_match = normalize(Some(&dl.address)) == normalize(Some(&insurance.address));
    if !address_match {
        discrepancies.push(FieldDiscrepancy {
            field_name: "address".to_string(),
            dl_value: dl.address.clone(),
            insurance_value: insurance.address.clone(),
        });
    }

    let match_status = if name_match && dob_match && address_match {
        MatchStatus::Match
    } else {
        MatchStatus::Discrepancy
    };

    debug!(
        name_match,
        dob_match, address_match, "Compared {} with {}", dl.file_path, insurance.file_path
    );
    info!(
        "Validation for {}: {:?} ({} discrepancies)",
        dl_name,
        match_status,
        discrepancies.len()
    );

    ValidationReport {
        person_name: dl_name,
        name_match,
        dob_match,
        address_match,
        match_status,
        discrepancies,
        dl_source: dl.file_path.clone(),
        insurance_source: insurance.file_path.clone(),
    }
}

/// Validate two serialised records (e.g. the outputs of the extractors).
pub fn validate_json(dl_json: &str, insurance_json: &str) -> Result<ValidationReport, SkillError> {
    let dl = DriverLicenseData::from_json(dl_json)?;
    let insurance = InsuranceData::from_json(insurance_json)?;
    Ok(validate_documents(&dl, &insurance))
}
