//! Typed records produced and consumed by the skills.
//!
//! All records serialise to snake_case JSON so that the output of one skill
//! (e.g. `extract-dl`) can be piped straight into another (`validate`).

use crate::error::SkillError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document label assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    DriverLicense,
    Insurance,
    /// The document does not clearly match either known type.
    #[default]
    Unknown,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::DriverLicense => "driver_license",
            DocumentType::Insurance => "insurance",
            DocumentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a cross-document validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Match,
    Discrepancy,
}

/// Result of classifying a document as a driver license, insurance card, or unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub file_path: String,
    pub document_type: DocumentType,
    /// Model-reported confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Structured data extracted from a driver license.
///
/// Dates are ISO 8601 (`YYYY-MM-DD`) strings as returned by the model; they
/// are not re-parsed so the validator sees exactly what was printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverLicenseData {
    pub file_path: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub address: String,
    pub state: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// Structured data extracted from an insurance card or policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceData {
    pub file_path: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    pub address: String,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub vehicle_make: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_year: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
}

/// A single field that differs between the driver license and insurance data.
///
/// Values are the original, non-normalized strings from each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiscrepancy {
    pub field_name: String,
    pub dl_value: String,
    pub insurance_value: String,
}

/// Result of comparing driver license and insurance data for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub person_name: String,
    pub name_match: bool,
    pub dob_match: bool,
    pub address_match: bool,
    pub match_status: MatchStatus,
    pub discrepancies: Vec<FieldDiscrepancy>,
    pub dl_source: String,
    pub insurance_source: String,
}

impl ValidationReport {
    pub fn is_match(&self) -> bool {
        self.match_status == MatchStatus::Match
    }
}

impl DriverLicenseData {
    /// Parse a serialised record, e.g. the output of `doc-skills extract-dl`.
    pub fn from_json(json: &str) -> Result<Self, SkillError> {
        parse_record("DriverLicenseData", json)
    }

    /// `"{first} {last}"` exactly as extracted.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl InsuranceData {
    /// Parse a serialised record, e.g. the output of `doc-skills extract-insurance`.
    pub fn from_json(json: &str) -> Result<Self, SkillError> {
        parse_record("InsuranceData", json)
    }

    /// `"{first} {last}"` exactly as extracted.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn parse_record<T: serde::de::DeserializeOwned>(record: &str, json: &str) -> Result<T, SkillError> {
    serde_json::from_str(json).map_err(|e| SkillError::SchemaViolation {
        record: record.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_serialises_snake_case() {
        let json = serde_json::to_string(&DocumentType::DriverLicense).unwrap();
        assert_eq!(json, "\"driver_license\"");
        let back: DocumentType = serde_json::from_str("\"insurance\"").unwrap();
        assert_eq!(back, DocumentType::Insurance);
        assert_eq!(DocumentType::default(), DocumentType::Unknown);
    }

    #[test]
    fn document_type_rejects_unknown_label() {
        assert!(serde_json::from_str::<DocumentType>("\"passport\"").is_err());
    }

    #[test]
    fn driver_license_optional_fields_default_to_none() {
        let dl = DriverLicenseData::from_json(
            r#"{"file_path":"/tmp/dl.pdf","first_name":"John","last_name":"Smith",
                "license_number":"D123","address":"123 Main St","state":"IL"}"#,
        )
        .unwrap();
        assert_eq!(dl.date_of_birth, None);
        assert_eq!(dl.expiration_date, None);
        assert_eq!(dl.full_name(), "John Smith");
    }

    #[test]
    fn driver_license_missing_required_field_fails() {
        let err = DriverLicenseData::from_json(
            r#"{"file_path":"/tmp/dl.pdf","first_name":"John","last_name":"Smith",
                "address":"123 Main St","state":"IL"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SkillError::SchemaViolation { .. }));
        assert!(err.to_string().contains("license_number"), "got: {err}");
    }

    #[test]
    fn required_field_may_not_be_null() {
        let err = InsuranceData::from_json(
            r#"{"file_path":"/tmp/ins.pdf","first_name":"John","last_name":"Smith","address":null}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SkillError::SchemaViolation { .. }));
    }

    #[test]
    fn insurance_optional_fields_default_to_none() {
        let ins = InsuranceData::from_json(
            r#"{"file_path":"/tmp/ins.pdf","first_name":"John","last_name":"Smith","address":"123 Main St"}"#,
        )
        .unwrap();
        assert_eq!(ins.date_of_birth, None);
        assert_eq!(ins.vehicle_make, None);
        assert_eq!(ins.vin, None);
    }

    #[test]
    fn validation_report_serialises_match_status() {
        let report = ValidationReport {
            person_name: "Jane Doe".into(),
            name_match: true,
            dob_match: true,
            address_match: false,
            match_status: MatchStatus::Discrepancy,
            discrepancies: vec![FieldDiscrepancy {
                field_name: "address".into(),
                dl_value: "123 Main St".into(),
                insurance_value: "456 Oak Ave".into(),
            }],
            dl_source: "/tmp/dl.pdf".into(),
            insurance_source: "/tmp/ins.pdf".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["match_status"], "discrepancy");
        assert_eq!(json["discrepancies"][0]["field_name"], "address");
        assert!(!report.is_match());
    }
}
