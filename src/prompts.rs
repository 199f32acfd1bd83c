//! Instruction texts sent to the vision model.
//!
//! These strings are part of each skill's observable contract, not
//! implementation detail: they fix the JSON keys the model must return, the
//! label set of the classifier, and the accuracy policy of the extractors
//! (an absent, obscured or uncertain field is `null`, never a best guess).
//! Tests below pin the parts that downstream parsing depends on.

/// System prompt for driver-license extraction.
pub const DRIVER_LICENSE_PROMPT: &str = "Extract the following fields from this Driver License image. \
Return JSON with these exact keys: \
first_name, last_name, license_number, address, state, date_of_birth (YYYY-MM-DD or null), \
expiration_date (YYYY-MM-DD or null). \
IMPORTANT: Only extract values that are clearly visible in the document. \
If a field is not visible, partially obscured, or you are not confident in the value, use null. \
Do NOT guess or fabricate any values. Accuracy is more important than completeness.";

/// User turn accompanying the driver-license image.
pub const DRIVER_LICENSE_USER_PROMPT: &str = "Extract all fields from this driver license.";

/// System prompt for insurance-document extraction.
pub const INSURANCE_PROMPT: &str = "Extract the following fields from this insurance document image. \
Return JSON with these exact keys: \
first_name, last_name, date_of_birth (YYYY-MM-DD or null), address, \
policy_number (or null), vehicle_make (or null), vehicle_model (or null), \
vehicle_year (or null), vin (or null). \
IMPORTANT: Only extract values that are clearly visible in the document. \
If a field is not visible, partially obscured, or you are not confident in the value, use null. \
Do NOT guess or fabricate any values. Accuracy is more important than completeness.";

/// User turn accompanying the insurance image.
pub const INSURANCE_USER_PROMPT: &str = "Extract all fields from this insurance document.";

/// System prompt for document classification.
pub const CLASSIFIER_PROMPT: &str = "You are a document classifier. Examine the image and determine \
if it is a Driver License or an Insurance document. \
Respond with JSON: {\"document_type\": \"driver_license\" | \"insurance\" | \"unknown\", \"confidence\": 0.0-1.0}. \
If the document does not clearly match either type, answer \"unknown\" with a HIGH confidence \
rather than forcing a guess. The confidence is how sure you are of the label you chose.";

/// User turn accompanying the image to classify.
pub const CLASSIFIER_USER_PROMPT: &str =
    "Classify this document. Is it a driver license or insurance document?";

/// Output token budget for both extractors.
pub const EXTRACTION_MAX_TOKENS: usize = 300;

/// Output token budget for the classifier.
pub const CLASSIFICATION_MAX_TOKENS: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_license_prompt_lists_every_key() {
        for key in [
            "first_name",
            "last_name",
            "license_number",
            "address",
            "state",
            "date_of_birth",
            "expiration_date",
        ] {
            assert!(DRIVER_LICENSE_PROMPT.contains(key), "missing {key}");
        }
    }

    #[test]
    fn insurance_prompt_lists_every_key() {
        for key in [
            "first_name",
            "last_name",
            "date_of_birth",
            "address",
            "policy_number",
            "vehicle_make",
            "vehicle_model",
            "vehicle_year",
            "vin",
        ] {
            assert!(INSURANCE_PROMPT.contains(key), "missing {key}");
        }
    }

    #[test]
    fn extractors_forbid_guessing() {
        for prompt in [DRIVER_LICENSE_PROMPT, INSURANCE_PROMPT] {
            assert!(prompt.contains("use null"));
            assert!(prompt.contains("Do NOT guess or fabricate"));
        }
    }

    #[test]
    fn classifier_prompt_names_all_labels() {
        for label in ["driver_license", "insurance", "unknown", "confidence"] {
            assert!(CLASSIFIER_PROMPT.contains(label), "missing {label}");
        }
        assert!(CLASSIFIER_PROMPT.contains("HIGH confidence"));
    }

    #[test]
    fn token_budgets() {
        assert_eq!(EXTRACTION_MAX_TOKENS, 300);
        assert_eq!(CLASSIFICATION_MAX_TOKENS, 100);
    }
}
