//! Reply parsing: model text → JSON object → typed record.
//!
//! The OpenAI client requests JSON-object mode, so its replies are bare JSON.
//! Other providers reached through edgequake-llm have no such switch and
//! sometimes wrap the object in a ```` ```json ```` fence despite the prompt;
//! that outer fence is the only thing stripped. Nothing else is repaired.

use crate::error::SkillError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n?```\s*$").unwrap());

fn strip_json_fences(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    }
}

/// Parse a reply body into a top-level JSON object.
///
/// `stage` names the skill for the error message, e.g. `"classification"`.
pub fn parse_reply(stage: &str, body: &str) -> Result<Map<String, Value>, SkillError> {
    let json = strip_json_fences(body);
    let value: Value = serde_json::from_str(json).map_err(|e| SkillError::MalformedResponse {
        stage: stage.to_string(),
        detail: format!("reply is not valid JSON: {e}"),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(SkillError::MalformedResponse {
            stage: stage.to_string(),
            detail: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

/// Build a record from the reply's keys plus the source file path.
///
/// The caller's path always wins over any `file_path` the model returned.
/// Unknown keys are ignored; missing required keys and `null` or
/// wrongly-typed values fail with [`SkillError::SchemaViolation`].
pub fn build_record<T: DeserializeOwned>(
    record: &str,
    file_path: &str,
    mut fields: Map<String, Value>,
) -> Result<T, SkillError> {
    fields.insert("file_path".to_string(), Value::String(file_path.to_string()));
    serde_json::from_value(Value::Object(fields)).map_err(|e| SkillError::SchemaViolation {
        record: record.to_string(),
        detail: e.to_string(),
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DriverLicenseData;

    #[test]
    fn test_bare_object() {
        let map = parse_reply("test", r#"{"a": 1}"#).unwrap();
        assert_eq!(map["a"], 1);
    }

    #[test]
    fn test_strip_fences() {
        let map = parse_reply("test", "```json\n{\"a\": \"b\"}\n```").unwrap();
        assert_eq!(map["a"], "b");
    }

    #[test]
    fn test_strip_fences_no_lang() {
        let map = parse_reply("test", "  ```\n{\"a\": null}\n```\n").unwrap();
        assert!(map["a"].is_null());
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_reply("classification", "I think it's a license").unwrap_err();
        match err {
            SkillError::MalformedResponse { stage, detail } => {
                assert_eq!(stage, "classification");
                assert!(detail.contains("not valid JSON"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_reply("test", "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"), "got: {err}");
    }

    #[test]
    fn test_build_record_overrides_file_path() {
        let map = parse_reply(
            "test",
            r#"{"file_path":"/model/made/this/up","first_name":"A","last_name":"B",
                "license_number":"1","address":"x","state":"IL","date_of_birth":null}"#,
        )
        .unwrap();
        let dl: DriverLicenseData = build_record("DriverLicenseData", "/real/dl.png", map).unwrap();
        assert_eq!(dl.file_path, "/real/dl.png");
        assert_eq!(dl.date_of_birth, None);
    }

    #[test]
    fn test_build_record_wrong_shape() {
        let map = parse_reply(
            "test",
            r#"{"first_name":"A","last_name":"B","license_number":12345,"address":"x","state":"IL"}"#,
        )
        .unwrap();
        let err = build_record::<DriverLicenseData>("DriverLicenseData", "/dl.png", map).unwrap_err();
        assert!(matches!(err, SkillError::SchemaViolation { .. }));
    }
}
