//! Document classifier: driver license, insurance, or unknown.
//!
//! The classifier typically runs first so each document can be routed to
//! the right extractor (see [`crate::verify`]).

use crate::config::SkillConfig;
use crate::error::SkillError;
use crate::prompts::{CLASSIFICATION_MAX_TOKENS, CLASSIFIER_PROMPT, CLASSIFIER_USER_PROMPT};
use crate::records::{ClassificationResult, DocumentType};
use crate::skill::{ask_model, block_on, log_failure, SkillPrompt};
use crate::vision::resolve_vision_model;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const CLASSIFIER: SkillPrompt = SkillPrompt {
    stage: "classification",
    system: CLASSIFIER_PROMPT,
    user: CLASSIFIER_USER_PROMPT,
    max_tokens: CLASSIFICATION_MAX_TOKENS,
};

/// Classifier reply. The two defaults are the only values the library ever
/// fills in on the model's behalf.
#[derive(Debug, Deserialize)]
struct ClassifierReply {
    #[serde(default)]
    document_type: DocumentType,
    #[serde(default)]
    confidence: f64,
}

/// Classify a document image as `driver_license`, `insurance` or `unknown`.
///
/// A reply without `document_type` yields `unknown`; one without
/// `confidence` yields `0.0`. A label outside the three known values, a
/// `null` value, or a confidence outside `[0, 1]` is a schema violation.
pub async fn classify(
    path: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<ClassificationResult, SkillError> {
    let path = path.as_ref();
    info!("Starting classification: {}", path.display());

    let fields = ask_model(path, config, &CLASSIFIER).await?;
    let result = parse_classification(&path.to_string_lossy(), fields)
        .inspect_err(|e| log_failure(CLASSIFIER.stage, path, e))?;

    info!(
        "Classified {} as {} (confidence {:.2})",
        result.file_path, result.document_type, result.confidence
    );
    Ok(result)
}

/// Synchronous wrapper around [`classify`].
pub fn classify_sync(
    path: impl AsRef<Path>,
    config: &SkillConfig,
) -> Result<ClassificationResult, SkillError> {
    block_on(classify(path, config))
}

/// One entry of a batch: the input path and its own outcome.
pub type BatchEntry = (String, Result<ClassificationResult, SkillError>);

/// Classify independent documents with up to `config.concurrency` calls in
/// flight.
///
/// The vision model is resolved once and shared by every call. A failing
/// document does not abort the batch; results come back in input order.
///
/// # Errors
/// Only when no vision model can be resolved.
pub async fn classify_batch<P: AsRef<Path>>(
    paths: &[P],
    config: &SkillConfig,
) -> Result<Vec<BatchEntry>, SkillError> {
    let model = resolve_vision_model(config)?;
    let mut shared = config.clone();
    shared.vision_model = Some(Arc::clone(&model));

    info!(
        "Classifying {} documents with {} (concurrency {})",
        paths.len(),
        model.name(),
        config.concurrency
    );

    let mut results: Vec<(usize, BatchEntry)> = stream::iter(paths.iter().enumerate().map(|(i, p)| {
        let path = p.as_ref().to_path_buf();
        let config = &shared;
        async move {
            let outcome = classify(&path, config).await;
            if let Err(ref e) = outcome {
                warn!("Batch entry {} failed: {}", path.display(), e);
            }
            (i, (path.to_string_lossy().to_string(), outcome))
        }
    }))
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    results.sort_by_key(|(i, _)| *i);
    Ok(results.into_iter().map(|(_, entry)| entry).collect())
}

fn parse_classification(
    file_path: &str,
    fields: Map<String, Value>,
) -> Result<ClassificationResult, SkillError> {
    let schema_err = |detail: String| SkillError::SchemaViolation {
        record: "ClassificationResult".to_string(),
        detail,
    };

    let reply: ClassifierReply =
        serde_json::from_value(Value::Object(fields)).map_err(|e| schema_err(e.to_string()))?;

    if !(0.0..=1.0).contains(&reply.confidence) {
        return Err(schema_err(format!(
            "confidence {} is outside [0.0, 1.0]",
            reply.confidence
        )));
    }

    Ok(ClassificationResult {
        file_path: file_path.to_string(),
        document_type: reply.document_type,
        confidence: reply.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(json: &str) -> Map<String, Value> {
        match serde_json::from_str(json).unwrap() {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_full_reply() {
        let r = parse_classification(
            "/tmp/dl.jpg",
            fields(r#"{"document_type":"driver_license","confidence":0.95}"#),
        )
        .unwrap();
        assert_eq!(r.document_type, DocumentType::DriverLicense);
        assert_eq!(r.confidence, 0.95);
        assert_eq!(r.file_path, "/tmp/dl.jpg");
    }

    #[test]
    fn missing_keys_use_defaults() {
        let r = parse_classification("/tmp/x.png", fields("{}")).unwrap();
        assert_eq!(r.document_type, DocumentType::Unknown);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn integer_confidence_accepted() {
        let r = parse_classification("/tmp/x.png", fields(r#"{"document_type":"insurance","confidence":1}"#))
            .unwrap();
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn unknown_label_is_schema_violation() {
        let err = parse_classification(
            "/tmp/x.png",
            fields(r#"{"document_type":"passport","confidence":0.9}"#),
        )
        .unwrap_err();
        assert!(matches!(err, SkillError::SchemaViolation { .. }));
    }

    #[test]
    fn null_label_is_schema_violation() {
        assert!(parse_classification("/tmp/x.png", fields(r#"{"document_type":null}"#)).is_err());
    }

    #[test]
    fn out_of_range_confidence_rejected() {
        let err = parse_classification(
            "/tmp/x.png",
            fields(r#"{"document_type":"unknown","confidence":1.5}"#),
        )
        .unwrap_err();
        assert!(err.to_string().contains("outside"), "got: {err}");
        assert!(parse_classification("/tmp/x.png", fields(r#"{"confidence":-0.1}"#)).is_err());
    }
}
