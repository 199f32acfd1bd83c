//! The common body of every model-backed skill.
//!
//! normalize → one vision call → parse the reply into a JSON object. Each
//! failure is logged with the stage that produced it and then propagated
//! unchanged; nothing is retried and nothing is defaulted here.

use crate::config::SkillConfig;
use crate::error::SkillError;
use crate::pipeline::normalize::normalize_image;
use crate::pipeline::reply::parse_reply;
use crate::vision::{resolve_vision_model, VisionRequest};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error};

/// Fixed instructions and budget for one skill.
pub(crate) struct SkillPrompt {
    /// Human-readable skill name, e.g. "driver license extraction".
    pub stage: &'static str,
    pub system: &'static str,
    pub user: &'static str,
    pub max_tokens: usize,
}

/// Run one model-backed skill against `path` and return the reply object.
pub(crate) async fn ask_model(
    path: &Path,
    config: &SkillConfig,
    prompt: &SkillPrompt,
) -> Result<Map<String, Value>, SkillError> {
    let start = Instant::now();

    let image = normalize_image(path, config.auto_rotate, config.max_rendered_pixels)
        .await
        .inspect_err(|e| log_failure(prompt.stage, path, e))?;

    let model = resolve_vision_model(config).inspect_err(|e| log_failure(prompt.stage, path, e))?;

    let request = VisionRequest {
        system_prompt: prompt.system.to_string(),
        user_prompt: prompt.user.to_string(),
        image,
        max_tokens: prompt.max_tokens,
        temperature: config.temperature,
        json_object: true,
    };

    debug!(
        "{}: calling {} (max_tokens={})",
        prompt.stage,
        model.name(),
        prompt.max_tokens
    );
    let body = model
        .complete(&request)
        .await
        .inspect_err(|e| log_failure(prompt.stage, path, e))?;
    debug!("{}: reply {} bytes in {:?}", prompt.stage, body.len(), start.elapsed());

    parse_reply(prompt.stage, &body).inspect_err(|e| log_failure(prompt.stage, path, e))
}

/// Log a failed stage before the error is propagated.
pub(crate) fn log_failure(skill: &str, path: &Path, err: &SkillError) {
    error!(
        skill,
        stage = err.stage(),
        file = %path.display(),
        "{}",
        err
    );
}

/// Synchronous bridge for the `_sync` entry points.
///
/// Creates a temporary tokio runtime internally.
pub(crate) fn block_on<F, T>(fut: F) -> Result<T, SkillError>
where
    F: std::future::Future<Output = Result<T, SkillError>>,
{
    tokio::runtime::Runtime::new()
        .map_err(|e| SkillError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(fut)
}
