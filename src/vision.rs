//! The vision-model boundary: `(image, instructions) → reply text`.
//!
//! Skills only ever see the [`VisionModel`] trait, so the deterministic parts
//! (normalization, reply parsing, validation) can be exercised with an
//! in-process fake instead of a live API.
//!
//! Two implementations ship with the crate:
//!
//! * [`OpenAiVisionModel`] — talks to `/chat/completions` directly so that
//!   JSON-object mode (`response_format`) can be requested. Default when
//!   `OPENAI_API_KEY` is set.
//! * [`ProviderVisionModel`] — adapts any edgequake-llm provider (Anthropic,
//!   Gemini, Ollama, Azure …). JSON mode is passed on as
//!   `response_format: "json_object"`; providers that ignore it fall back to
//!   the prompt, and [`crate::pipeline::reply`] tolerates an outer fence.

use crate::config::SkillConfig;
use crate::error::SkillError;
use crate::pipeline::encode::NormalizedImage;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default OpenAI-compatible endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// One chat-style request: system instructions, one image, one user turn.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub image: NormalizedImage,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    /// Ask for a single JSON object reply where the API supports it.
    pub json_object: bool,
}

/// A vision-capable language model.
///
/// Implementations return the raw reply text; they must not retry, and any
/// transport or provider failure maps to [`SkillError::ModelCall`].
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider label used in logs and error messages.
    fn name(&self) -> &str;

    async fn complete(&self, request: &VisionRequest) -> Result<String, SkillError>;
}

// ── OpenAI (direct, JSON mode) ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI chat-completions client with JSON-object mode.
///
/// Holds one `reqwest::Client` for its whole lifetime; clone the `Arc` to
/// share it between skills.
#[derive(Clone)]
pub struct OpenAiVisionModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiVisionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiVisionModel")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiVisionModel {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, SkillError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SkillError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    /// Build from `OPENAI_API_KEY`, honouring `OPENAI_BASE_URL` when set.
    pub fn from_env(model: impl Into<String>, timeout_secs: u64) -> Result<Self, SkillError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SkillError::ProviderNotConfigured {
                provider: "openai".to_string(),
                hint: "Set OPENAI_API_KEY (a .env file in the working directory is read by the CLI)."
                    .to_string(),
            })?;

        let mut model = Self::new(api_key, model, timeout_secs)?;
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.is_empty() {
                model = model.with_base_url(url);
            }
        }
        Ok(model)
    }

    /// Point at an OpenAI-compatible endpoint (Azure proxy, vLLM, LiteLLM …).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body<'a>(&'a self, request: &'a VisionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(&request.system_prompt),
                },
                Message {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: request.image.data_uri(),
                            },
                        },
                        ContentPart::Text {
                            text: &request.user_prompt,
                        },
                    ]),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .json_object
                .then_some(ResponseFormat { r#type: "json_object" }),
        }
    }

    fn call_error(&self, message: String) -> SkillError {
        SkillError::ModelCall {
            provider: "openai".to_string(),
            message,
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionModel {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &VisionRequest) -> Result<String, SkillError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.call_error(format!("request timed out: {e}"))
                } else {
                    self.call_error(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.call_error(format!("HTTP {status}: {}", body.trim())));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.call_error(format!("unreadable response envelope: {e}")))?;

        if let Some(ref usage) = parsed.usage {
            debug!(
                "openai {}: {} input tokens, {} output tokens, {:?}",
                self.model,
                usage.prompt_tokens,
                usage.completion_tokens,
                start.elapsed()
            );
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| self.call_error("response contained no choices".to_string()))?;

        choice.message.content.ok_or_else(|| {
            self.call_error(format!(
                "response had no content (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })
    }
}

// ── edgequake-llm providers ──────────────────────────────────────────────────

/// Adapter from an edgequake-llm provider to [`VisionModel`].
pub struct ProviderVisionModel {
    provider: Arc<dyn LLMProvider>,
    label: String,
}

impl ProviderVisionModel {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
        }
    }
}

#[async_trait]
impl VisionModel for ProviderVisionModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: &VisionRequest) -> Result<String, SkillError> {
        let messages = vec![
            ChatMessage::system(request.system_prompt.as_str()),
            ChatMessage::user_with_images(
                request.user_prompt.as_str(),
                vec![request.image.to_image_data()],
            ),
        ];
        let options = CompletionOptions {
            temperature: request.temperature,
            max_tokens: Some(request.max_tokens),
            response_format: request.json_object.then(|| "json_object".to_string()),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| SkillError::ModelCall {
                provider: self.label.clone(),
                message: e.to_string(),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

// ── Resolution ───────────────────────────────────────────────────────────────

fn create_provider_model(name: &str, model: &str) -> Result<Arc<dyn VisionModel>, SkillError> {
    let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        SkillError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok(Arc::new(ProviderVisionModel::new(provider, name)))
}

/// Resolve the vision model, from most-specific to least-specific.
///
/// 1. **Injected model** (`config.vision_model`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) — edgequake-llm factory,
///    which reads the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **`OPENAI_API_KEY`** — built-in JSON-mode OpenAI client.
/// 5. **Auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_vision_model(config: &SkillConfig) -> Result<Arc<dyn VisionModel>, SkillError> {
    if let Some(ref model) = config.vision_model {
        return Ok(Arc::clone(model));
    }

    if let Some(ref name) = config.provider_name {
        if name.eq_ignore_ascii_case("openai") {
            return Ok(Arc::new(OpenAiVisionModel::from_env(
                config.model_or_default(),
                config.api_timeout_secs,
            )?));
        }
        return create_provider_model(name, config.model_or_default());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider_model(&prov, &model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        info!("Using OpenAI JSON mode with model {}", config.model_or_default());
        return Ok(Arc::new(OpenAiVisionModel::from_env(
            config.model_or_default(),
            config.api_timeout_secs,
        )?));
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SkillError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision model could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(Arc::new(ProviderVisionModel::new(llm_provider, "auto")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_llm::LLMResponse;

    fn sample_request(json_object: bool) -> VisionRequest {
        VisionRequest {
            system_prompt: "sys".into(),
            user_prompt: "user".into(),
            image: NormalizedImage {
                base64: "QUJD".into(),
                width: 1,
                height: 1,
            },
            max_tokens: 300,
            temperature: None,
            json_object,
        }
    }

    #[test]
    fn openai_body_shape() {
        let model = OpenAiVisionModel::new("sk-test", "gpt-4o-mini", 5).unwrap();
        let req = sample_request(true);
        let body = serde_json::to_value(model.build_body(&req)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("temperature").is_none());

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");

        let parts = &body["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "image_url");
        assert_eq!(parts[0]["image_url"]["url"], "data:image/png;base64,QUJD");
        assert_eq!(parts[1]["type"], "text");
        assert_eq!(parts[1]["text"], "user");
    }

    #[test]
    fn openai_body_without_json_mode() {
        let model = OpenAiVisionModel::new("sk-test", "gpt-4o", 5).unwrap();
        let req = sample_request(false);
        let body = serde_json::to_value(model.build_body(&req)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let model = OpenAiVisionModel::new("k", "m", 5)
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(model.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn debug_hides_api_key() {
        let model = OpenAiVisionModel::new("sk-secret", "m", 5).unwrap();
        assert!(!format!("{model:?}").contains("sk-secret"));
    }

    #[test]
    fn response_envelope_parses_null_content() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null},"finish_reason":"content_filter"}]}"#,
        )
        .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
        assert_eq!(parsed.choices[0].finish_reason.as_deref(), Some("content_filter"));
    }

    /// Keeps the options of every `chat` call and replies with a fixed body.
    #[derive(Default)]
    struct RecordingProvider {
        options: std::sync::Mutex<Vec<Option<CompletionOptions>>>,
    }

    #[async_trait]
    impl LLMProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recording-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            Ok(LLMResponse::new("{}", "recording-model"))
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.options.lock().unwrap().push(options.cloned());
            self.complete("").await
        }
    }

    #[tokio::test]
    async fn provider_adapter_forwards_json_mode() {
        let provider = Arc::new(RecordingProvider::default());
        let model = ProviderVisionModel::new(provider.clone(), "recording");

        let reply = model.complete(&sample_request(true)).await.unwrap();
        assert_eq!(reply, "{}");
        model.complete(&sample_request(false)).await.unwrap();

        let seen = provider.options.lock().unwrap();
        let json = seen[0].as_ref().unwrap();
        assert_eq!(json.response_format.as_deref(), Some("json_object"));
        assert_eq!(json.max_tokens, Some(300));

        let plain = seen[1].as_ref().unwrap();
        assert_eq!(plain.response_format, None);
    }
}
