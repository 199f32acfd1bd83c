//! Configuration shared by every skill.
//!
//! [`SkillConfig`] is built via [`SkillConfigBuilder`]. The prompts and token
//! budgets are deliberately *not* configurable: they are part of each
//! skill's behavioural contract and live in [`crate::prompts`].

use crate::error::SkillError;
use crate::vision::VisionModel;
use std::fmt;
use std::sync::Arc;

/// Model used when neither the caller nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for classification and extraction calls.
///
/// # Example
/// ```rust
/// use doc_skills::SkillConfig;
///
/// let config = SkillConfig::builder()
///     .model("gpt-4o")
///     .auto_rotate(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.model.as_deref(), Some("gpt-4o"));
/// ```
#[derive(Clone)]
pub struct SkillConfig {
    /// Model identifier, e.g. "gpt-4o-mini", "claude-sonnet-4-20250514".
    /// If None, [`DEFAULT_MODEL`] is used.
    pub model: Option<String>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// When set, the provider factory is used instead of the built-in
    /// OpenAI JSON-mode client.
    pub provider_name: Option<String>,

    /// Pre-constructed vision model. Takes precedence over everything else.
    pub vision_model: Option<Arc<dyn VisionModel>>,

    /// Sampling temperature. None leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Rotate portrait images to landscape before sending them. Default: true.
    ///
    /// Cards are usually scanned landscape; a portrait image whose height
    /// exceeds its width by more than 1.2× is assumed to be a sideways scan.
    pub auto_rotate: bool,

    /// Longest edge, in pixels, of the rasterised first PDF page. Default: 2000.
    pub max_rendered_pixels: u32,

    /// HTTP timeout for the built-in OpenAI client, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Parallel classifications in [`crate::classify::classify_batch`]. Default: 4.
    pub concurrency: usize,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            vision_model: None,
            temperature: None,
            auto_rotate: true,
            max_rendered_pixels: 2000,
            api_timeout_secs: 60,
            concurrency: 4,
        }
    }
}

impl fmt::Debug for SkillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field(
                "vision_model",
                &self.vision_model.as_ref().map(|_| "<dyn VisionModel>"),
            )
            .field("temperature", &self.temperature)
            .field("auto_rotate", &self.auto_rotate)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl SkillConfig {
    /// Create a new builder for `SkillConfig`.
    pub fn builder() -> SkillConfigBuilder {
        SkillConfigBuilder {
            config: Self::default(),
        }
    }

    /// Model identifier with the default applied.
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`SkillConfig`].
#[derive(Debug)]
pub struct SkillConfigBuilder {
    config: SkillConfig,
}

impl SkillConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn vision_model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.config.vision_model = Some(model);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn auto_rotate(mut self, v: bool) -> Self {
        self.config.auto_rotate = v;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SkillConfig, SkillError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(SkillError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(SkillError::InvalidConfig(
                "API timeout must be at least 1 second".into(),
            ));
        }
        if let Some(ref m) = c.model {
            if m.trim().is_empty() {
                return Err(SkillError::InvalidConfig("Model name is empty".into()));
            }
        }
        Ok(self.config)
    }
}
