//! Environment-driven model construction.
//!
//! [`AutoModel`] is the one-stop entry point: pick a model (explicitly or by
//! preference), resolve its credentials from the environment, and get back a
//! ready [`LanguageModel`] with tool calling either native or emulated.

use std::sync::Arc;
use std::time::Duration;

use pprovider::{
    BoxedChunkStream, ChatTransport, HttpChatTransport, LanguageModel, LlmError, Message,
    ModelCapability, ModelFuture, ModelResponse, OpenAiCompatProvider, Preference,
    PromptToolEmulator, ProviderCredentials, ToolDefinition, capability, select,
};
use reqwest::Client;
use tracing::info;

/// How tool definitions reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolCallMode {
    /// Tools ride the request natively; the backend must support them.
    #[default]
    Native,
    /// Tools are rendered into the prompt and parsed back out of the text.
    /// For backends or models without native tool-calling.
    Prompt,
}

#[derive(Debug, Clone)]
pub struct AutoModelBuilder {
    model: Option<String>,
    preference: Preference,
    multimodal: bool,
    tool_call_mode: ToolCallMode,
    timeout: Duration,
    transport: Option<Arc<dyn ChatTransport>>,
}

impl AutoModelBuilder {
    fn new() -> Self {
        Self {
            model: None,
            preference: Preference::Quality,
            multimodal: false,
            tool_call_mode: ToolCallMode::default(),
            timeout: Duration::from_secs(90),
            transport: None,
        }
    }

    /// Pins a catalog model by name, bypassing preference-based selection.
    pub fn model(mut self, name: impl Into<String>) -> Self {
        self.model = Some(name.into());
        self
    }

    pub fn prefer(mut self, preference: Preference) -> Self {
        self.preference = preference;
        self
    }

    /// Restricts selection to models accepting image/video/audio input.
    pub fn multimodal(mut self, required: bool) -> Self {
        self.multimodal = required;
        self
    }

    pub fn tool_call_mode(mut self, mode: ToolCallMode) -> Self {
        self.tool_call_mode = mode;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the default HTTP transport, e.g. with a recording fake in
    /// tests or a proxying transport. `timeout` has no effect when set.
    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<AutoModel, LlmError> {
        // Best-effort: a missing .env file is not an error.
        dotenvy::dotenv().ok();

        let picked = match &self.model {
            Some(name) => capability(name)?,
            None => select(self.preference, self.multimodal)?,
        };

        let credentials = ProviderCredentials::from_env(picked.env_key_prefix)?;
        let transport: Arc<dyn ChatTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let client = Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(|err| LlmError::transport(err.to_string()))?;
                Arc::new(HttpChatTransport::new(client, credentials.base_url.clone()))
            }
        };
        let provider = OpenAiCompatProvider::new(transport, picked.model_name, credentials);

        let inner: Arc<dyn LanguageModel> = match self.tool_call_mode {
            ToolCallMode::Native => Arc::new(provider),
            ToolCallMode::Prompt => Arc::new(PromptToolEmulator::new(Arc::new(provider))),
        };

        info!(
            model = picked.name,
            provider = %picked.provider,
            mode = ?self.tool_call_mode,
            "built auto model"
        );

        Ok(AutoModel {
            inner,
            capability: picked,
        })
    }
}

/// A ready-to-use model bound to one catalog entry.
///
/// ```rust,no_run
/// use prism::{AutoModel, Preference};
///
/// let model = AutoModel::builder()
///     .prefer(Preference::Speed)
///     .build()
///     .expect("credentials are configured");
/// assert!(model.capability().speed_score >= 1);
/// ```
pub struct AutoModel {
    inner: Arc<dyn LanguageModel>,
    capability: &'static ModelCapability,
}

impl std::fmt::Debug for AutoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoModel")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

impl AutoModel {
    pub fn builder() -> AutoModelBuilder {
        AutoModelBuilder::new()
    }

    /// The catalog key of the model this instance is bound to — the name
    /// accepted by [`AutoModelBuilder::model`], not the name sent on the
    /// wire. The wire name is `capability().model_name`.
    pub fn selected_model(&self) -> &'static str {
        self.capability.name
    }

    pub fn capability(&self) -> &'static ModelCapability {
        self.capability
    }
}

impl LanguageModel for AutoModel {
    fn complete<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>> {
        self.inner.complete(messages, tools)
    }

    fn stream<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>> {
        self.inner.stream(messages, tools)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use pprovider::LlmErrorKind;

    use super::*;

    #[test]
    fn build_with_pinned_model_resolves_its_credentials() {
        unsafe {
            env::set_var("DEEPSEEK_API_KEY", "key-abc");
            env::set_var("DEEPSEEK_BASE_URL", "https://example.com/v1");
        }

        let model = AutoModel::builder()
            .model("deepseek-chat")
            .build()
            .expect("build should succeed");
        assert_eq!(model.selected_model(), "deepseek-chat");
        assert_eq!(model.capability().model_name, "deepseek-v3-1-terminus");
    }

    #[test]
    fn build_rejects_unknown_model_names() {
        let error = AutoModel::builder()
            .model("not-a-model")
            .build()
            .expect_err("unknown model should fail");
        assert_eq!(error.kind, LlmErrorKind::InvalidRequest);
    }

    #[test]
    fn build_without_credentials_names_the_missing_variable() {
        unsafe {
            env::remove_var("DOUBAO_API_KEY");
            env::remove_var("DOUBAO_BASE_URL");
        }

        let error = AutoModel::builder()
            .model("Doubao-pro-32k")
            .build()
            .expect_err("missing credentials should fail");
        assert_eq!(error.kind, LlmErrorKind::Authentication);
        assert!(error.message.contains("DOUBAO_API_KEY"));
    }

    #[test]
    fn preference_selection_lands_on_catalog_entries() {
        unsafe {
            env::set_var("QWEN_API_KEY", "key-qwen");
            env::set_var("QWEN_BASE_URL", "https://example.com/compat/v1");
        }

        let quality = AutoModel::builder()
            .prefer(Preference::Quality)
            .tool_call_mode(ToolCallMode::Prompt)
            .build()
            .expect("build should succeed");
        assert_eq!(quality.selected_model(), "qwen-max");

        let multimodal = AutoModel::builder()
            .prefer(Preference::Quality)
            .multimodal(true)
            .build()
            .expect("build should succeed");
        assert!(multimodal.capability().multimodal);
    }
}
