use querent_core::{QuerentError, QuerentResult};
use serde::{Deserialize, Serialize};

/// Chat-completions provider. All of them speak the OpenAI wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Zhipu AI (GLM models), OpenAI-compatible endpoint.
    #[default]
    Zhipu,
    /// OpenAI.
    OpenAi,
    /// OpenRouter, which also gets attribution headers.
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible API.
    Groq,
}

impl LlmProvider {
    /// Environment variable consulted for the credential when none is configured.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Zhipu => "ZHIPUAI_API_KEY",
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::Groq => "GROQ_API_KEY",
        }
    }
}

/// Which model to call and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider; decides the default base URL and credential variable.
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name sent in each request.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Inline credential. Prefer `api_key_env` outside of tests.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Overrides the provider's default credential variable.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Base URL override, e.g. a proxy or a local server.
    pub api_base_url: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion token cap per turn.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Model turns allowed before the run fails.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

fn default_model_id() -> String {
    "glm-4".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_turns() -> u32 {
    10
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model_id: default_model_id(),
            api_key: None,
            api_key_env: None,
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_turns: default_max_turns(),
        }
    }
}

impl ModelConfig {
    /// Versioned API root; `/chat/completions` is appended to it.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url.trim_end_matches('/')
        } else {
            match self.provider {
                LlmProvider::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
                LlmProvider::OpenAi => "https://api.openai.com/v1",
                LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
                LlmProvider::Groq => "https://api.groq.com/openai/v1",
            }
        }
    }

    /// Name of the variable holding the credential.
    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_key_env())
    }

    /// Resolve the credential: inline key first, then the environment.
    pub fn resolve_api_key(&self) -> QuerentResult<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }

        let var = self.api_key_env();
        match std::env::var(var) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(QuerentError::Config(format!(
                "{var} environment variable not set"
            ))),
        }
    }
}
