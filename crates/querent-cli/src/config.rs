use querent_agent::{ModelConfig, ResponseStrategy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level `querent.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct QuerentConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Strategy used by `POST /api/query` until changed at runtime.
    #[serde(default)]
    pub strategy: ResponseStrategy,
}

/// `[server]` table.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl QuerentConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {e}", path.display())
        })?;
        let mut config: QuerentConfig = toml::from_str(&raw)?;

        // Relative static dirs are resolved against the config file's directory.
        if config.server.static_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.server.static_dir = parent.join(&config.server.static_dir);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use querent_agent::LlmProvider;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: QuerentConfig = toml::from_str("").unwrap();
        assert_eq!(config.model.provider, LlmProvider::Zhipu);
        assert_eq!(config.model.model_id, "glm-4");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
        assert_eq!(config.strategy, ResponseStrategy::Stream);
    }

    #[test]
    fn test_full_config() {
        let config: QuerentConfig = toml::from_str(
            r#"
            strategy = "invoke"

            [model]
            provider = "openai"
            model_id = "gpt-4o-mini"
            api_key_env = "MY_KEY"
            temperature = 0.1
            max_turns = 4

            [server]
            host = "127.0.0.1"
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy, ResponseStrategy::Invoke);
        assert_eq!(config.model.provider, LlmProvider::OpenAi);
        assert_eq!(config.model.api_key_env(), "MY_KEY");
        assert_eq!(config.model.temperature, 0.1);
        assert_eq!(config.model.max_turns, 4);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let config = QuerentConfig::load(&tmp.path().join("absent.toml")).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[tokio::test]
    async fn test_load_resolves_static_dir_relative_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("querent.toml");
        std::fs::write(&path, "[server]\nstatic_dir = \"web\"\n").unwrap();

        let config = QuerentConfig::load(&path).await.unwrap();
        assert_eq!(config.server.static_dir, tmp.path().join("web"));
    }
}
