use anyhow::{bail, Context};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_OPENAI_MODEL: &str = "gpt-4-0125-preview";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    OpenAi {
        api_key: String,
        base_url: Option<String>,
        model: String,
    },
    Ollama {
        base_url: String,
        model: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub provider: ProviderConfig,
    pub jwt_secret: String,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a local `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT is not a port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let provider = match var("LLM_PROVIDER").as_deref().unwrap_or("openai") {
            "openai" => ProviderConfig::OpenAi {
                api_key: var("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY must be set when LLM_PROVIDER=openai")?,
                base_url: var("OPENAI_BASE_URL"),
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            },
            "ollama" => ProviderConfig::Ollama {
                base_url: var("OLLAMA_API_BASE_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model: var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            },
            other => bail!("LLM_PROVIDER must be 'openai' or 'ollama', got '{other}'"),
        };

        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET must be set (copy .env.example to .env)")?;

        Ok(Self { port, provider, jwt_secret })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn openai_is_the_default_provider() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-test"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.provider,
            ProviderConfig::OpenAi {
                api_key: "sk-test".into(),
                base_url: None,
                model: "gpt-4-0125-preview".into(),
            }
        );
    }

    #[test]
    fn ollama_needs_no_key() {
        let cfg = config(&[("LLM_PROVIDER", "ollama"), ("JWT_SECRET", "s"), ("PORT", "3000")])
            .unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(
            cfg.provider,
            ProviderConfig::Ollama {
                base_url: "http://localhost:11434".into(),
                model: "llama3.2".into(),
            }
        );
    }

    #[test]
    fn rejects_missing_secrets_and_bad_values() {
        assert!(config(&[("JWT_SECRET", "s")]).is_err());
        assert!(config(&[("OPENAI_API_KEY", "k")]).is_err());
        assert!(config(&[("OPENAI_API_KEY", "k"), ("JWT_SECRET", "  ")]).is_err());
        assert!(config(&[("LLM_PROVIDER", "bard"), ("JWT_SECRET", "s")]).is_err());
        assert!(config(&[("LLM_PROVIDER", "ollama"), ("JWT_SECRET", "s"), ("PORT", "http")])
            .is_err());
    }
}
