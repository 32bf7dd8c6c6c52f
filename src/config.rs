use crate::prompt::Taxonomy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base64 photos from phone cameras run well past axum's 2 MiB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    /// Chat-completion API, the image is sent as a data URL.
    #[default]
    OpenAI,
    /// Generative-content API, the image is sent as mime type + bytes.
    Gemini,
}

impl ApiType {
    fn default_api_base(&self) -> &'static str {
        match self {
            ApiType::OpenAI => "https://models.github.ai/inference",
            ApiType::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ApiType::OpenAI => "gpt-4o-mini",
            ApiType::Gemini => "gemini-1.5-flash",
        }
    }

    fn default_api_key_env(&self) -> &'static str {
        match self {
            ApiType::OpenAI => "GITHUB_PAT",
            ApiType::Gemini => "GOOGLE_API_KEY",
        }
    }

    fn default_taxonomy(&self) -> Taxonomy {
        match self {
            ApiType::OpenAI => Taxonomy::Recycling,
            ApiType::Gemini => Taxonomy::ResinCode,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_type: ApiType,
    #[serde(default)]
    pub taxonomy: Option<Taxonomy>,
    #[serde(default)]
    pub llm_params: LLMParams,
    /// Largest request body the analyze routes will buffer.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

/// Upstream settings. Anything left out falls back to the provider default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMParams {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub api_key_env: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn api_base(&self) -> &str {
        self.llm_params
            .api_base
            .as_deref()
            .unwrap_or_else(|| self.api_type.default_api_base())
    }

    pub fn model(&self) -> &str {
        self.llm_params
            .model
            .as_deref()
            .unwrap_or_else(|| self.api_type.default_model())
    }

    pub fn max_tokens(&self) -> u32 {
        self.llm_params.max_tokens.unwrap_or(4000)
    }

    pub fn api_key_env(&self) -> &str {
        self.llm_params
            .api_key_env
            .as_deref()
            .unwrap_or_else(|| self.api_type.default_api_key_env())
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.taxonomy.unwrap_or_else(|| self.api_type.default_taxonomy())
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_target_github_models() {
        let config = Config::default();
        assert_eq!(config.api_type, ApiType::OpenAI);
        assert_eq!(config.api_base(), "https://models.github.ai/inference");
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.max_tokens(), 4000);
        assert_eq!(config.api_key_env(), "GITHUB_PAT");
        assert_eq!(config.taxonomy(), Taxonomy::Recycling);
        assert_eq!(config.max_body_bytes(), DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_body_limit_from_yaml() {
        let config: Config = serde_yaml::from_str("max_body_bytes: 4096\n").unwrap();
        assert_eq!(config.max_body_bytes(), 4096);
    }

    #[test]
    fn test_gemini_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_type: gemini\nllm_params:\n  model: gemini-2.0-flash\n  api_key: inline-key\n"
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.api_type, ApiType::Gemini);
        assert_eq!(config.model(), "gemini-2.0-flash");
        assert_eq!(config.api_base(), "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(config.api_key_env(), "GOOGLE_API_KEY");
        assert_eq!(config.llm_params.api_key.as_deref(), Some("inline-key"));
        assert_eq!(config.taxonomy(), Taxonomy::ResinCode);
    }

    #[test]
    fn test_explicit_taxonomy_wins() {
        let config: Config = serde_yaml::from_str("api_type: gemini\ntaxonomy: recycling\n").unwrap();
        assert_eq!(config.taxonomy(), Taxonomy::Recycling);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = Config::load_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(config.api_type, ApiType::OpenAI);
    }

    #[test]
    fn test_unknown_api_type_is_rejected() {
        assert!(serde_yaml::from_str::<Config>("api_type: anthropic\n").is_err());
    }
}
