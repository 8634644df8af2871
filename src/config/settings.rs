//! Configuration settings for Musitech.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub completion: CompletionSettings,
    pub enrichment: EnrichmentSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Which OpenAI endpoint serves completions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionEndpoint {
    /// Chat completions (default).
    #[default]
    Chat,
    /// Legacy text completions.
    Completions,
}

impl std::str::FromStr for CompletionEndpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(CompletionEndpoint::Chat),
            "completions" | "legacy" | "text" => Ok(CompletionEndpoint::Completions),
            _ => Err(format!("Unknown completion endpoint: {}", s)),
        }
    }
}

impl std::fmt::Display for CompletionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionEndpoint::Chat => write!(f, "chat"),
            CompletionEndpoint::Completions => write!(f, "completions"),
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Endpoint flavour (chat, completions).
    pub endpoint: CompletionEndpoint,
    /// Model name.
    pub model: String,
    /// Maximum tokens per response.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// HTTP timeout for a single request, in seconds.
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Alternative API base URL (OpenAI-compatible servers).
    pub api_base: Option<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: CompletionEndpoint::Chat,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 120,
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_base: None,
        }
    }
}

impl CompletionSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Enrichment pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    /// Genre used for recommendations when the match carries none.
    pub default_genre: String,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            default_genre: "pop".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::MusitechError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("musitech")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.completion.max_tokens, 500);
        assert_eq!(settings.completion.endpoint, CompletionEndpoint::Chat);
        assert_eq!(settings.enrichment.default_genre, "pop");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[completion]\nendpoint = \"completions\"\nmodel = \"gpt-3.5-turbo-instruct\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.completion.endpoint, CompletionEndpoint::Completions);
        assert_eq!(settings.completion.model, "gpt-3.5-turbo-instruct");
        assert_eq!(settings.completion.max_tokens, 500);
        assert_eq!(settings.enrichment.default_genre, "pop");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.enrichment.default_genre = "jazz".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.enrichment.default_genre, "jazz");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.completion.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_endpoint_parse() {
        assert_eq!("Chat".parse::<CompletionEndpoint>(), Ok(CompletionEndpoint::Chat));
        assert_eq!(
            "legacy".parse::<CompletionEndpoint>(),
            Ok(CompletionEndpoint::Completions)
        );
        assert!("bogus".parse::<CompletionEndpoint>().is_err());
    }
}
