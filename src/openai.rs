//! OpenAI client configuration.
//!
//! The credential is always supplied by the caller's configuration; nothing is embedded.

use crate::config::CompletionSettings;
use crate::error::{MusitechError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client from completion settings.
///
/// Fails with a configuration error when the API key variable is unset or empty.
pub fn create_client(settings: &CompletionSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = settings.api_key().ok_or_else(|| {
        MusitechError::Config(format!(
            "{} not set. Set it with: export {}='sk-...'",
            settings.api_key_env, settings.api_key_env
        ))
    })?;

    create_client_with_key(
        &api_key,
        settings.api_base.as_deref(),
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create an OpenAI client with an explicit key, optional base URL and timeout.
pub fn create_client_with_key(
    api_key: &str,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
