//! OpenAI completion implementation.

use super::Completer;
use crate::config::{CompletionEndpoint, CompletionSettings};
use crate::error::{MusitechError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, CreateCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-backed completer.
pub struct OpenAICompleter {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    endpoint: CompletionEndpoint,
    model: String,
    temperature: f32,
}

impl OpenAICompleter {
    /// Create a completer from completion settings.
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self> {
        Ok(Self::with_client(
            create_client(settings)?,
            settings.endpoint,
            &settings.model,
            settings.temperature,
        ))
    }

    /// Create a completer around an existing client.
    pub fn with_client(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        endpoint: CompletionEndpoint,
        model: &str,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            endpoint,
            model: model.to_string(),
            temperature,
        }
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_chat(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| MusitechError::Completion(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| MusitechError::Completion(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MusitechError::OpenAI(format!("Chat completion failed: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(MusitechError::EmptyResponse)
    }

    async fn complete_text(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = CreateCompletionRequestArgs::default()
            .model(&self.model)
            .prompt(prompt)
            .max_tokens(max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| MusitechError::Completion(e.to_string()))?;

        let response = self
            .client
            .completions()
            .create(request)
            .await
            .map_err(|e| MusitechError::OpenAI(format!("Text completion failed: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(MusitechError::EmptyResponse)
    }
}

#[async_trait]
impl Completer for OpenAICompleter {
    #[instrument(skip(self, prompt), fields(model = %self.model, endpoint = %self.endpoint))]
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        debug!("Sending prompt: {}", prompt);

        let text = match self.endpoint {
            CompletionEndpoint::Chat => self.complete_chat(prompt, max_tokens).await?,
            CompletionEndpoint::Completions => self.complete_text(prompt, max_tokens).await?,
        };

        debug!("Received {} characters", text.len());
        Ok(text)
    }
}
