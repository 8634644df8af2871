//! Text completion service abstraction.
//!
//! The enrichment pipeline and the chat log only ever need one operation: send a
//! natural-language prompt, get text back.

mod openai;

pub use openai::OpenAICompleter;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text completion services.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a prompt, producing at most `max_tokens` tokens of output.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}
