//! Configuration module for Musitech.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{EnrichmentPrompts, Prompts};
pub use settings::{
    CompletionEndpoint, CompletionSettings, EnrichmentSettings, GeneralSettings,
    PromptSettings, Settings,
};
