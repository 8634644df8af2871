//! CLI command implementations.

mod chat;
mod config;
mod enrich;
mod listen;

pub use chat::run_chat;
pub use config::run_config;
pub use enrich::run_enrich;
pub use listen::run_listen;

use crate::completion::{Completer, OpenAICompleter};
use crate::config::{Prompts, Settings};
use crate::enrichment::Enricher;
use crate::error::Result;
use std::sync::Arc;

/// Build the completion client described by the settings.
fn build_completer(settings: &Settings) -> Result<Arc<dyn Completer>> {
    Ok(Arc::new(OpenAICompleter::from_settings(&settings.completion)?))
}

/// Build an enricher with the configured prompts.
fn build_enricher(settings: &Settings) -> Result<Arc<Enricher>> {
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    Ok(Arc::new(Enricher::from_settings(
        build_completer(settings)?,
        prompts,
        settings,
    )))
}
