//! Pre-flight checks before contacting external services.
//!
//! Validates configuration up front so a command fails with a hint instead of leaving
//! every field of a result silently empty.

use crate::config::Settings;
use crate::error::{MusitechError, Result};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Enrichment requires an API key.
    Enrich,
    /// Listening requires a readable match file and an API key.
    Listen { match_file: &'a Path },
    /// Chat requires an API key.
    Chat,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Enrich | Operation::Chat => {
            check_api_key(settings)?;
        }
        Operation::Listen { match_file } => {
            check_match_file(match_file)?;
            check_api_key(settings)?;
        }
    }
    Ok(())
}

/// Check that the configured API key variable holds a key.
fn check_api_key(settings: &Settings) -> Result<()> {
    if settings.completion.api_key().is_some() {
        return Ok(());
    }

    let var = &settings.completion.api_key_env;
    let problem = if std::env::var_os(var).is_some() {
        "is empty"
    } else {
        "not set"
    };
    Err(MusitechError::Config(format!(
        "{} {}. Set it with: export {}='sk-...'",
        var, problem, var
    )))
}

fn check_match_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MusitechError::InvalidInput(format!(
            "Match file not found: {}",
            path.display()
        )))
    }
}
