//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(
    action: &ConfigAction,
    config_path: Option<PathBuf>,
    settings: Settings,
) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::info(&format!("Config file exists: {}", config_path.display()));
                Output::info("Use --force to overwrite it with defaults.");
                return Ok(());
            }

            Settings::default().save_to(&config_path)?;
            Output::success(&format!("Created config file: {}", config_path.display()));
            Output::kv(
                "API key",
                &format!("read from ${}", Settings::default().completion.api_key_env),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), Settings::default())
            .unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[enrichment]\ndefault_genre = \"folk\"\n").unwrap();
        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), Settings::default())
            .unwrap();
        let kept = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(kept.enrichment.default_genre, "folk");

        run_config(&ConfigAction::Init { force: true }, Some(path.clone()), Settings::default())
            .unwrap();
        let reset = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reset.enrichment.default_genre, "pop");
    }
}
