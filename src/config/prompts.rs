//! Prompt templates for Musitech.
//!
//! Prompts can be customized by placing an `enrichment.toml` file in the custom prompts
//! directory. Templates use `{{name}}` placeholders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub enrichment: EnrichmentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts issued by the enrichment pipeline.
///
/// Available placeholders: `title`, `artist`, `subtitle`, `artwork_url`, `genre`,
/// `composer` and (recommendation descriptions only) `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentPrompts {
    pub classical_check: String,
    pub album_title: String,
    pub composer: String,
    pub recommendation: String,
    pub recommendation_description: String,
    pub piece_description: String,
    pub historical_context: String,
    pub sound_description: String,
}

impl Default for EnrichmentPrompts {
    fn default() -> Self {
        Self {
            classical_check: "Is the piece \"{{title}}\" performed by {{artist}} classical music? \
                Answer with yes or no."
                .to_string(),

            album_title: "Which album is the song \"{{title}}\" by {{artist}} from? \
                The album artwork is at {{artwork_url}}. Reply with only the album title."
                .to_string(),

            composer: "Who wrote the piece \"{{title}}\" performed by {{artist}}? \
                Reply with only the composer's full name."
                .to_string(),

            recommendation: "Name one lesser-known {{genre}} artist or composer whose work \
                fans of {{composer}} would enjoy. Reply with only the name."
                .to_string(),

            recommendation_description: "In two or three sentences, introduce the music of \
                {{name}} to a {{genre}} listener."
                .to_string(),

            piece_description: "Write a short description of \"{{title}}\" by {{composer}} \
                for a curious listener."
                .to_string(),

            historical_context: "Describe the historical context in which \"{{title}}\" by \
                {{composer}} was created."
                .to_string(),

            sound_description: "Describe the sonic characteristics of \"{{title}}\" by \
                {{composer}}: its instrumentation, timbre and texture."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let enrichment_path = custom_path.join("enrichment.toml");
            if enrichment_path.exists() {
                let content = std::fs::read_to_string(&enrichment_path)?;
                prompts.enrichment = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single left-to-right pass: substituted values are copied verbatim and never scanned
    /// for placeholders. Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };

            match vars.get(&after[..end]) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.enrichment.classical_check.contains("{{title}}"));
        assert!(prompts.enrichment.recommendation.contains("lesser-known"));
        assert!(prompts.enrichment.recommendation_description.contains("{{name}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_substituted_values_are_not_expanded() {
        let template = "Is \"{{title}}\" by {{artist}} {{genre}}?";
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "My {{artist}} {{genre}} song".to_string());
        vars.insert("artist".to_string(), "Band".to_string());
        vars.insert("genre".to_string(), "jazz".to_string());

        for _ in 0..20 {
            assert_eq!(
                Prompts::render(template, &vars),
                "Is \"My {{artist}} {{genre}} song\" by Band jazz?"
            );
        }
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders_kept() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Odetta".to_string());

        assert_eq!(
            Prompts::render("{{name}} and {{other}} and {{name", &vars),
            "Odetta and {{other}} and {{name"
        );
    }

    #[test]
    fn test_call_site_variables_win() {
        let mut custom = HashMap::new();
        custom.insert("genre".to_string(), "baroque".to_string());
        custom.insert("tone".to_string(), "playful".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("genre".to_string(), "jazz".to_string());

        let rendered = prompts.render_with_custom("{{genre}} in a {{tone}} tone", &vars);
        assert_eq!(rendered, "jazz in a playful tone");
    }

    #[test]
    fn test_custom_dir_overrides_enrichment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("enrichment.toml"),
            "classical_check = \"Classical? {{title}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.enrichment.classical_check, "Classical? {{title}}");
        // Unspecified templates keep their defaults
        assert_eq!(
            prompts.enrichment.composer,
            EnrichmentPrompts::default().composer
        );
    }
}
