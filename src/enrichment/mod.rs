//! Enrichment of a matched piece with generated commentary.
//!
//! The [`Enricher`] issues an ordered, partially dependent set of completion requests for a
//! [`MatchedMedia`](crate::recognition::MatchedMedia) record. Every answer arrives as an
//! [`EnrichmentUpdate`] and is folded into an [`EnrichmentResult`] by a single writer.
//! [`DisplaySession`] scopes one such run (and any re-runs) to a cancellable lifetime.

mod pipeline;
mod session;

pub use pipeline::Enricher;
pub use session::DisplaySession;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of recommendation requests issued per enrichment.
pub const RECOMMENDATION_COUNT: usize = 3;

/// Whether a classification answer counts as "yes".
///
/// Case-insensitive substring match; anything else, including an empty answer, is "no".
pub fn is_affirmative(response: &str) -> bool {
    response.to_lowercase().contains("yes")
}

/// Display-ready commentary for one matched piece.
///
/// Text fields are empty until their request resolves, and stay empty if it fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub is_classical: Option<bool>,
    pub album_title: String,
    pub composer_or_artist: String,
    pub piece_description: String,
    pub historical_context: String,
    pub sound_description: String,
    pub recommended_names: Vec<String>,
    pub recommended_descriptions: BTreeMap<String, String>,
}

impl EnrichmentResult {
    /// Fold one update into the record. Later writes to the same field win.
    pub fn apply(&mut self, update: EnrichmentUpdate) {
        match update {
            EnrichmentUpdate::Classified(value) => self.is_classical = Some(value),
            EnrichmentUpdate::AlbumTitle(text) => self.album_title = text,
            EnrichmentUpdate::ComposerResolved(name) => self.composer_or_artist = name,
            EnrichmentUpdate::PieceDescription(text) => self.piece_description = text,
            EnrichmentUpdate::HistoricalContext(text) => self.historical_context = text,
            EnrichmentUpdate::SoundDescription(text) => self.sound_description = text,
            EnrichmentUpdate::RecommendedName(name) => {
                if !name.is_empty() && self.recommended_names.len() < RECOMMENDATION_COUNT {
                    self.recommended_names.push(name);
                }
            }
            EnrichmentUpdate::RecommendationDescription { name, description } => {
                self.recommended_descriptions.insert(name, description);
            }
        }
    }

    /// Number of fields that currently hold a value, out of [`EnrichmentResult::FIELD_COUNT`].
    pub fn filled_fields(&self) -> usize {
        let text = [
            &self.album_title,
            &self.composer_or_artist,
            &self.piece_description,
            &self.historical_context,
            &self.sound_description,
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .count();

        let described = self
            .recommended_descriptions
            .values()
            .filter(|d| !d.is_empty())
            .count()
            .min(RECOMMENDATION_COUNT);

        usize::from(self.is_classical.is_some()) + text + self.recommended_names.len() + described
    }

    /// Upper bound for [`EnrichmentResult::filled_fields`].
    pub const FIELD_COUNT: usize = 6 + 2 * RECOMMENDATION_COUNT;

    /// Description for a recommended name, if one has arrived.
    pub fn description_for(&self, name: &str) -> Option<&str> {
        self.recommended_descriptions.get(name).map(String::as_str)
    }

    /// Current value of a re-runnable field.
    pub fn field(&self, field: &EnrichmentField) -> Option<&str> {
        match field {
            EnrichmentField::AlbumTitle => Some(&self.album_title),
            EnrichmentField::PieceDescription => Some(&self.piece_description),
            EnrichmentField::HistoricalContext => Some(&self.historical_context),
            EnrichmentField::SoundDescription => Some(&self.sound_description),
            EnrichmentField::RecommendationDescription(name) => self.description_for(name),
        }
    }
}

/// A single field write produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentUpdate {
    Classified(bool),
    AlbumTitle(String),
    ComposerResolved(String),
    PieceDescription(String),
    HistoricalContext(String),
    SoundDescription(String),
    RecommendedName(String),
    RecommendationDescription { name: String, description: String },
}

impl EnrichmentUpdate {
    /// Text carried by the update, if it carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            EnrichmentUpdate::Classified(_) => None,
            EnrichmentUpdate::AlbumTitle(text)
            | EnrichmentUpdate::ComposerResolved(text)
            | EnrichmentUpdate::PieceDescription(text)
            | EnrichmentUpdate::HistoricalContext(text)
            | EnrichmentUpdate::SoundDescription(text)
            | EnrichmentUpdate::RecommendedName(text) => Some(text),
            EnrichmentUpdate::RecommendationDescription { description, .. } => Some(description),
        }
    }
}

/// Fields whose originating prompt can be issued again on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnrichmentField {
    AlbumTitle,
    PieceDescription,
    HistoricalContext,
    SoundDescription,
    RecommendationDescription(String),
}

impl std::str::FromStr for EnrichmentField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("rec ").or_else(|| s.strip_prefix("recommendation ")) {
            let name = name.trim();
            if name.is_empty() {
                return Err("Missing recommendation name".to_string());
            }
            return Ok(EnrichmentField::RecommendationDescription(name.to_string()));
        }

        match s.to_lowercase().as_str() {
            "album" | "album_title" => Ok(EnrichmentField::AlbumTitle),
            "description" | "piece" => Ok(EnrichmentField::PieceDescription),
            "history" | "context" | "historical_context" => Ok(EnrichmentField::HistoricalContext),
            "sound" | "timbre" => Ok(EnrichmentField::SoundDescription),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

impl std::fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichmentField::AlbumTitle => write!(f, "album title"),
            EnrichmentField::PieceDescription => write!(f, "description"),
            EnrichmentField::HistoricalContext => write!(f, "historical context"),
            EnrichmentField::SoundDescription => write!(f, "sound"),
            EnrichmentField::RecommendationDescription(name) => write!(f, "about {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative("  YES, it is a classical piece."));
        assert!(is_affirmative("eyes"));
        assert!(!is_affirmative("No"));
        assert!(!is_affirmative("Y"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_names_capped_and_blank_ignored() {
        let mut result = EnrichmentResult::default();
        for name in ["A", "", "B", "A", "C"] {
            result.apply(EnrichmentUpdate::RecommendedName(name.to_string()));
        }
        assert_eq!(result.recommended_names, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut result = EnrichmentResult::default();
        result.apply(EnrichmentUpdate::SoundDescription("bright".to_string()));
        result.apply(EnrichmentUpdate::SoundDescription(String::new()));
        assert_eq!(result.sound_description, "");

        result.apply(EnrichmentUpdate::RecommendationDescription {
            name: "Satie".to_string(),
            description: "first".to_string(),
        });
        result.apply(EnrichmentUpdate::RecommendationDescription {
            name: "Satie".to_string(),
            description: "second".to_string(),
        });
        assert_eq!(result.description_for("Satie"), Some("second"));
    }

    #[test]
    fn test_parse_field() {
        assert_eq!("album".parse(), Ok(EnrichmentField::AlbumTitle));
        assert_eq!("History".parse(), Ok(EnrichmentField::HistoricalContext));
        assert_eq!(
            "rec Lili Boulanger".parse(),
            Ok(EnrichmentField::RecommendationDescription("Lili Boulanger".to_string()))
        );
        assert!("rec  ".parse::<EnrichmentField>().is_err());
        assert!("lyrics".parse::<EnrichmentField>().is_err());
    }

    #[test]
    fn test_filled_fields() {
        let mut result = EnrichmentResult::default();
        assert_eq!(result.filled_fields(), 0);

        result.apply(EnrichmentUpdate::Classified(false));
        result.apply(EnrichmentUpdate::ComposerResolved("Nina Simone".to_string()));
        result.apply(EnrichmentUpdate::PieceDescription(String::new()));
        result.apply(EnrichmentUpdate::RecommendedName("Odetta".to_string()));
        result.apply(EnrichmentUpdate::RecommendationDescription {
            name: "Odetta".to_string(),
            description: "Folk singer.".to_string(),
        });
        assert_eq!(result.filled_fields(), 4);
        assert!(result.filled_fields() <= EnrichmentResult::FIELD_COUNT);
    }

    #[test]
    fn test_field_lookup() {
        let mut result = EnrichmentResult::default();
        result.apply(EnrichmentUpdate::AlbumTitle("Suite bergamasque".to_string()));
        assert_eq!(result.field(&EnrichmentField::AlbumTitle), Some("Suite bergamasque"));
        assert_eq!(
            result.field(&EnrichmentField::RecommendationDescription("Nobody".to_string())),
            None
        );
    }
}
