//! Audio identification boundary.
//!
//! Fingerprint matching itself is an external capability; this module defines the record
//! it produces, the trait a recognizer implements, and the listening session that toggles
//! recognition on and off.

mod file;
mod session;

pub use file::FileRecognizer;
pub use session::{ListeningSession, ListeningState};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Metadata for the best match of a captured audio sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedMedia {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub subtitle: Option<String>,
    #[serde(rename = "albumArtURL")]
    pub album_art_url: Option<Url>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl MatchedMedia {
    /// Record shown before anything has been matched.
    pub fn placeholder() -> Self {
        Self {
            title: Some("Title...".to_string()),
            artist_name: Some("Artist Name...".to_string()),
            subtitle: Some("Subtitle...".to_string()),
            album_art_url: None,
            genres: vec!["pop".to_string()],
        }
    }

    /// First listed genre, or `default` when there is none.
    pub fn primary_genre<'a>(&'a self, default: &'a str) -> &'a str {
        self.genres
            .iter()
            .map(|g| g.trim())
            .find(|g| !g.is_empty())
            .unwrap_or(default)
    }

    /// Title, or the empty string.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Performing artist, or the empty string.
    pub fn artist_or_empty(&self) -> &str {
        self.artist_name.as_deref().unwrap_or_default()
    }
}

/// Trait for audio identification services.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Listen until a match is found.
    ///
    /// `Ok(None)` means the recognizer gave up without a match; callers keep waiting.
    async fn recognize(&self) -> Result<Option<MatchedMedia>>;
}
