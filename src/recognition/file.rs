//! Recognizer backed by a JSON match record on disk.

use super::{MatchedMedia, Recognizer};
use crate::error::{MusitechError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Reads a previously captured match record instead of listening to a microphone.
pub struct FileRecognizer {
    path: PathBuf,
}

impl FileRecognizer {
    /// Create a recognizer for the given match file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the match file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Recognizer for FileRecognizer {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn recognize(&self) -> Result<Option<MatchedMedia>> {
        if !self.path.exists() {
            return Err(MusitechError::Recognition(format!(
                "Match file not found: {}",
                self.path.display()
            )));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            debug!("Match file is empty, no match");
            return Ok(None);
        }

        let media: MatchedMedia = serde_json::from_str(&content)?;
        debug!("Loaded match: {:?}", media.title);
        Ok(Some(media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_match_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        std::fs::write(
            &path,
            r#"{"title": "So What", "artistName": "Miles Davis", "genres": ["Jazz"]}"#,
        )
        .unwrap();

        let media = FileRecognizer::new(&path).recognize().await.unwrap().unwrap();
        assert_eq!(media.title.as_deref(), Some("So What"));
        assert_eq!(media.primary_genre("pop"), "Jazz");
    }

    #[tokio::test]
    async fn test_empty_file_is_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        std::fs::write(&path, "\n").unwrap();

        assert!(FileRecognizer::new(&path).recognize().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileRecognizer::new(dir.path().join("nope.json")).recognize().await;
        assert!(matches!(result, Err(MusitechError::Recognition(_))));
    }
}
