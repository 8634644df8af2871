//! End-to-end: a match arrives through a listening session and is enriched in a display
//! session, with a scripted completion service.

use async_trait::async_trait;
use musitech::completion::Completer;
use musitech::config::Prompts;
use musitech::enrichment::{DisplaySession, Enricher, EnrichmentField, RECOMMENDATION_COUNT};
use musitech::recognition::{FileRecognizer, ListeningSession, ListeningState};
use musitech::{MusitechError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Scripted {
    classical: &'static str,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(classical: &'static str) -> Self {
        Self {
            classical,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Completer for Scripted {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let answer = if prompt.contains("classical music") {
            self.classical
        } else if prompt.contains("Who wrote") {
            " Claude Debussy \n"
        } else if prompt.contains("Which album") {
            "Piano Book"
        } else if prompt.contains("lesser-known") {
            "Lili Boulanger"
        } else {
            "Some prose."
        };
        Ok(answer.to_string())
    }
}

struct Unreachable;

#[async_trait]
impl Completer for Unreachable {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(MusitechError::OpenAI("connection refused".to_string()))
    }
}

fn write_match(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("match.json");
    std::fs::write(
        &path,
        r#"{
            "title": "Clair de Lune",
            "artistName": "Lang Lang",
            "albumArtURL": "https://example.com/piano-book.jpg",
            "genres": ["classical"]
        }"#,
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_listen_then_enrich_classical_piece() {
    let dir = tempfile::tempdir().unwrap();
    let mut listening = ListeningSession::new(Arc::new(FileRecognizer::new(write_match(&dir))));

    assert_eq!(listening.toggle(), ListeningState::Listening);
    let media = tokio::time::timeout(Duration::from_secs(5), listening.wait_for_match())
        .await
        .unwrap();
    assert_eq!(media.title.as_deref(), Some("Clair de Lune"));

    let completer = Arc::new(Scripted::new("Yes"));
    let enricher = Arc::new(Enricher::new(completer.clone(), Prompts::default()));
    let session = DisplaySession::start(enricher, media);
    let result = session.wait().await;

    assert_eq!(result.is_classical, Some(true));
    assert_eq!(result.composer_or_artist, "Claude Debussy");
    assert_eq!(result.album_title, "Piano Book");
    assert_eq!(result.recommended_names, vec!["Lili Boulanger"; RECOMMENDATION_COUNT]);
    assert_eq!(result.description_for("Lili Boulanger"), Some("Some prose."));

    let prompts = completer.prompts.lock().unwrap().clone();
    let album_prompt = prompts.iter().find(|p| p.contains("Which album")).unwrap();
    assert!(album_prompt.contains("https://example.com/piano-book.jpg"));
}

#[tokio::test]
async fn test_not_classical_keeps_performer() {
    let dir = tempfile::tempdir().unwrap();
    let recognizer = FileRecognizer::new(write_match(&dir));
    let media = musitech::recognition::Recognizer::recognize(&recognizer)
        .await
        .unwrap()
        .unwrap();

    let enricher = Arc::new(Enricher::new(Arc::new(Scripted::new("No")), Prompts::default()));
    let result = DisplaySession::start(enricher, media).wait().await;

    assert_eq!(result.is_classical, Some(false));
    assert_eq!(result.composer_or_artist, "Lang Lang");
}

#[tokio::test]
async fn test_unreachable_service_leaves_fields_empty() {
    let dir = tempfile::tempdir().unwrap();
    let recognizer = FileRecognizer::new(write_match(&dir));
    let media = musitech::recognition::Recognizer::recognize(&recognizer)
        .await
        .unwrap()
        .unwrap();

    let enricher = Arc::new(Enricher::new(Arc::new(Unreachable), Prompts::default()));
    let mut session = DisplaySession::start(enricher, media);
    let result = session.wait().await;

    assert!(session.is_finished());
    assert_eq!(result.is_classical, Some(false));
    assert_eq!(result.composer_or_artist, "Lang Lang");
    assert!(result.album_title.is_empty());
    assert!(result.piece_description.is_empty());
    assert!(result.historical_context.is_empty());
    assert!(result.sound_description.is_empty());
    assert!(result.recommended_names.is_empty());

    let mut updates = session.subscribe();
    updates.borrow_and_update();
    session.rerun(EnrichmentField::HistoricalContext);
    let after = tokio::time::timeout(Duration::from_secs(5), updates.changed()).await;
    assert!(after.unwrap().is_ok());
    assert!(session.snapshot().historical_context.is_empty());

    session.close();
    assert!(session.is_closed());
}
