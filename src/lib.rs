//! Musitech - Music identification and enrichment
//!
//! Takes the match produced by an audio identification service and enriches it with
//! generated commentary from a text completion service.
//!
//! # Overview
//!
//! Musitech allows you to:
//! - Toggle a listening session and receive one match record
//! - Classify the piece, resolve its composer (classical) or performer
//! - Generate a description, historical context and a description of its sound
//! - Get three lesser-known recommendations in the same genre, each described
//! - Chat freely with the completion service
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `completion` - Completion service abstraction (OpenAI)
//! - `recognition` - Match records, recognizers and the listening session
//! - `enrichment` - The enrichment pipeline and display sessions
//! - `chat` - Free-form chat transcript
//!
//! # Example
//!
//! ```rust,no_run
//! use musitech::completion::OpenAICompleter;
//! use musitech::config::{Prompts, Settings};
//! use musitech::enrichment::Enricher;
//! use musitech::recognition::MatchedMedia;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let completer = Arc::new(OpenAICompleter::from_settings(&settings.completion)?);
//!     let enricher = Enricher::from_settings(completer, Prompts::default(), &settings);
//!
//!     let media = MatchedMedia {
//!         title: Some("Clair de Lune".to_string()),
//!         artist_name: Some("Lang Lang".to_string()),
//!         subtitle: None,
//!         album_art_url: None,
//!         genres: vec!["Classical".to_string()],
//!     };
//!
//!     let result = enricher.enrich(&media).await;
//!     println!("Composer: {}", result.composer_or_artist);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod completion;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod openai;
pub mod recognition;

pub use error::{MusitechError, Result};
