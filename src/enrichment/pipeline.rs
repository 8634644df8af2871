//! The enrichment pipeline.
//!
//! Request graph for one match:
//! 1. classification and composer lookup (issued together), album title in parallel
//! 2. composer resolution: the composer answer is kept only for classical pieces,
//!    otherwise the performing artist is used
//! 3. once resolved: piece description, historical context and sound description, plus
//!    three recommendation requests whose names each get a description request
//!
//! A failed request becomes an empty answer. Nothing is retried.

use super::{
    is_affirmative, EnrichmentField, EnrichmentResult, EnrichmentUpdate, RECOMMENDATION_COUNT,
};
use crate::completion::Completer;
use crate::config::{Prompts, Settings};
use crate::recognition::MatchedMedia;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default response budget for a single request.
const DEFAULT_MAX_TOKENS: u32 = 500;

type Vars = HashMap<String, String>;

/// Runs enrichment requests against a completion service.
pub struct Enricher {
    completer: Arc<dyn Completer>,
    prompts: Prompts,
    max_tokens: u32,
    default_genre: String,
}

impl Enricher {
    /// Create an enricher with default token budget and fallback genre.
    pub fn new(completer: Arc<dyn Completer>, prompts: Prompts) -> Self {
        Self {
            completer,
            prompts,
            max_tokens: DEFAULT_MAX_TOKENS,
            default_genre: "pop".to_string(),
        }
    }

    /// Create an enricher configured from settings.
    pub fn from_settings(
        completer: Arc<dyn Completer>,
        prompts: Prompts,
        settings: &Settings,
    ) -> Self {
        Self::new(completer, prompts)
            .with_max_tokens(settings.completion.max_tokens)
            .with_default_genre(&settings.enrichment.default_genre)
    }

    /// Set the per-request token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the genre used when a match carries none.
    pub fn with_default_genre(mut self, genre: &str) -> Self {
        self.default_genre = genre.to_string();
        self
    }

    /// Run the whole pipeline and return the collected result.
    #[instrument(skip(self, media), fields(title = %media.title_or_empty()))]
    pub async fn enrich(&self, media: &MatchedMedia) -> EnrichmentResult {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let pipeline = async move {
            self.run(media, &tx).await;
        };

        let aggregate = async {
            let mut result = EnrichmentResult::default();
            while let Some(update) = rx.recv().await {
                result.apply(update);
            }
            result
        };

        let ((), result) = tokio::join!(pipeline, aggregate);
        result
    }

    /// Run the pipeline, stopping as soon as `cancel` fires.
    ///
    /// In-flight requests are dropped on cancellation and no further updates are sent.
    pub async fn run_until_cancelled(
        &self,
        media: &MatchedMedia,
        updates: &UnboundedSender<EnrichmentUpdate>,
        cancel: &CancellationToken,
    ) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Enrichment cancelled");
            }
            _ = self.run(media, updates) => {}
        }
    }

    /// Run the pipeline, sending each field as its answer arrives.
    pub async fn run(&self, media: &MatchedMedia, updates: &UnboundedSender<EnrichmentUpdate>) {
        let vars = self.media_vars(media);
        let templates = &self.prompts.enrichment;

        let album = async {
            let prompt = self.render(&templates.album_title, &vars);
            let title = self.ask("album_title", &prompt).await;
            emit(updates, EnrichmentUpdate::AlbumTitle(title));
        };

        let commentary = async {
            let composer = self.resolve_composer(media, &vars, updates).await;

            let mut vars = vars.clone();
            vars.insert("composer".to_string(), composer);

            tokio::join!(
                self.describe_piece(&vars, updates),
                self.recommend(&vars, updates),
            );
        };

        tokio::join!(album, commentary);
        debug!("Enrichment pipeline finished");
    }

    /// Issue the originating prompt of one field again.
    ///
    /// Uses the composer already resolved in `current`, or the performing artist if the
    /// composer is not known yet.
    #[instrument(skip(self, media, current), fields(field = %field))]
    pub async fn rerun(
        &self,
        field: &EnrichmentField,
        media: &MatchedMedia,
        current: &EnrichmentResult,
    ) -> EnrichmentUpdate {
        let mut vars = self.media_vars(media);
        let composer = if current.composer_or_artist.is_empty() {
            media.artist_or_empty().to_string()
        } else {
            current.composer_or_artist.clone()
        };
        vars.insert("composer".to_string(), composer);

        let templates = &self.prompts.enrichment;
        match field {
            EnrichmentField::AlbumTitle => {
                let prompt = self.render(&templates.album_title, &vars);
                EnrichmentUpdate::AlbumTitle(self.ask("album_title", &prompt).await)
            }
            EnrichmentField::PieceDescription => {
                let prompt = self.render(&templates.piece_description, &vars);
                EnrichmentUpdate::PieceDescription(self.ask("piece_description", &prompt).await)
            }
            EnrichmentField::HistoricalContext => {
                let prompt = self.render(&templates.historical_context, &vars);
                EnrichmentUpdate::HistoricalContext(self.ask("historical_context", &prompt).await)
            }
            EnrichmentField::SoundDescription => {
                let prompt = self.render(&templates.sound_description, &vars);
                EnrichmentUpdate::SoundDescription(self.ask("sound_description", &prompt).await)
            }
            EnrichmentField::RecommendationDescription(name) => {
                vars.insert("name".to_string(), name.clone());
                let prompt = self.render(&templates.recommendation_description, &vars);
                EnrichmentUpdate::RecommendationDescription {
                    name: name.clone(),
                    description: self.ask("recommendation_description", &prompt).await,
                }
            }
        }
    }

    /// Classify the piece and settle on the composer (classical) or performer.
    ///
    /// The composer prompt is issued regardless of the classification outcome.
    async fn resolve_composer(
        &self,
        media: &MatchedMedia,
        vars: &Vars,
        updates: &UnboundedSender<EnrichmentUpdate>,
    ) -> String {
        let templates = &self.prompts.enrichment;
        let classical_prompt = self.render(&templates.classical_check, vars);
        let composer_prompt = self.render(&templates.composer, vars);

        let (verdict, composer) = tokio::join!(
            self.ask("classical_check", &classical_prompt),
            self.ask("composer", &composer_prompt),
        );

        let is_classical = is_affirmative(&verdict);
        emit(updates, EnrichmentUpdate::Classified(is_classical));

        let resolved = if is_classical {
            composer
        } else {
            media.artist_or_empty().to_string()
        };

        info!(is_classical, composer = %resolved, "Resolved composer");
        emit(updates, EnrichmentUpdate::ComposerResolved(resolved.clone()));
        resolved
    }

    async fn describe_piece(&self, vars: &Vars, updates: &UnboundedSender<EnrichmentUpdate>) {
        let templates = &self.prompts.enrichment;

        let description = async {
            let prompt = self.render(&templates.piece_description, vars);
            let text = self.ask("piece_description", &prompt).await;
            emit(updates, EnrichmentUpdate::PieceDescription(text));
        };
        let history = async {
            let prompt = self.render(&templates.historical_context, vars);
            let text = self.ask("historical_context", &prompt).await;
            emit(updates, EnrichmentUpdate::HistoricalContext(text));
        };
        let sound = async {
            let prompt = self.render(&templates.sound_description, vars);
            let text = self.ask("sound_description", &prompt).await;
            emit(updates, EnrichmentUpdate::SoundDescription(text));
        };

        tokio::join!(description, history, sound);
    }

    /// Ask for recommended names, then describe every name that came back.
    async fn recommend(&self, vars: &Vars, updates: &UnboundedSender<EnrichmentUpdate>) {
        let templates = &self.prompts.enrichment;
        let prompt = &self.render(&templates.recommendation, vars);

        // Identical prompts; the model is expected to vary its answers.
        let names: Vec<String> = join_all((0..RECOMMENDATION_COUNT).map(move |_| async move {
            let name = clean_name(&self.ask("recommendation", prompt).await);
            if !name.is_empty() {
                emit(updates, EnrichmentUpdate::RecommendedName(name.clone()));
            }
            name
        }))
        .await
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect();

        debug!("Received {} recommended names", names.len());

        join_all(names.into_iter().map(move |name| async move {
            let mut vars = vars.clone();
            vars.insert("name".to_string(), name.clone());
            let prompt = self.render(&templates.recommendation_description, &vars);
            let description = self.ask("recommendation_description", &prompt).await;
            emit(updates, EnrichmentUpdate::RecommendationDescription { name, description });
        }))
        .await;
    }

    /// Send one prompt. Failures are logged and become an empty answer.
    #[instrument(skip(self, prompt))]
    async fn ask(&self, step: &'static str, prompt: &str) -> String {
        debug!("Prompt: {}", prompt);
        match self.completer.complete(prompt, self.max_tokens).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Completion for {} failed: {}", step, e);
                String::new()
            }
        }
    }

    fn render(&self, template: &str, vars: &Vars) -> String {
        self.prompts.render_with_custom(template, vars)
    }

    fn media_vars(&self, media: &MatchedMedia) -> Vars {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), media.title_or_empty().to_string());
        vars.insert("artist".to_string(), media.artist_or_empty().to_string());
        vars.insert(
            "subtitle".to_string(),
            media.subtitle.clone().unwrap_or_default(),
        );
        vars.insert(
            "artwork_url".to_string(),
            media
                .album_art_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
        );
        vars.insert(
            "genre".to_string(),
            media.primary_genre(&self.default_genre).to_string(),
        );
        vars
    }
}

/// Reduce a one-name answer to the name: first non-empty line, no list marker, quotes or
/// trailing period.
fn clean_name(answer: &str) -> String {
    let line = answer
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    strip_list_marker(line)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '\u{201c}' || c == '\u{201d}')
        .trim_end_matches('.')
        .trim()
        .to_string()
}

fn strip_list_marker(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < line.len() {
        if let Some(stripped) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return stripped;
        }
    }
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line)
}

pub(super) fn emit(updates: &UnboundedSender<EnrichmentUpdate>, update: EnrichmentUpdate) {
    if updates.send(update).is_err() {
        debug!("Update receiver dropped, discarding update");
    }
}
