//! Display session: one enrichment run scoped to the lifetime of a detail view.

use super::pipeline::emit;
use super::{Enricher, EnrichmentField, EnrichmentResult, EnrichmentUpdate};
use crate::recognition::MatchedMedia;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

/// Owns a running enrichment and every re-run issued from it.
///
/// All field writes are funnelled through one aggregator task. Closing or dropping the
/// session cancels outstanding requests.
pub struct DisplaySession {
    id: Uuid,
    enricher: Arc<Enricher>,
    media: Arc<MatchedMedia>,
    reruns: mpsc::UnboundedSender<EnrichmentUpdate>,
    result: watch::Receiver<EnrichmentResult>,
    finished: watch::Receiver<bool>,
    cancel: CancellationToken,
    tasks: JoinSet<()>,
}

impl DisplaySession {
    /// Start enriching `media`. Must be called from within a Tokio runtime.
    pub fn start(enricher: Arc<Enricher>, media: MatchedMedia) -> Self {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("display_session", %id);
        let media = Arc::new(media);
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        let (result_tx, result) = watch::channel(EnrichmentResult::default());
        let (finished_tx, finished) = watch::channel(false);
        let (pipeline_tx, pipeline_rx) = mpsc::unbounded_channel();
        let (reruns, reruns_rx) = mpsc::unbounded_channel();

        info!(%id, "Starting display session for {}", media.title_or_empty());

        tasks.spawn(
            aggregate(pipeline_rx, reruns_rx, result_tx, finished_tx, cancel.clone())
                .instrument(span.clone()),
        );

        {
            let enricher = enricher.clone();
            let media = media.clone();
            let cancel = cancel.clone();
            tasks.spawn(
                async move {
                    enricher
                        .run_until_cancelled(&media, &pipeline_tx, &cancel)
                        .await;
                }
                .instrument(span),
            );
        }

        Self {
            id,
            enricher,
            media,
            reruns,
            result,
            finished,
            cancel,
            tasks,
        }
    }

    /// The match being enriched.
    pub fn media(&self) -> &MatchedMedia {
        &self.media
    }

    /// Current state of the record.
    pub fn snapshot(&self) -> EnrichmentResult {
        self.result.borrow().clone()
    }

    /// Receive the record every time a field changes.
    pub fn subscribe(&self) -> watch::Receiver<EnrichmentResult> {
        self.result.clone()
    }

    /// Whether the initial pipeline run has finished and been applied.
    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the initial pipeline run (or for the session to close) and return the record.
    ///
    /// Re-runs still in flight are not awaited.
    pub async fn wait(&self) -> EnrichmentResult {
        let mut finished = self.finished.clone();
        tokio::select! {
            _ = finished.wait_for(|done| *done) => {}
            _ = self.cancel.cancelled() => {}
        }
        self.snapshot()
    }

    /// Issue the prompt behind `field` again. The answer replaces the current value.
    ///
    /// Earlier requests for the same field are not cancelled; whichever answer arrives
    /// last wins. The returned receiver yields this request's own answer, and errors if
    /// the session closes first.
    pub fn rerun(&mut self, field: EnrichmentField) -> oneshot::Receiver<String> {
        let (answer, answer_rx) = oneshot::channel();

        if self.is_closed() {
            debug!("Session closed, ignoring re-run of {}", field);
            return answer_rx;
        }

        while self.tasks.try_join_next().is_some() {}

        info!(id = %self.id, "Re-running {}", field);

        let enricher = self.enricher.clone();
        let media = self.media.clone();
        let current = self.snapshot();
        let reruns = self.reruns.clone();
        let cancel = self.cancel.clone();

        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                update = enricher.rerun(&field, &media, &current) => {
                    let text = update.text().unwrap_or_default().to_string();
                    emit(&reruns, update);
                    if answer.send(text).is_err() {
                        debug!("Re-run answer dropped by caller");
                    }
                }
            }
        });

        answer_rx
    }

    /// Cancel everything still running. The last published record stays readable.
    pub fn close(&mut self) {
        if !self.cancel.is_cancelled() {
            info!(id = %self.id, "Closing display session");
        }
        self.cancel.cancel();
        self.tasks.abort_all();
    }
}

impl Drop for DisplaySession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Single writer for the session's record.
async fn aggregate(
    mut pipeline: mpsc::UnboundedReceiver<EnrichmentUpdate>,
    mut reruns: mpsc::UnboundedReceiver<EnrichmentUpdate>,
    result: watch::Sender<EnrichmentResult>,
    finished: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    let mut pipeline_open = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            update = pipeline.recv(), if pipeline_open => match update {
                Some(update) => {
                    result.send_modify(|r| r.apply(update));
                }
                None => {
                    pipeline_open = false;
                    finished.send_replace(true);
                    debug!("Pipeline updates drained");
                }
            },
            update = reruns.recv() => match update {
                Some(update) => {
                    result.send_modify(|r| r.apply(update));
                }
                None => break,
            },
        }
    }
}
