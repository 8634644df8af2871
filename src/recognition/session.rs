//! Listening session: a single toggle that starts or stops recognition.

use super::{MatchedMedia, Recognizer};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// State of a listening session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    /// Not listening.
    Idle,
    /// Waiting for the recognizer; may stay here indefinitely.
    Listening,
    /// A match was delivered and listening stopped.
    Matched,
}

impl std::fmt::Display for ListeningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "idle"),
            ListeningState::Listening => write!(f, "listening"),
            ListeningState::Matched => write!(f, "matched"),
        }
    }
}

/// Drives a [`Recognizer`] and publishes at most one match per listening run.
pub struct ListeningSession {
    recognizer: Arc<dyn Recognizer>,
    state: Arc<watch::Sender<ListeningState>>,
    matched: Arc<watch::Sender<Option<MatchedMedia>>>,
    task: Option<JoinHandle<()>>,
}

impl ListeningSession {
    /// Create an idle session around a recognizer.
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        let (state, _) = watch::channel(ListeningState::Idle);
        let (matched, _) = watch::channel(None);

        Self {
            recognizer,
            state: Arc::new(state),
            matched: Arc::new(matched),
            task: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ListeningState {
        *self.state.borrow()
    }

    /// Most recent match, if any.
    pub fn last_match(&self) -> Option<MatchedMedia> {
        self.matched.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ListeningState> {
        self.state.subscribe()
    }

    /// Start listening when idle (or after a match), stop when listening.
    ///
    /// Must be called from within a Tokio runtime. Returns the new state.
    pub fn toggle(&mut self) -> ListeningState {
        if self.state() == ListeningState::Listening {
            if let Some(task) = self.task.take() {
                task.abort();
            }
            self.state.send_replace(ListeningState::Idle);
            info!("Stopped listening");
            return ListeningState::Idle;
        }

        self.matched.send_replace(None);
        self.state.send_replace(ListeningState::Listening);
        info!("Listening for a match");

        let recognizer = self.recognizer.clone();
        let state = self.state.clone();
        let matched = self.matched.clone();

        self.task = Some(tokio::spawn(async move {
            match recognizer.recognize().await {
                Ok(Some(media)) => {
                    info!(
                        "Found match: {} by {}",
                        media.title_or_empty(),
                        media.artist_or_empty()
                    );
                    matched.send_replace(Some(media));
                    state.send_replace(ListeningState::Matched);
                }
                Ok(None) => {
                    debug!("Recognizer finished without a match, still listening");
                }
                Err(e) => {
                    warn!("Recognition failed, still listening: {}", e);
                }
            }
        }));

        ListeningState::Listening
    }

    /// Wait until the current listening run delivers a match.
    ///
    /// Never resolves if the recognizer never matches.
    pub async fn wait_for_match(&self) -> MatchedMedia {
        let mut rx = self.matched.subscribe();
        loop {
            if let Some(media) = rx.borrow_and_update().clone() {
                return media;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Drop for ListeningSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
