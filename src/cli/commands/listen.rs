//! Listen command implementation.

use super::enrich::present;
use crate::cli::preflight::{self, Operation};
use crate::cli::{DisplayArgs, Output};
use crate::config::Settings;
use crate::recognition::{FileRecognizer, ListeningSession, ListeningState};
use anyhow::Result;
use std::sync::Arc;

/// Run the listen command.
pub async fn run_listen(match_file: &str, display: DisplayArgs, settings: Settings) -> Result<()> {
    let recognizer = FileRecognizer::new(Settings::expand_path(match_file));

    let operation = Operation::Listen {
        match_file: recognizer.path(),
    };
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mut session = ListeningSession::new(Arc::new(recognizer));
    session.toggle();

    let spinner = (!display.json).then(|| Output::spinner("Listening... (Ctrl-C to stop)"));

    let media = tokio::select! {
        media = session.wait_for_match() => Some(media),
        _ = tokio::signal::ctrl_c() => None,
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let Some(media) = media else {
        if session.state() == ListeningState::Listening {
            session.toggle();
        }
        Output::info("Stopped listening.");
        return Ok(());
    };

    if !display.json {
        Output::success("Found a match!");
    }

    present(media, display, &settings).await
}
