//! Enrich command implementation.

use super::build_enricher;
use crate::cli::preflight::{self, Operation};
use crate::cli::{DisplayArgs, MediaArgs, Output};
use crate::config::Settings;
use crate::enrichment::{DisplaySession, EnrichmentField, EnrichmentResult};
use crate::error::MusitechError;
use crate::recognition::MatchedMedia;
use anyhow::Result;
use console::style;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use url::Url;

/// JSON shape printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    media: &'a MatchedMedia,
    enrichment: &'a EnrichmentResult,
}

/// Run the enrich command.
pub async fn run_enrich(args: &MediaArgs, display: DisplayArgs, settings: Settings) -> Result<()> {
    let media = media_from_args(args)?;
    present(media, display, &settings).await
}

/// Build the matched media from a match file or individual flags.
fn media_from_args(args: &MediaArgs) -> crate::error::Result<MatchedMedia> {
    if let Some(path) = &args.match_file {
        let content = std::fs::read_to_string(Settings::expand_path(path))?;
        return Ok(serde_json::from_str(&content)?);
    }

    if args.title.is_none() && args.artist.is_none() {
        return Err(MusitechError::InvalidInput(
            "Provide --match-file or at least one of --title / --artist".to_string(),
        ));
    }

    let album_art_url = args.artwork.as_deref().map(Url::parse).transpose()?;

    Ok(MatchedMedia {
        title: args.title.clone(),
        artist_name: args.artist.clone(),
        subtitle: args.subtitle.clone(),
        album_art_url,
        genres: args.genre.clone(),
    })
}

/// Enrich `media` in a display session and render the result.
pub(super) async fn present(
    media: MatchedMedia,
    display: DisplayArgs,
    settings: &Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Enrich, settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let enricher = build_enricher(settings)?;

    if !display.json {
        Output::media(&media);
    }

    let mut session = DisplaySession::start(enricher, media);
    let result = follow(&mut session, display.json).await;

    if display.json {
        let report = Report {
            media: session.media(),
            enrichment: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    Output::enrichment(&result);

    if session.is_closed() {
        Output::warning("Interrupted; showing what arrived so far.");
        return Ok(());
    }

    if display.interactive {
        rerun_loop(&mut session).await?;
    }

    session.close();
    Ok(())
}

/// Wait for the pipeline while reporting progress. Ctrl-C closes the session.
async fn follow(session: &mut DisplaySession, quiet: bool) -> EnrichmentResult {
    let spinner = (!quiet).then(|| Output::spinner("Asking about this piece..."));
    let mut updates = session.subscribe();

    let result = loop {
        tokio::select! {
            result = session.wait() => break result,
            changed = updates.changed() => {
                if changed.is_err() {
                    break session.snapshot();
                }
                let filled = updates.borrow_and_update().filled_fields();
                if let Some(spinner) = &spinner {
                    spinner.set_message(format!(
                        "Asking about this piece... ({}/{})",
                        filled,
                        EnrichmentResult::FIELD_COUNT
                    ));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.close();
                break session.snapshot();
            }
        }
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

/// Read re-run commands until the user quits.
async fn rerun_loop(session: &mut DisplaySession) -> Result<()> {
    println!(
        "{}",
        style("Re-run a field: album, description, history, sound, rec <name>. 'quit' to leave.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("rerun>").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        let field: EnrichmentField = match input.parse() {
            Ok(field) => field,
            Err(e) => {
                Output::warning(&e);
                continue;
            }
        };

        let answer = session.rerun(field.clone());

        let spinner = Output::spinner(&format!("Re-running {}...", field));
        let answer = answer.await;
        spinner.finish_and_clear();

        let Ok(value) = answer else {
            Output::warning("Session closed.");
            break;
        };
        Output::section(&field.to_string(), &value);
        println!();
    }

    Ok(())
}
