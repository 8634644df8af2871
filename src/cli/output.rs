//! CLI output formatting utilities.

use crate::enrichment::EnrichmentResult;
use crate::recognition::MatchedMedia;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Placeholder for a field that never arrived.
const UNAVAILABLE: &str = "(unavailable)";

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a titled block of prose.
    pub fn section(title: &str, body: &str) {
        println!("\n{}", style(title).bold());
        println!("{}", indent(or_unavailable(body), 2));
    }

    /// Print the matched media.
    pub fn media(media: &MatchedMedia) {
        println!(
            "\n{} {}",
            style(media.title.as_deref().unwrap_or("Unknown title")).bold(),
            style(format!(
                "by {}",
                media.artist_name.as_deref().unwrap_or("unknown artist")
            ))
            .dim()
        );
        if let Some(subtitle) = &media.subtitle {
            Output::kv("Subtitle", subtitle);
        }
        if !media.genres.is_empty() {
            Output::kv("Genres", &media.genres.join(", "));
        }
        if let Some(url) = &media.album_art_url {
            Output::kv("Artwork", url.as_str());
        }
    }

    /// Print a full enrichment record.
    pub fn enrichment(result: &EnrichmentResult) {
        let classical = match result.is_classical {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown",
        };

        Output::header("Overview");
        Output::kv("Classical", classical);
        Output::kv("Album", or_unavailable(&result.album_title));
        Output::kv(
            if result.is_classical == Some(true) { "Composer" } else { "Artist" },
            or_unavailable(&result.composer_or_artist),
        );

        Output::section("About the piece", &result.piece_description);
        Output::section("Historical context", &result.historical_context);
        Output::section("Sound", &result.sound_description);

        Output::header("You might also like");
        if result.recommended_names.is_empty() {
            println!("  {}", style(UNAVAILABLE).dim());
        }
        for name in &result.recommended_names {
            Output::list_item(&style(name).bold().to_string());
            let description = result.description_for(name).unwrap_or_default();
            println!("{}", indent(or_unavailable(description), 4));
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn or_unavailable(text: &str) -> &str {
    if text.trim().is_empty() {
        UNAVAILABLE
    } else {
        text
    }
}

/// Indent every line of `text` by `width` spaces.
fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb", 2), "  a\n  b");
    }

    #[test]
    fn test_or_unavailable() {
        assert_eq!(or_unavailable("  "), UNAVAILABLE);
        assert_eq!(or_unavailable("Debussy"), "Debussy");
    }
}
