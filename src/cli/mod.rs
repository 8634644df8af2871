//! CLI module for Musitech.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Args, Parser, Subcommand};

/// Musitech - identify music and learn about it
///
/// Takes a matched piece of music and fills in its story: what it is, where it comes from,
/// how it sounds, and who to listen to next.
#[derive(Parser, Debug)]
#[command(name = "musitech")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enrich a matched piece with generated commentary
    Enrich {
        #[command(flatten)]
        media: MediaArgs,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Listen for a match, then enrich it
    Listen {
        /// Match record (JSON) produced by the recognizer
        #[arg(short, long)]
        match_file: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Start an interactive chat session
    Chat,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where the matched media comes from.
#[derive(Args, Debug, Clone)]
pub struct MediaArgs {
    /// Match record (JSON) instead of individual fields
    #[arg(short, long, conflicts_with_all = ["title", "artist", "subtitle", "artwork", "genre"])]
    pub match_file: Option<String>,

    /// Title of the piece
    #[arg(short, long)]
    pub title: Option<String>,

    /// Performing artist
    #[arg(short, long)]
    pub artist: Option<String>,

    /// Subtitle
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Album artwork URL
    #[arg(long)]
    pub artwork: Option<String>,

    /// Genre (repeatable, first one is primary)
    #[arg(short, long)]
    pub genre: Vec<String>,
}

/// How results are presented.
#[derive(Args, Debug, Clone, Copy)]
pub struct DisplayArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep the session open to re-run individual fields
    #[arg(short, long, conflicts_with = "json")]
    pub interactive: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
