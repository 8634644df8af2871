//! Interactive chat command.

use super::build_completer;
use crate::chat::ChatLog;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mut log = ChatLog::new(build_completer(&settings)?, settings.completion.max_tokens);

    println!("\n{}", style("Musitech Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type a message, or 'exit' to quit. Use 'clear' to reset the transcript.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("Me:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            log.clear();
            Output::info("Transcript cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let reply = log.send(input).await;
        spinner.finish_and_clear();

        match reply {
            Ok(Some(entry)) => {
                println!("\n{} {}\n", style("Assistant:").cyan().bold(), entry.text);
            }
            Ok(None) => continue,
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
