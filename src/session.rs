use crate::analyser::{self, Analyser};
use crate::timeline::{self, Timeline};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;

const HELP: &str = "Commands:
  /tweets   list the loaded tweets
  /refresh  fetch fresh tweets, ignoring the cache
  /edit     write the question in $EDITOR
  /user     analyse a different handle
  /help     show this help
  quit      leave (also: exit, Ctrl-D)";

/// Source of interactive input. `None` means the user is done.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

enum Outcome {
    Quit,
    SwitchUser,
}

/// Runs the chat until the user quits. Starts with `handle` when given.
pub async fn run_chat(
    analyser: &Analyser,
    reader: &mut dyn LineReader,
    out: &mut dyn Write,
    mut handle: Option<String>,
) -> Result<()> {
    loop {
        let requested = match handle.take() {
            Some(h) => h,
            None => match reader.read_line("Enter Twitter/X handle: ")? {
                Some(line) if matches!(line.trim(), "quit" | "exit") => return Ok(()),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => line,
                None => return Ok(()),
            },
        };

        let handle_name = match timeline::normalize_handle(&requested) {
            Ok(h) => h,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        writeln!(out, "Checking tweets for @{}...", handle_name)?;
        let mut current = match analyser.timeline(&handle_name, false).await {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(handle = %handle_name, error = %e, "failed to load tweets");
                writeln!(out, "Failed to load tweets: {}", e)?;
                continue;
            }
        };
        writeln!(out, "{}", analyser::describe(&current))?;
        writeln!(
            out,
            "Ask anything about these tweets (/help for commands, 'quit' to exit)."
        )?;

        match question_loop(analyser, reader, out, &mut current).await? {
            Outcome::Quit => return Ok(()),
            Outcome::SwitchUser => continue,
        }
    }
}

async fn question_loop(
    analyser: &Analyser,
    reader: &mut dyn LineReader,
    out: &mut dyn Write,
    current: &mut Timeline,
) -> Result<Outcome> {
    let prompt = format!("@{}> ", current.handle);
    loop {
        let Some(line) = reader.read_line(&prompt)? else {
            return Ok(Outcome::Quit);
        };
        let input = line.trim();

        let question = match input {
            "" => continue,
            "quit" | "exit" | "/quit" | "/exit" => return Ok(Outcome::Quit),
            "/user" => return Ok(Outcome::SwitchUser),
            "/help" => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            "/tweets" => {
                for tweet in &current.tweets {
                    writeln!(out, "{}", tweet.summary_line())?;
                }
                continue;
            }
            "/refresh" => {
                match analyser.timeline(&current.handle, true).await {
                    Ok(t) => {
                        *current = t;
                        writeln!(out, "{}", analyser::describe(current))?;
                    }
                    Err(e) => writeln!(out, "Failed to refresh tweets: {}", e)?,
                }
                continue;
            }
            "/edit" => match edit::edit("") {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => continue,
                Err(e) => {
                    writeln!(out, "Could not open editor: {}", e)?;
                    continue;
                }
            },
            cmd if cmd.starts_with('/') => {
                writeln!(out, "Unknown command {}. Type /help for commands.", cmd)?;
                continue;
            }
            question => question.to_string(),
        };

        // A failed answer never ends the session.
        if let Err(e) = analyser.ask(current, &question, out).await {
            tracing::debug!(error = %e, "question failed");
            writeln!(out, "Error: {}", e)?;
        }
    }
}
