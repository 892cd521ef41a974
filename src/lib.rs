use clap::Parser;
use std::io::Write;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

pub mod analyser;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod keys;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod session;
pub mod timeline;
pub mod twitter;

pub use error::{Error, Result};

use analyser::Analyser;
use cli::{Cli, Command};

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = config::load()?;
    // Both keys must be present before anything touches the network.
    let credentials = keys::load(&config)?;
    let mut analyser = Analyser::from_config(&config, &credentials)?;
    if let Some(stream) = cli.stream_override() {
        analyser.set_stream(stream);
    }

    let stdout = std::io::stdout();
    match cli.command {
        Some(Command::Ask {
            handle,
            question,
            refresh,
        }) => {
            let timeline = analyser.timeline(&handle, refresh).await?;
            eprintln!("{}", analyser::describe(&timeline));
            analyser.ask(&timeline, &question, &mut stdout.lock()).await?;
        }
        Some(Command::Tweets { handle, refresh }) => {
            let timeline = analyser.timeline(&handle, refresh).await?;
            eprintln!("{}", analyser::describe(&timeline));
            let mut out = stdout.lock();
            for tweet in &timeline.tweets {
                writeln!(out, "{}", tweet.summary_line())?;
            }
        }
        Some(Command::ClearCache { handle }) => {
            let (handle, removed) = analyser.clear_cache(&handle)?;
            if removed {
                println!("Cache cleared for @{}", handle);
            } else {
                println!("No cache for @{}", handle);
            }
        }
        None => {
            let mut editor = rustyline::DefaultEditor::new()?;
            session::run_chat(&analyser, &mut editor, &mut stdout.lock(), cli.handle).await?;
            println!("\nThanks for using x-analyser!");
        }
    }

    Ok(())
}
