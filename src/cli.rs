use clap::{Parser, Subcommand};

/// Ask an LLM questions about a Twitter/X user's recent tweets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Handle to analyse when starting the interactive chat
    #[arg(long)]
    pub handle: Option<String>,

    /// Stream answers as they are generated (overrides config).
    #[arg(long, global = true, conflicts_with = "no_stream")]
    pub stream: bool,

    /// Do not stream answers (overrides config).
    #[arg(long, global = true)]
    pub no_stream: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question about a user's tweets
    Ask {
        /// The handle to analyse, with or without the leading @
        handle: String,

        /// The question to ask
        question: String,

        /// Ignore the cache and fetch fresh tweets
        #[arg(long)]
        refresh: bool,
    },
    /// Fetch (or reuse cached) tweets for a user and list them
    Tweets {
        /// The handle to list tweets for
        handle: String,

        /// Ignore the cache and fetch fresh tweets
        #[arg(long)]
        refresh: bool,
    },
    /// Delete the cached tweets for a user
    ClearCache {
        /// The handle whose cache file should be removed
        handle: String,
    },
}

impl Cli {
    /// The streaming preference from the flags, if any was given.
    pub fn stream_override(&self) -> Option<bool> {
        match (self.stream, self.no_stream) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
