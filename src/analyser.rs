use crate::cache::TweetCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::keys::Credentials;
use crate::llm::{self, LlmSettings};
use crate::prompt;
use crate::timeline::{self, Timeline};
use crate::twitter::{FixtureSource, TweetSource, TwitterClient};
use chrono::{Duration, Utc};
use std::io::Write;

/// Ties the fetcher, the cache and the LLM client together for one run.
pub struct Analyser {
    cache: TweetCache,
    source: Box<dyn TweetSource>,
    llm: LlmSettings,
    max_results: u32,
    stream: bool,
}

impl Analyser {
    pub fn new(
        cache: TweetCache,
        source: Box<dyn TweetSource>,
        llm: LlmSettings,
        max_results: u32,
        stream: bool,
    ) -> Self {
        Self {
            cache,
            source,
            llm,
            max_results,
            stream,
        }
    }

    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        let ttl = Duration::try_hours(config.cache_ttl_hours).ok_or_else(|| {
            Error::Configuration(format!(
                "cache_ttl_hours out of range: {}",
                config.cache_ttl_hours
            ))
        })?;
        let cache = TweetCache::new(&config.cache_dir, ttl);

        let source: Box<dyn TweetSource> = match std::env::var("MOCK_TWITTER_TIMELINE") {
            Ok(path) => Box::new(FixtureSource::new(path)),
            Err(_) => Box::new(TwitterClient::new(
                &config.twitter_api_base,
                &credentials.bearer_token,
            )?),
        };

        let llm = LlmSettings::from_config(config, &credentials.llm_api_key)?;
        Ok(Self::new(cache, source, llm, config.max_results, config.stream))
    }

    pub fn set_stream(&mut self, stream: bool) {
        self.stream = stream;
    }

    pub async fn timeline(&self, handle: &str, force_refresh: bool) -> Result<Timeline> {
        timeline::fetch_or_cache(
            &self.cache,
            self.source.as_ref(),
            handle,
            self.max_results,
            force_refresh,
            Utc::now(),
        )
        .await
    }

    /// Returns the normalised handle and whether a cache file was removed.
    pub fn clear_cache(&self, handle: &str) -> Result<(String, bool)> {
        let handle = timeline::normalize_handle(handle)?;
        let removed = self.cache.clear(&handle)?;
        Ok((handle, removed))
    }

    /// Asks one question about `timeline`, writing the answer to `out`.
    pub async fn ask(
        &self,
        timeline: &Timeline,
        question: &str,
        out: &mut dyn Write,
    ) -> Result<String> {
        if timeline.tweets.is_empty() {
            return Err(Error::Llm(format!(
                "no tweets loaded for @{}",
                timeline.handle
            )));
        }
        let messages =
            prompt::build_prompt_messages(&timeline.handle, &timeline.tweets, question)?;
        llm::get_response(&self.llm, &messages, self.stream, out).await
    }
}

/// Human-readable description of where a timeline came from.
pub fn describe(timeline: &Timeline) -> String {
    let when = timeline.cached_at.format("%Y-%m-%d %H:%M:%S UTC");
    if timeline.from_cache {
        format!(
            "Using {} cached tweets for @{} from {}",
            timeline.tweets.len(),
            timeline.handle,
            when
        )
    } else {
        format!(
            "Fetched {} tweets for @{} at {}",
            timeline.tweets.len(),
            timeline.handle,
            when
        )
    }
}
