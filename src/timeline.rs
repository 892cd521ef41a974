use crate::cache::TweetCache;
use crate::error::{Error, Result};
use crate::model::Tweet;
use crate::twitter::{ApiTweet, TweetSource};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,15}$").expect("handle pattern is valid"));

/// Tweets loaded for one handle, and where they came from.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub handle: String,
    pub tweets: Vec<Tweet>,
    pub cached_at: DateTime<Utc>,
    pub from_cache: bool,
}

/// Strips a leading `@` and surrounding whitespace, then checks the X username rules.
pub fn normalize_handle(input: &str) -> Result<String> {
    let handle = input.trim().trim_start_matches('@');
    if HANDLE_RE.is_match(handle) {
        Ok(handle.to_string())
    } else {
        Err(Error::InvalidHandle(input.trim().to_string()))
    }
}

/// Drops retweets and replies, keeping API order.
pub fn filter_originals(items: Vec<ApiTweet>, author: &str) -> Vec<Tweet> {
    items
        .into_iter()
        .filter(|t| !t.is_retweet() && !t.is_reply())
        .map(|t| Tweet::from_api(t, author))
        .collect()
}

pub async fn fetch_or_cache<S: TweetSource + ?Sized>(
    cache: &TweetCache,
    source: &S,
    handle: &str,
    max_results: u32,
    force_refresh: bool,
    now: DateTime<Utc>,
) -> Result<Timeline> {
    let handle = normalize_handle(handle)?;

    if !force_refresh {
        if let Some(entry) = cache.load_valid(&handle, now) {
            tracing::info!(handle = %handle, cached_at = %entry.cached_at, "using cached tweets");
            return Ok(Timeline {
                handle,
                tweets: entry.tweets,
                cached_at: entry.cached_at,
                from_cache: true,
            });
        }
    }

    tracing::info!(handle = %handle, force_refresh, "fetching recent tweets");
    let items = source.recent_tweets(&handle, max_results).await?;
    let fetched = items.len();
    let tweets = filter_originals(items, &handle);
    tracing::debug!(fetched, kept = tweets.len(), "filtered retweets and replies");

    if tweets.is_empty() {
        return Err(Error::Api(format!(
            "no original tweets found for @{}",
            handle
        )));
    }

    let entry = cache.store(&handle, tweets, now)?;
    Ok(Timeline {
        handle,
        tweets: entry.tweets,
        cached_at: entry.cached_at,
        from_cache: false,
    })
}
