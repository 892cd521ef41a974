use crate::{cache_in, fetch_time, original, reply, retweet, FakeSource, RateLimitedSource};
use anyhow::Result;
use chrono::Duration;
use std::fs;
use tempfile::tempdir;
use x_analyser::timeline::fetch_or_cache;
use x_analyser::Error;

#[tokio::test]
async fn test_three_originals_and_two_retweets_store_three() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![
        original("1", "first"),
        retweet("2"),
        original("3", "second"),
        retweet("4"),
        original("5", "third"),
    ]);

    let timeline = fetch_or_cache(&cache, &source, "alice", 10, false, fetch_time()).await?;
    assert_eq!(timeline.tweets.len(), 3);

    // Check what actually landed on disk, not just the returned value.
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(cache.path_for("alice"))?)?;
    let stored = raw["tweets"].as_array().unwrap();
    assert_eq!(stored.len(), 3);
    let ids: Vec<&str> = stored.iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", "3", "5"]);
    assert_eq!(raw["handle"], "alice");
    assert!(raw["cached_at"].as_str().unwrap().starts_with("2024-05-02T09:00:00"));

    Ok(())
}

#[tokio::test]
async fn test_no_retweet_or_reply_survives() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let mut items = Vec::new();
    for i in 0..30 {
        let id = i.to_string();
        items.push(match i % 3 {
            0 => original(&id, "plain"),
            1 => retweet(&id),
            _ => reply(&id),
        });
    }
    let flagged: Vec<String> = items
        .iter()
        .filter(|t| t.is_retweet() || t.is_reply())
        .map(|t| t.id.clone())
        .collect();
    let source = FakeSource::new(items);

    let timeline = fetch_or_cache(&cache, &source, "bob", 100, false, fetch_time()).await?;
    assert_eq!(timeline.tweets.len(), 10);
    assert!(timeline.tweets.iter().all(|t| !flagged.contains(&t.id)));
    assert!(timeline.tweets.iter().all(|t| t.author == "bob"));

    Ok(())
}

#[tokio::test]
async fn test_only_retweets_is_an_error_and_not_cached() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![retweet("1"), reply("2")]);

    let err = fetch_or_cache(&cache, &source, "carol", 10, false, fetch_time())
        .await
        .unwrap_err();
    assert!(err.is_api());
    assert!(err.to_string().contains("no original tweets found for @carol"));
    assert!(!cache.path_for("carol").exists());

    Ok(())
}

#[tokio::test]
async fn test_rate_limit_surfaces_and_keeps_old_file() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let t = fetch_time();
    fetch_or_cache(&cache, &FakeSource::new(vec![original("1", "x")]), "dave", 10, false, t)
        .await?;
    let before = fs::read(cache.path_for("dave"))?;

    // Expired, so the API is consulted, and it refuses.
    let err = fetch_or_cache(&cache, &RateLimitedSource, "dave", 10, false, t + Duration::days(2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(fs::read(cache.path_for("dave"))?, before);

    Ok(())
}

#[tokio::test]
async fn test_failed_forced_refresh_keeps_old_file() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let t = fetch_time();
    fetch_or_cache(&cache, &FakeSource::new(vec![original("1", "x")]), "erin", 10, false, t)
        .await?;
    let before = fs::read(cache.path_for("erin"))?;

    let err = fetch_or_cache(&cache, &RateLimitedSource, "erin", 10, true, t + Duration::hours(1))
        .await
        .unwrap_err();
    assert!(err.is_api());
    assert_eq!(fs::read(cache.path_for("erin"))?, before);

    // Still served from the cache afterwards.
    let timeline =
        fetch_or_cache(&cache, &RateLimitedSource, "erin", 10, false, t + Duration::hours(2))
            .await?;
    assert!(timeline.from_cache);

    Ok(())
}

#[tokio::test]
async fn test_invalid_handle_never_reaches_source() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![original("1", "x")]);

    let err = fetch_or_cache(&cache, &source, "../../etc", 10, false, fetch_time())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHandle(_)));
    assert_eq!(source.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_cache_triggers_refetch() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    fs::write(cache.path_for("erin"), "not json at all")?;
    let source = FakeSource::new(vec![original("1", "fresh")]);

    let timeline = fetch_or_cache(&cache, &source, "erin", 10, false, fetch_time()).await?;
    assert!(!timeline.from_cache);
    assert_eq!(source.calls(), 1);
    assert_eq!(cache.load("erin").unwrap().tweets[0].text, "fresh");

    Ok(())
}
