use crate::{cache_in, fetch_time, original, FakeSource};
use anyhow::Result;
use chrono::Duration;
use std::fs;
use tempfile::tempdir;
use x_analyser::timeline::fetch_or_cache;

#[tokio::test]
async fn test_cache_reused_just_inside_window() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![original("1", "hello"), original("2", "world")]);
    let t = fetch_time();

    let first = fetch_or_cache(&cache, &source, "alice", 10, false, t).await?;
    assert!(!first.from_cache);
    assert_eq!(source.calls(), 1);

    let later = t + Duration::hours(23) + Duration::minutes(59);
    let second = fetch_or_cache(&cache, &source, "alice", 10, false, later).await?;
    assert!(second.from_cache);
    assert_eq!(second.cached_at, t);
    assert_eq!(second.tweets, first.tweets);
    assert_eq!(source.calls(), 1);

    Ok(())
}

#[tokio::test]
async fn test_refetch_just_outside_window() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![original("1", "hello")]);
    let t = fetch_time();

    fetch_or_cache(&cache, &source, "alice", 10, false, t).await?;

    let later = t + Duration::hours(24) + Duration::minutes(1);
    let refreshed = fetch_or_cache(&cache, &source, "alice", 10, false, later).await?;
    assert!(!refreshed.from_cache);
    assert_eq!(refreshed.cached_at, later);
    assert_eq!(source.calls(), 2);
    assert_eq!(cache.load("alice").unwrap().cached_at, later);

    Ok(())
}

#[tokio::test]
async fn test_fetch_within_window_leaves_file_untouched() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![original("1", "one"), original("2", "two")]);
    let t = fetch_time();

    fetch_or_cache(&cache, &source, "alice", 10, false, t).await?;
    let before = fs::read(cache.path_for("alice"))?;

    for minutes in [1, 90, 600, 1439] {
        fetch_or_cache(&cache, &source, "alice", 10, false, t + Duration::minutes(minutes))
            .await?;
    }

    let after = fs::read(cache.path_for("alice"))?;
    assert_eq!(before, after);
    assert_eq!(source.calls(), 1);

    Ok(())
}

#[tokio::test]
async fn test_forced_refresh_bypasses_valid_cache() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![original("1", "one")]);
    let t = fetch_time();

    fetch_or_cache(&cache, &source, "alice", 10, false, t).await?;
    let forced = fetch_or_cache(&cache, &source, "alice", 10, true, t + Duration::hours(1)).await?;

    assert!(!forced.from_cache);
    assert_eq!(source.calls(), 2);

    Ok(())
}

#[tokio::test]
async fn test_handle_case_shares_one_cache_file() -> Result<()> {
    let dir = tempdir()?;
    let cache = cache_in(dir.path());
    let source = FakeSource::new(vec![original("1", "one")]);
    let t = fetch_time();

    fetch_or_cache(&cache, &source, "@Alice", 10, false, t).await?;
    let again = fetch_or_cache(&cache, &source, "alice", 10, false, t).await?;

    assert!(again.from_cache);
    assert_eq!(source.calls(), 1);
    assert!(dir.path().join("alice_tweets.json").exists());

    Ok(())
}
