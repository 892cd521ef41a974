use crate::error::{Error, Result};
use crate::model::Tweet;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Contents of one `<handle>_tweets.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub handle: String,
    pub cached_at: DateTime<Utc>,
    pub tweets: Vec<Tweet>,
}

impl CacheEntry {
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.cached_at) < ttl
    }
}

/// Flat per-handle JSON files under a single directory.
#[derive(Debug, Clone)]
pub struct TweetCache {
    dir: PathBuf,
    ttl: Duration,
}

impl TweetCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn path_for(&self, handle: &str) -> PathBuf {
        self.dir.join(format!("{}_tweets.json", handle.to_lowercase()))
    }

    /// Reads the entry for `handle` regardless of age. Unreadable files count as a miss.
    pub fn load(&self, handle: &str) -> Option<CacheEntry> {
        let path = self.path_for(handle);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read cache");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache");
                None
            }
        }
    }

    pub fn load_valid(&self, handle: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let entry = self.load(handle)?;
        if entry.is_valid_at(now, self.ttl) {
            Some(entry)
        } else {
            tracing::debug!(handle, cached_at = %entry.cached_at, "cache expired");
            None
        }
    }

    pub fn store(
        &self,
        handle: &str,
        tweets: Vec<Tweet>,
        now: DateTime<Utc>,
    ) -> Result<CacheEntry> {
        let entry = CacheEntry {
            handle: handle.to_string(),
            cached_at: now,
            tweets,
        };
        let path = self.path_for(handle);
        fs::create_dir_all(&self.dir).map_err(|e| Error::cache(&self.dir, e))?;
        let json = serde_json::to_string_pretty(&entry).map_err(|e| Error::cache(&path, e))?;
        write_atomic(&path, json.as_bytes())?;
        tracing::info!(
            handle,
            tweets = entry.tweets.len(),
            path = %path.display(),
            "cached tweets"
        );
        Ok(entry)
    }

    /// Returns whether a file was removed.
    pub fn clear(&self, handle: &str) -> Result<bool> {
        let path = self.path_for(handle);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::cache(&path, e)),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|e| Error::cache(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::cache(path, e))
}
