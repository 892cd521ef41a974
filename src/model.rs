use crate::twitter::{ApiTweet, PublicMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An original post kept for analysis. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub metrics: PublicMetrics,
}

impl Tweet {
    pub fn from_api(tweet: ApiTweet, author: &str) -> Self {
        Self {
            id: tweet.id,
            text: tweet.text,
            created_at: tweet.created_at,
            author: author.to_string(),
            metrics: tweet.public_metrics,
        }
    }

    /// One-line summary used by `tweets` and `/tweets`.
    pub fn summary_line(&self) -> String {
        let preview: String = self.text.chars().take(100).collect();
        let one_line = preview.replace('\n', " ");
        format!(
            "{} {:<100} ({} likes, {} replies, {} retweets)",
            self.created_at.format("%Y-%m-%d %H:%M"),
            one_line,
            self.metrics.like_count,
            self.metrics.reply_count,
            self.metrics.retweet_count
        )
    }
}
