use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const USER_AGENT: &str = concat!("x-analyser/", env!("CARGO_PKG_VERSION"));
const TWEET_FIELDS: &str = "created_at,public_metrics,referenced_tweets,in_reply_to_user_id,author_id";

/// Envelope shared by every X API v2 response.
#[derive(Debug, Deserialize)]
pub struct Response<Data> {
    pub data: Option<Data>,
    #[serde(default)]
    pub errors: Vec<Problem>,
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub struct Problem {
    pub title: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub result_count: Option<i64>,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// A timeline item as returned by the API, before filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTweet {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Option<String>,
    pub in_reply_to_user_id: Option<String>,
    #[serde(default)]
    pub referenced_tweets: Vec<ReferencedTweet>,
    #[serde(default)]
    pub public_metrics: PublicMetrics,
}

impl ApiTweet {
    pub fn is_retweet(&self) -> bool {
        self.referenced_tweets.iter().any(|r| r.kind == "retweeted")
            || self.text.starts_with("RT @")
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to_user_id.is_some()
            || self.referenced_tweets.iter().any(|r| r.kind == "replied_to")
    }
}

/// Where recent tweets for a handle come from.
#[async_trait]
pub trait TweetSource: Send + Sync {
    async fn recent_tweets(&self, handle: &str, max_results: u32) -> Result<Vec<ApiTweet>>;
}

#[derive(Debug, Clone)]
pub struct TwitterClient {
    api_base: String,
    client: Client,
}

impl TwitterClient {
    pub fn new(api_base: &str, bearer_token: &str) -> Result<TwitterClient> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", bearer_token))
            .map_err(|_| Error::Configuration("bearer token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(TwitterClient {
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn user_by_handle(&self, handle: &str) -> Result<User> {
        let response: Response<User> = self
            .get(&format!("/users/by/username/{}", handle), &[])
            .await?;
        response.data.ok_or_else(|| {
            let fallback = format!("user @{} not found", handle);
            Error::Api(describe_problems(&response.errors, &fallback))
        })
    }

    pub async fn user_tweets(&self, user_id: &str, max_results: u32) -> Result<Vec<ApiTweet>> {
        let max_results = max_results.to_string();
        let response: Response<Vec<ApiTweet>> = self
            .get(
                &format!("/users/{}/tweets", user_id),
                &[
                    ("max_results", max_results.as_str()),
                    ("tweet.fields", TWEET_FIELDS),
                    ("exclude", "retweets,replies"),
                ],
            )
            .await?;
        if response.data.is_none() && !response.errors.is_empty() {
            return Err(Error::Api(describe_problems(
                &response.errors,
                "timeline unavailable",
            )));
        }
        Ok(response.data.unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Response<T>> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = response
                .headers()
                .get("x-rate-limit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
            return Err(Error::RateLimited { reset });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(Error::Api(format!("HTTP {} from {}: {}", status, path, body)));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TweetSource for TwitterClient {
    async fn recent_tweets(&self, handle: &str, max_results: u32) -> Result<Vec<ApiTweet>> {
        let user = self.user_by_handle(handle).await?;
        tracing::info!(handle, user_id = %user.id, "resolved user");
        self.user_tweets(&user.id, max_results).await
    }
}

/// Serves a saved timeline response from disk instead of the network.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TweetSource for FixtureSource {
    async fn recent_tweets(&self, handle: &str, max_results: u32) -> Result<Vec<ApiTweet>> {
        tracing::info!(handle, fixture = %self.path.display(), "serving timeline fixture");
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Api(format!("fixture {}: {}", self.path.display(), e)))?;
        let response: Response<Vec<ApiTweet>> = serde_json::from_str(&contents)
            .map_err(|e| Error::Api(format!("fixture {}: {}", self.path.display(), e)))?;
        let mut tweets = response.data.unwrap_or_default();
        tweets.truncate(max_results as usize);
        Ok(tweets)
    }
}

fn describe_problems(problems: &[Problem], fallback: &str) -> String {
    let details: Vec<&str> = problems
        .iter()
        .filter_map(|p| p.detail.as_deref().or(p.title.as_deref()))
        .collect();
    if details.is_empty() {
        fallback.to_string()
    } else {
        details.join("; ")
    }
}
