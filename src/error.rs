use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid handle '{0}': expected 1-15 letters, digits or underscores")]
    InvalidHandle(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("API rate limit reached{}", reset_suffix(.reset))]
    RateLimited {
        reset: Option<chrono::DateTime<chrono::Utc>>,
    },
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("Cache error for {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: CacheFault,
    },
}

#[derive(Error, Debug)]
pub enum CacheFault {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors from the social-media API, including rate limits.
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api(_) | Error::RateLimited { .. })
    }

    pub(crate) fn cache(path: &std::path::Path, source: impl Into<CacheFault>) -> Self {
        Error::Cache {
            path: path.display().to_string(),
            source: source.into(),
        }
    }
}

fn reset_suffix(reset: &Option<chrono::DateTime<chrono::Utc>>) -> String {
    match reset {
        Some(at) => format!(", resets at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => String::new(),
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Api(e.to_string())
    }
}
