use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Static credentials for both remote APIs. Read once at startup, never written back.
#[derive(Clone)]
pub struct Credentials {
    pub bearer_token: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

pub fn load(config: &Config) -> Result<Credentials> {
    let keys_dir = Path::new(&config.keys_dir);
    let bearer_token = read_key(&keys_dir.join(&config.x_token_file))?;
    let llm_api_key = read_key(&keys_dir.join(&config.llm_key_file))?;
    tracing::debug!(keys_dir = %keys_dir.display(), "loaded credentials");
    Ok(Credentials {
        bearer_token,
        llm_api_key,
    })
}

fn read_key(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!(
            "could not read credential file {}: {}",
            path.display(),
            e
        ))
    })?;
    let key = contents.trim();
    if key.is_empty() {
        return Err(Error::Configuration(format!(
            "credential file {} is empty",
            path.display()
        )));
    }
    Ok(key.to_string())
}
