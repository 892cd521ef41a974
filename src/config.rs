use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_PATH: &str = "~/.x-analyser/config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keys_dir: String,
    pub x_token_file: String,
    pub llm_key_file: String,
    pub cache_dir: String,
    pub cache_ttl_hours: i64,
    pub twitter_api_base: String,
    pub max_results: u32,
    pub llm_backend: String,
    pub llm_model: String,
    pub llm_base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keys_dir: "~/.x-analyser/keys".to_string(),
            x_token_file: "x-token.txt".to_string(),
            llm_key_file: "key-llm.txt".to_string(),
            cache_dir: "~/.x-analyser/cache".to_string(),
            cache_ttl_hours: 24,
            twitter_api_base: "https://api.twitter.com/2".to_string(),
            max_results: 10,
            llm_backend: "google".to_string(),
            llm_model: "gemini-2.5-flash".to_string(),
            llm_base_url: None,
            temperature: 0.7,
            max_tokens: 1000,
            stream: false,
        }
    }
}

pub fn load() -> Result<Config> {
    let expanded_config_path = shellexpand::tilde(CONFIG_PATH);
    let config_path = Path::new(expanded_config_path.as_ref());

    let config: Config = if config_path.exists() {
        let file_contents = fs::read_to_string(config_path)?;
        serde_yaml::from_str(&file_contents)?
    } else {
        Config::default()
    };

    // The timeline endpoint rejects anything outside 5..=100.
    if !(5..=100).contains(&config.max_results) {
        anyhow::bail!(crate::Error::Configuration(format!(
            "max_results must be between 5 and 100, got {}",
            config.max_results
        )));
    }
    if config.cache_ttl_hours <= 0 {
        anyhow::bail!(crate::Error::Configuration(format!(
            "cache_ttl_hours must be positive, got {}",
            config.cache_ttl_hours
        )));
    }

    Ok(Config {
        keys_dir: shellexpand::tilde(&config.keys_dir).to_string(),
        cache_dir: shellexpand::tilde(&config.cache_dir).to_string(),
        ..config
    })
}
