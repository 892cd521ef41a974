use crate::config::Config;
use crate::error::{Error, Result};
use crate::prompt::Message;
use ::llm::{
    builder::{LLMBackend, LLMBuilder},
    chat::ChatMessage,
    LLMProvider,
};
use futures::stream::StreamExt;
use std::io::Write;

/// Everything needed to reach the completion endpoint.
#[derive(Clone)]
pub struct LlmSettings {
    pub backend: String,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmSettings {
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self> {
        parse_backend(&config.llm_backend)?;
        Ok(Self {
            backend: config.llm_backend.clone(),
            model: config.llm_model.clone(),
            api_key: api_key.to_string(),
            base_url: config.llm_base_url.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

/// Backends compiled into this build. OpenRouter and similar services go through `openai`
/// with `llm_base_url` set.
pub fn parse_backend(name: &str) -> Result<LLMBackend> {
    match name.to_lowercase().as_str() {
        "google" | "gemini" => Ok(LLMBackend::Google),
        "openai" => Ok(LLMBackend::OpenAI),
        _ => Err(Error::Configuration(format!(
            "unknown llm_backend '{}': expected 'google' or 'openai'",
            name
        ))),
    }
}

fn build(
    settings: &LlmSettings,
    system_prompt: Option<String>,
) -> Result<Box<dyn LLMProvider>> {
    let mut builder = LLMBuilder::new()
        .backend(parse_backend(&settings.backend)?)
        .api_key(settings.api_key.clone())
        .model(settings.model.clone())
        .max_tokens(settings.max_tokens)
        .temperature(settings.temperature);

    if let Some(base_url) = &settings.base_url {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(system) = system_prompt {
        builder = builder.system(system);
    }

    builder
        .build()
        .map_err(|e| Error::Llm(format!("failed to build LLM ({}): {}", settings.backend, e)))
}

/// Splits off the system message; the `llm` builder takes it separately.
fn to_chat_messages(messages: &[Message]) -> (Option<String>, Vec<ChatMessage>) {
    let mut system = None;
    let mut chat = Vec::new();
    for m in messages {
        match m.role.as_str() {
            "system" => system = Some(m.content.clone()),
            "assistant" => {
                chat.push(ChatMessage::assistant().content(m.content.clone()).build())
            }
            _ => chat.push(ChatMessage::user().content(m.content.clone()).build()),
        }
    }
    (system, chat)
}

/// Sends `messages` and writes the answer to `out`, returning it as well.
pub async fn get_response(
    settings: &LlmSettings,
    messages: &[Message],
    stream: bool,
    out: &mut dyn Write,
) -> Result<String> {
    // In a test environment we return a canned response without making a network call.
    if let Ok(error) = std::env::var("MOCK_LLM_ERROR") {
        return Err(Error::Llm(error));
    }
    if let Ok(mock_content) = std::env::var("MOCK_LLM_CONTENT") {
        writeln!(out, "{}", mock_content).map_err(output_error)?;
        return Ok(mock_content);
    }
    if std::env::var("MOCK_LLM").is_ok() {
        let response_string = "This is a mocked response.".to_string();
        writeln!(out, "{}", response_string).map_err(output_error)?;
        return Ok(response_string);
    }

    let (system, chat) = to_chat_messages(messages);
    let llm = build(settings, system)?;
    tracing::info!(
        backend = %settings.backend,
        model = %settings.model,
        stream,
        "sending question"
    );

    let response_string = if stream {
        let mut chunks = llm
            .chat_stream(&chat)
            .await
            .map_err(|e| Error::Llm(format!("Chat error: {}", e)))?;
        let mut collected = String::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| Error::Llm(format!("Chat error: {}", e)))?;
            write!(out, "{}", chunk).map_err(output_error)?;
            out.flush().map_err(output_error)?;
            collected.push_str(&chunk);
        }
        writeln!(out).map_err(output_error)?;
        collected
    } else {
        let response = llm
            .chat(&chat)
            .await
            .map_err(|e| Error::Llm(format!("Chat error: {}", e)))?;
        let text = response.text().unwrap_or_default();
        if !text.trim().is_empty() {
            writeln!(out, "{}", text).map_err(output_error)?;
        }
        text
    };

    if response_string.trim().is_empty() {
        return Err(Error::Llm("the model returned an empty response".to_string()));
    }
    Ok(response_string)
}

fn output_error(e: std::io::Error) -> Error {
    Error::Llm(format!("failed to write response: {}", e))
}
