use crate::error::{Error, Result};
use crate::model::Tweet;
use minijinja::Environment;
use serde::Serialize;

const SYSTEM_TEMPLATE: &str = include_str!("../prompts/system.j2");
const QUESTION_TEMPLATE: &str = include_str!("../prompts/question.j2");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct TweetContext<'a> {
    date: String,
    text: &'a str,
    likes: u64,
    replies: u64,
    retweets: u64,
    quotes: u64,
}

impl<'a> From<&'a Tweet> for TweetContext<'a> {
    fn from(tweet: &'a Tweet) -> Self {
        Self {
            date: tweet.created_at.format("%Y-%m-%d %H:%M").to_string(),
            text: &tweet.text,
            likes: tweet.metrics.like_count,
            replies: tweet.metrics.reply_count,
            retweets: tweet.metrics.retweet_count,
            quotes: tweet.metrics.quote_count,
        }
    }
}

/// Builds the system message and the single user message carrying the tweet context.
pub fn build_prompt_messages(
    handle: &str,
    tweets: &[Tweet],
    question: &str,
) -> Result<Vec<Message>> {
    #[derive(Serialize)]
    struct PromptContext<'a> {
        handle: &'a str,
        question: &'a str,
        tweets: Vec<TweetContext<'a>>,
    }

    let mut env = Environment::new();
    env.add_template("system.j2", SYSTEM_TEMPLATE)
        .and_then(|_| env.add_template("question.j2", QUESTION_TEMPLATE))
        .map_err(render_error)?;

    let context = PromptContext {
        handle,
        question: question.trim(),
        tweets: tweets.iter().map(TweetContext::from).collect(),
    };

    let system = env
        .get_template("system.j2")
        .and_then(|t| t.render(&context))
        .map_err(render_error)?;
    let user = env
        .get_template("question.j2")
        .and_then(|t| t.render(&context))
        .map_err(render_error)?;

    Ok(vec![
        Message {
            role: "system".to_string(),
            content: system,
        },
        Message {
            role: "user".to_string(),
            content: user,
        },
    ])
}

fn render_error(e: minijinja::Error) -> Error {
    Error::Llm(format!("failed to render prompt: {}", e))
}
