//! Prompt-driven extraction through an OpenAI-compatible chat API

use crate::config::{ExtractorSettings, GraphConfig};
use crate::crawler::{select_text, PageContent};
use crate::extractor::{ContentExtractor, ExtractError, Extracted};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You extract information from web pages. \
Follow the user's instruction using only the supplied page content. \
Reply with a JSON object for structured data, a JSON array of URLs for link lists, \
or plain text otherwise.";

/// Sends page text and the request prompt to a chat-completions endpoint
#[derive(Clone)]
pub struct LlmExtractor {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_input_chars: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmExtractor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_settings(api_key, &ExtractorSettings::default())
    }

    /// Builds an extractor reading its API key from the configured environment variable
    pub fn from_settings(settings: &ExtractorSettings) -> Result<Self, ExtractError> {
        let api_key = std::env::var(&settings.api_key_env)
            .map_err(|_| ExtractError::Config(format!("{} not set", settings.api_key_env)))?;
        Ok(Self::with_settings(api_key, settings))
    }

    fn with_settings(api_key: impl Into<String>, settings: &ExtractorSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_input_chars: settings.max_input_chars,
        }
    }

    /// Set a custom base URL (proxies, local inference servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn user_message(&self, page: &PageContent, config: &GraphConfig) -> Result<String, ExtractError> {
        let content = match config.css_selector() {
            Some(selector) => select_text(&page.html, selector)
                .ok_or_else(|| ExtractError::Selector(selector.to_string()))?,
            None => page.text.clone(),
        };
        let content: String = content.chars().take(self.max_input_chars).collect();

        let mut message = format!("Instruction: {}\n\nPage URL: {}\n", config.prompt(), page.url);
        if let Some(title) = &page.title {
            message.push_str(&format!("Title: {}\n", title));
        }
        message.push_str("\nContent:\n");
        message.push_str(&content);
        Ok(message)
    }

    /// Sends one chat request, bounded by the request's timeout
    async fn chat(&self, config: &GraphConfig, user: String) -> Result<String, ExtractError> {
        let request = ChatRequest {
            model: config.model().unwrap_or(&self.model),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: config.temperature().unwrap_or(self.temperature),
            max_tokens: config.max_tokens().unwrap_or(self.max_tokens),
        };

        let timeout = config.timeout();
        let timed_out = |e: reqwest::Error| {
            if e.is_timeout() {
                ExtractError::Timeout(timeout)
            } else {
                ExtractError::Request(e)
            }
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(timed_out)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(timed_out)?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ExtractError::EmptyResponse)
    }
}

impl std::fmt::Debug for LlmExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmExtractor")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ContentExtractor for LlmExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn extract(
        &self,
        page: &PageContent,
        config: &GraphConfig,
    ) -> Result<Extracted, ExtractError> {
        let user = self.user_message(page, config)?;

        tracing::debug!(
            "Prompting {} for {}",
            config.model().unwrap_or(&self.model),
            page.url
        );
        let reply = self.chat(config, user).await?;
        Ok(parse_reply(&reply))
    }
}

/// Interprets a model reply
///
/// A JSON object becomes structured data and a JSON array of strings becomes
/// a link list. Anything else, including other JSON, is kept as text.
pub(crate) fn parse_reply(reply: &str) -> Extracted {
    let body = strip_code_fence(reply.trim());

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Extracted::Structured(map),
        Ok(Value::Array(items)) if items.iter().all(Value::is_string) => Extracted::Links(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => Extracted::Text(reply.trim().to_string()),
    }
}

/// Removes a surrounding ``` fence (with optional language tag)
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}
