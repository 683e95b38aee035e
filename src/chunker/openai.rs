//! Remote chunker backed by an OpenAI-compatible chat completions API
//!
//! The model receives the article markup and a system prompt describing the
//! chunking rules, and answers with a JSON object `{"results": [string]}`.

use crate::chunker::{Chunk, ChunkParser, ChunkerError};
use crate::config::{read_api_key, Config, OpenAiConfig};
use crate::{ConfigError, HarvestError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Builds the default system prompt for a given chunk size ceiling
pub fn default_prompt(chunk_size_limit: usize) -> String {
    format!(
        "Parse the given HTML content, extract its text and return it as a list of chunks.\n\
         Follow these rules:\n\
         - Keep related text from the same part of the page in the same chunk.\n\
         - Ignore images, videos and other non-text content.\n\
         - Drop all HTML tags and attributes.\n\
         - Do not add extra spaces or blank lines.\n\
         - A chunk must not exceed {} characters.\n\
         - List items that belong together form a single chunk even if it exceeds the limit. \
         This rule is important and must always be followed.\n\
         - Answer with a JSON object whose `results` key holds the list of chunk strings.",
        chunk_size_limit
    )
}

/// Chunker that delegates to a chat model
#[derive(Debug, Clone)]
pub struct OpenAiChunker {
    client: Client,
    endpoint: String,
    model: String,
    prompt: String,
}

impl OpenAiChunker {
    /// Creates a remote chunker
    ///
    /// # Arguments
    ///
    /// * `config` - The `[openai]` table
    /// * `api_key` - Bearer token for the API
    /// * `chunk_size_limit` - Ceiling embedded in the default prompt
    pub fn new(
        config: &OpenAiConfig,
        api_key: &str,
        chunk_size_limit: usize,
    ) -> Result<Self, HarvestError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingCredential(config.api_key_env.clone()).into());
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            ConfigError::Validation("API key contains invalid header characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            prompt: default_prompt(chunk_size_limit),
        })
    }

    /// Creates a remote chunker, reading the API key from the environment
    ///
    /// # Returns
    ///
    /// * `Ok(OpenAiChunker)` - The key was found
    /// * `Err(HarvestError::Config)` - The key variable is unset or blank
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let api_key = read_api_key(&config.openai)?;
        Self::new(
            &config.openai,
            &api_key,
            config.chunker.chunk_size + config.chunker.chunk_size_buffer,
        )
    }

    /// Replaces the system prompt
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The system prompt sent with every request
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[async_trait]
impl ChunkParser for OpenAiChunker {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn parse(&self, fragment: &str, url: &str) -> Result<Vec<Chunk>, ChunkerError> {
        let request = ChatRequest {
            model: &self.model,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.prompt,
                },
                ChatMessage {
                    role: "user",
                    content: fragment,
                },
            ],
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ChunkerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChunkerError::MalformedResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ChunkerError::MalformedResponse("response has no message content".to_string())
            })?;

        let parsed: ChunkResults = serde_json::from_str(&content).map_err(|e| {
            ChunkerError::MalformedResponse(format!("content is not a results object: {}", e))
        })?;

        tracing::debug!(url, chunks = parsed.results.len(), "Remote chunker answered");

        Ok(parsed
            .results
            .into_iter()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .map(|text| Chunk::from_text(text, url))
            .collect())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkResults {
    results: Vec<String>,
}
