use async_trait::async_trait;

use crate::error::EngineError;
use crate::openai::{ChatCompletionRequest, ChatMessage, OpenAiClient};

const SYSTEM_PROMPT: &str = "You are an expert video content analyst. The user gives you a video \
title and its transcription. Write a thorough summary that captures the core message, the \
structure of the argument or story, and the main takeaways. Use plain prose without Markdown, \
lists or bullet points. Prefer accuracy over speculation, but make reasonable inferences when \
the context clearly supports them.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, text: &str) -> Result<String, EngineError>;

    /// Disabled summarizers are skipped by the worker entirely.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Summarization turned off. Always yields an empty summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSummarizer;

#[async_trait]
impl Summarizer for NoOpSummarizer {
    async fn summarize(&self, _title: &str, _text: &str) -> Result<String, EngineError> {
        Ok(String::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Summarizer backed by an OpenAI-compatible `chat/completions` endpoint.
/// Works against OpenAI as well as Ollama's `/v1` API.
pub struct ChatSummarizer {
    client: OpenAiClient,
    model: String,
    temperature: f32,
}

impl ChatSummarizer {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 1.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, title: &str, text: &str) -> Result<String, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(title, text)),
            ],
            temperature: Some(self.temperature),
        };

        let resp = self.client.chat_completion(&req).await?;
        match resp.first_content() {
            Some(content) if !content.trim().is_empty() => Ok(content.trim().to_string()),
            _ => Err(EngineError::EmptyResponse),
        }
    }
}

fn user_prompt(title: &str, text: &str) -> String {
    format!("Video Title: {title}\nTranscription: {text}")
}
