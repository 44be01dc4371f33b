pub mod client;
pub mod error;
pub mod types;

pub use client::{OPENAI_BASE_URL, OpenAiClient};
pub use error::OpenAiError;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, TranscriptionResponse};
