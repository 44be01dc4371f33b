use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};

use super::error::OpenAiError;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, TranscriptionResponse};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible HTTP APIs (OpenAI itself, Ollama's `/v1`).
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: Option<String>,
    client: Client,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client against `base_url` (e.g. `https://api.openai.com/v1`).
    /// The bearer token is optional since Ollama does not require one.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, OpenAiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(600))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(
        &self,
        req: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(req);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json::<ChatCompletionResponse>().await?)
    }

    /// Upload an audio file to `/audio/transcriptions` and return its text.
    pub async fn transcribe_file(
        &self,
        model: &str,
        path: &Path,
    ) -> Result<TranscriptionResponse, OpenAiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let form = Form::new()
            .text("model", model.to_string())
            .text("response_format", "json")
            .part("file", Part::bytes(bytes).file_name(file_name));

        let mut request = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json::<TranscriptionResponse>().await?)
    }
}

async fn check_status(response: Response) -> Result<Response, OpenAiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(OpenAiError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::ChatMessage;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "test-model".into(),
            messages: vec![ChatMessage::user("hi")],
            temperature: Some(0.3),
        }
    }

    #[tokio::test]
    async fn chat_completion_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new(format!("{}/v1/", server.uri()), Some("sk-test".into())).unwrap();
        let resp = client.chat_completion(&chat_request()).await.unwrap();
        assert_eq!(resp.first_content(), Some("ok"));
    }

    #[tokio::test]
    async fn rate_limit_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("Rate limit reached"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(server.uri(), None).unwrap();
        let err = client.chat_completion(&chat_request()).await.unwrap_err();
        match err {
            OpenAiError::ApiError { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(server.uri(), Some("bad".into())).unwrap();
        let err = client.chat_completion(&chat_request()).await.unwrap_err();
        match err {
            OpenAiError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transcribe_file_uploads_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header_exists("content-type"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "hello world"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("abc.m4a");
        std::fs::write(&audio, b"fake audio").unwrap();

        let client = OpenAiClient::new(server.uri(), Some("sk-test".into())).unwrap();
        let resp = client.transcribe_file("whisper-1", &audio).await.unwrap();
        assert_eq!(resp.text, "hello world");

        let received = server.received_requests().await.unwrap();
        let content_type = received[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("whisper-1"));
        assert!(body.contains("abc.m4a"));
    }

    #[tokio::test]
    async fn transcribe_missing_file_is_io_error() {
        let client = OpenAiClient::new("http://127.0.0.1:9", None).unwrap();
        let err = client
            .transcribe_file("whisper-1", Path::new("/definitely/not/here.m4a"))
            .await
            .unwrap_err();
        assert!(matches!(err, OpenAiError::Io(_)));
    }

    #[test]
    fn empty_api_key_is_dropped() {
        let client = OpenAiClient::new("http://localhost:11434/v1/", Some(String::new())).unwrap();
        assert!(client.api_key.is_none());
        assert_eq!(client.base_url(), "http://localhost:11434/v1");
    }
}
