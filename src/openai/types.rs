//! Tipos de dados para os endpoints `chat/completions` e `audio/transcriptions`.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme o formato das APIs compatíveis com OpenAI (OpenAI, Ollama).

use serde::{Deserialize, Serialize};

/// Corpo da requisição para o endpoint `/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Identificador do modelo (ex.: "gpt-4.1-nano", "phi3:mini").
    pub model: String,
    /// Mensagens compondo a conversa (sistema e usuário).
    pub messages: Vec<ChatMessage>,
    /// Temperatura de amostragem; omitida do JSON quando `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Uma única mensagem em uma conversa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Papel do remetente: "system", "user" ou "assistant".
    pub role: String,
    /// Conteúdo textual da mensagem.
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Resposta retornada pelo endpoint `/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Identificador único da resposta.
    #[serde(default)]
    pub id: String,
    /// Alternativas geradas; normalmente apenas uma.
    pub choices: Vec<Choice>,
    /// Estatísticas de uso de tokens (Ollama pode omitir).
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Texto da primeira alternativa, se houver.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}

/// Uma alternativa dentro da resposta de chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    /// Motivo da parada da geração (ex.: "stop", "length").
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Estatísticas de consumo de tokens para uma chamada à API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Resposta do endpoint `/audio/transcriptions` no formato `json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}
