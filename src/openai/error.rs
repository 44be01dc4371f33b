//! Tipos de erro para o cliente de APIs compatíveis com OpenAI.
//!
//! Define [`OpenAiError`] com variantes para erros da API, erros de rede
//! e falhas locais ao ler o arquivo de áudio enviado. Jobs não são
//! repetidos, então um HTTP 429 é tratado como qualquer outro erro da API.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com uma API compatível com OpenAI.
///
/// - [`ApiError`](OpenAiError::ApiError): qualquer erro HTTP (4xx/5xx, inclusive 429)
/// - [`NetworkError`](OpenAiError::NetworkError): falha na camada de rede
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// Erro retornado pela API (ex.: 401 chave inválida, 500 erro interno).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Falha ao ler o arquivo local enviado para transcrição.
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = OpenAiError::ApiError {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API key");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpenAiError>();
    }
}
