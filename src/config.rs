//! Configuração do ytscribe carregada a partir de `ytscribe.toml`.
//!
//! A struct [`Config`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! Variáveis de ambiente têm precedência sobre o arquivo para as
//! credenciais e o endpoint de resumo.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::openai::OPENAI_BASE_URL;

/// Arquivo procurado no diretório atual quando `--config` não é informado.
pub const DEFAULT_CONFIG_FILE: &str = "ytscribe.toml";

/// Configuração de nível superior carregada de `ytscribe.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endereço em que o servidor HTTP escuta.
    pub listen_addr: SocketAddr,

    /// Intervalo de polling do worker quando a fila está vazia.
    pub poll_interval_secs: u64,

    /// Formato dos logs: `pretty` ou `json`.
    pub log_format: LogFormat,

    /// Diretório raiz para os arquivos temporários de cada job.
    /// `None` usa o diretório temporário do sistema.
    pub scratch_dir: Option<PathBuf>,

    pub fetch: FetchConfig,
    pub transcription: TranscriptionConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Seção `[fetch]`: binário usado para metadados e download.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub ytdlp_bin: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            ytdlp_bin: PathBuf::from("yt-dlp"),
        }
    }
}

/// Motor de transcrição selecionado na inicialização.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptionBackend {
    /// API de transcrição compatível com OpenAI (Whisper).
    #[default]
    Openai,
    /// Filtro `whisper` local do ffmpeg.
    FfmpegWhisper,
}

/// Seção `[transcription]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub backend: TranscriptionBackend,

    /// Chave da API; `OPENAI_API_KEY` tem precedência.
    pub api_key: String,
    pub base_url: String,
    pub model: String,

    /// Fator de aceleração do áudio antes da transcrição (1.0 desliga).
    pub speed_factor: f64,

    pub ffmpeg_bin: PathBuf,
    pub whisper_model_path: Option<PathBuf>,
    pub language: String,
    pub queue: u32,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            backend: TranscriptionBackend::default(),
            api_key: String::new(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: "whisper-1".to_string(),
            speed_factor: 2.5,
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            whisper_model_path: None,
            language: "auto".to_string(),
            queue: 15,
        }
    }
}

/// Seção `[summary]`. Um endpoint vazio desabilita o resumo.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub endpoint: String,
    pub token: String,
    pub model: String,
}

impl SummaryConfig {
    pub fn is_enabled(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            poll_interval_secs: 5,
            log_format: LogFormat::default(),
            scratch_dir: None,
            fetch: FetchConfig::default(),
            transcription: TranscriptionConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl Config {
    /// Carrega a configuração de `path` ou de `ytscribe.toml` no diretório atual.
    ///
    /// Um caminho informado explicitamente precisa existir; o arquivo padrão
    /// ausente resulta nos valores padrão.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Aplica as variáveis de ambiente sobre os valores do arquivo.
    /// Valores vazios são ignorados.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.transcription.api_key = key;
        }
        if let Some(endpoint) = non_empty("YTSCRIBE_SUMMARY_ENDPOINT") {
            self.summary.endpoint = endpoint;
        }
        if let Some(token) = non_empty("YTSCRIBE_SUMMARY_TOKEN") {
            self.summary.token = token;
        }
        if let Some(model) = non_empty("YTSCRIBE_SUMMARY_MODEL") {
            self.summary.model = model;
        }
    }

    /// Rejeita combinações que impediriam o worker de processar jobs.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }

        let transcription = &self.transcription;
        match transcription.backend {
            TranscriptionBackend::Openai if transcription.api_key.trim().is_empty() => {
                bail!("transcription.api_key (or OPENAI_API_KEY) is required for the openai backend");
            }
            TranscriptionBackend::FfmpegWhisper if transcription.whisper_model_path.is_none() => {
                bail!("transcription.whisper_model_path is required for the ffmpeg-whisper backend");
            }
            _ => {}
        }
        if !(transcription.speed_factor.is_finite() && transcription.speed_factor > 0.0) {
            bail!(
                "transcription.speed_factor must be positive, got {}",
                transcription.speed_factor
            );
        }

        if self.summary.is_enabled() && self.summary.model.trim().is_empty() {
            bail!("summary.model is required when summary.endpoint is set");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
