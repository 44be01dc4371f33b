//! Wiring from [`Config`] to the concrete collaborators.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Config, SummaryConfig, TranscriptionBackend, TranscriptionConfig};
use crate::ffmpeg::Ffmpeg;
use crate::fetch::YtDlp;
use crate::openai::OpenAiClient;
use crate::queue::JobStore;
use crate::service::JobService;
use crate::summarize::{ChatSummarizer, NoOpSummarizer, Summarizer};
use crate::transcribe::{
    FfmpegWhisperTranscriber, Transcriber, WhisperApiTranscriber, with_speed_factor,
};
use crate::worker::Worker;

pub fn transcriber(config: &TranscriptionConfig) -> Result<Arc<dyn Transcriber>> {
    let ffmpeg = Ffmpeg::new(&config.ffmpeg_bin);

    let inner: Arc<dyn Transcriber> = match config.backend {
        TranscriptionBackend::Openai => {
            let client = OpenAiClient::new(&config.base_url, Some(config.api_key.clone()))
                .context("failed to build transcription client")?;
            Arc::new(WhisperApiTranscriber::new(client, &config.model))
        }
        TranscriptionBackend::FfmpegWhisper => {
            let model_path = config
                .whisper_model_path
                .clone()
                .context("transcription.whisper_model_path is not set")?;
            Arc::new(FfmpegWhisperTranscriber::new(
                ffmpeg.clone(),
                model_path,
                &config.language,
                config.queue,
            ))
        }
    };

    Ok(with_speed_factor(inner, ffmpeg, config.speed_factor))
}

pub fn summarizer(config: &SummaryConfig) -> Result<Arc<dyn Summarizer>> {
    if !config.is_enabled() {
        return Ok(Arc::new(NoOpSummarizer));
    }

    let token = Some(config.token.clone()).filter(|t| !t.trim().is_empty());
    let client = OpenAiClient::new(config.endpoint.trim(), token)
        .context("failed to build summary client")?;
    Ok(Arc::new(ChatSummarizer::new(client, &config.model)))
}

/// Store, service and worker sharing one queue.
pub struct App {
    pub service: JobService,
    pub worker: Worker,
}

impl App {
    pub fn build(config: &Config) -> Result<Self> {
        Self::with_summarizer(config, summarizer(&config.summary)?)
    }

    pub fn with_summarizer(config: &Config, summarizer: Arc<dyn Summarizer>) -> Result<Self> {
        let store = JobStore::new();
        let ytdlp = Arc::new(YtDlp::new(&config.fetch.ytdlp_bin));

        let service = JobService::new(store.clone(), ytdlp.clone(), summarizer.clone());
        let worker = Worker::new(
            store,
            ytdlp,
            transcriber(&config.transcription)?,
            summarizer,
        )
        .with_poll_interval(config.poll_interval())
        .with_scratch_root(config.scratch_dir.clone());

        Ok(Self { service, worker })
    }
}
