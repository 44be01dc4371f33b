//! Transcription engines.
//!
//! [`Transcriber`] is the seam the worker drives. Two engines implement it:
//! the hosted Whisper API ([`WhisperApiTranscriber`]) and the local ffmpeg
//! `whisper` filter ([`FfmpegWhisperTranscriber`]). [`Accelerated`] wraps
//! either one and speeds the audio up before handing it over, which cuts
//! both upload size and engine time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::ffmpeg::{Ffmpeg, scratch_dir_for};
use crate::openai::OpenAiClient;

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<String, EngineError>;
}

pub struct WhisperApiTranscriber {
    client: OpenAiClient,
    model: String,
}

impl WhisperApiTranscriber {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, EngineError> {
        let resp = self.client.transcribe_file(&self.model, audio).await?;
        Ok(resp.text)
    }
}

pub struct FfmpegWhisperTranscriber {
    ffmpeg: Ffmpeg,
    model_path: PathBuf,
    language: String,
    queue: u32,
}

impl FfmpegWhisperTranscriber {
    pub fn new(
        ffmpeg: Ffmpeg,
        model_path: impl Into<PathBuf>,
        language: impl Into<String>,
        queue: u32,
    ) -> Self {
        Self {
            ffmpeg,
            model_path: model_path.into(),
            language: language.into(),
            queue,
        }
    }
}

#[async_trait]
impl Transcriber for FfmpegWhisperTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, EngineError> {
        let text = self
            .ffmpeg
            .whisper(audio, &self.model_path, &self.language, self.queue)
            .await?;
        Ok(text.trim().to_string())
    }
}

/// Speeds audio up by `factor` into a scratch file beside the input, then
/// delegates.
pub struct Accelerated {
    inner: Arc<dyn Transcriber>,
    ffmpeg: Ffmpeg,
    factor: f64,
}

impl Accelerated {
    pub fn new(inner: Arc<dyn Transcriber>, ffmpeg: Ffmpeg, factor: f64) -> Self {
        Self {
            inner,
            ffmpeg,
            factor,
        }
    }
}

#[async_trait]
impl Transcriber for Accelerated {
    async fn transcribe(&self, audio: &Path) -> Result<String, EngineError> {
        let scratch = tempfile::Builder::new()
            .prefix("ytscribe-tempo-")
            .tempdir_in(scratch_dir_for(audio))?;
        let processed = scratch.path().join("processed.mp3");

        tracing::debug!(factor = self.factor, input = %audio.display(), "changing audio tempo");
        self.ffmpeg
            .change_tempo(audio, &processed, self.factor)
            .await?;

        self.inner.transcribe(&processed).await
    }
}

/// Wraps `inner` in [`Accelerated`] unless the factor is 1.0.
pub fn with_speed_factor(
    inner: Arc<dyn Transcriber>,
    ffmpeg: Ffmpeg,
    factor: f64,
) -> Arc<dyn Transcriber> {
    if (factor - 1.0).abs() < f64::EPSILON {
        inner
    } else {
        Arc::new(Accelerated::new(inner, ffmpeg, factor))
    }
}
