//! ffmpeg subprocess wrapper: tempo changes ahead of transcription and the
//! local `whisper` audio filter (ffmpeg 8+ built with `--enable-whisper`).

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Version reported by `ffmpeg -version`, e.g. `7.1.1`.
    pub async fn version(&self) -> Result<String, EngineError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-version");
        let stdout = self.run(cmd).await?;
        parse_version(&String::from_utf8_lossy(&stdout)).ok_or_else(|| {
            EngineError::Process("unexpected output from ffmpeg -version".into())
        })
    }

    /// Re-encode `input` into `output` played back `factor` times faster.
    pub async fn change_tempo(
        &self,
        input: &Path,
        output: &Path,
        factor: f64,
    ) -> Result<(), EngineError> {
        let filter = atempo_chain(factor);
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-vn", "-filter:a", &filter])
            .arg(output);
        self.run(cmd).await.map(|_| ())
    }

    /// Run the `whisper` filter over `input` and return the text it wrote.
    pub async fn whisper(
        &self,
        input: &Path,
        model_path: &Path,
        language: &str,
        queue: u32,
    ) -> Result<String, EngineError> {
        let destination = tempfile::Builder::new()
            .prefix("ffmpeg-whisper-")
            .suffix(".txt")
            .tempfile_in(scratch_dir_for(input))?;
        let filter = whisper_filter(model_path, language, queue, destination.path());

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-i")
            .arg(input)
            .args(["-vn", "-af", &filter, "-f", "null", "-", "-y"]);
        self.run(cmd).await?;

        Ok(tokio::fs::read_to_string(destination.path()).await?)
    }

    async fn run(&self, mut cmd: Command) -> Result<Vec<u8>, EngineError> {
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::Process(format!("{} not found", self.binary.display()))
            } else {
                EngineError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Process(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                last_lines(&stderr, 5)
            )));
        }
        Ok(output.stdout)
    }
}

/// Builds an `atempo` filter chain for `factor`. A single `atempo` only
/// accepts 0.5–2.0, so larger or smaller factors are split into steps.
pub fn atempo_chain(factor: f64) -> String {
    let mut remaining = factor;
    let mut steps = Vec::new();
    while remaining > 2.0 {
        steps.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        steps.push(0.5);
        remaining /= 0.5;
    }
    steps.push(remaining);

    steps
        .iter()
        .map(|step| format!("atempo={}", trim_float(*step)))
        .collect::<Vec<_>>()
        .join(",")
}

// "ffmpeg version 7.1.1 Copyright (c) ..." -> "7.1.1"
fn parse_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()?
        .split_whitespace()
        .nth(2)
        .map(str::to_string)
}

/// Directory holding `input`. Files derived from a job's audio go there so
/// they are removed together with the job's scratch directory.
pub(crate) fn scratch_dir_for(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::temp_dir(),
    }
}

fn whisper_filter(model_path: &Path, language: &str, queue: u32, destination: &Path) -> String {
    format!(
        "whisper=model={}:language={}:queue={}:destination={}:format=text",
        model_path.display(),
        language,
        queue,
        destination.display()
    )
}

fn trim_float(value: f64) -> String {
    let s = format!("{value:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atempo_within_range_is_single_step() {
        assert_eq!(atempo_chain(1.5), "atempo=1.5");
        assert_eq!(atempo_chain(2.0), "atempo=2");
        assert_eq!(atempo_chain(0.5), "atempo=0.5");
    }

    #[test]
    fn atempo_splits_large_factors() {
        assert_eq!(atempo_chain(2.5), "atempo=2,atempo=1.25");
        assert_eq!(atempo_chain(5.0), "atempo=2,atempo=2,atempo=1.25");
    }

    #[test]
    fn atempo_splits_small_factors() {
        assert_eq!(atempo_chain(0.25), "atempo=0.5,atempo=0.5");
    }

    #[test]
    fn whisper_filter_format() {
        let filter = whisper_filter(
            Path::new("/models/ggml-small.bin"),
            "auto",
            15,
            Path::new("/tmp/out.txt"),
        );
        assert_eq!(
            filter,
            "whisper=model=/models/ggml-small.bin:language=auto:queue=15:destination=/tmp/out.txt:format=text"
        );
    }

    #[test]
    fn scratch_dir_is_the_input_directory() {
        assert_eq!(
            scratch_dir_for(Path::new("/scratch/ytscribe-worker-x/abc.m4a")),
            PathBuf::from("/scratch/ytscribe-worker-x")
        );
        assert_eq!(scratch_dir_for(Path::new("abc.m4a")), std::env::temp_dir());
    }

    #[test]
    fn last_lines_keeps_tail() {
        assert_eq!(last_lines("a\nb\nc\n", 2), "b\nc");
        assert_eq!(last_lines("only", 5), "only");
    }

    #[test]
    fn parses_version_line() {
        let stdout = "ffmpeg version 7.1.1 Copyright (c) 2000-2025 the FFmpeg developers\nbuilt with gcc 14\n";
        assert_eq!(parse_version(stdout).as_deref(), Some("7.1.1"));
        assert_eq!(parse_version("ffmpeg\n"), None);
        assert_eq!(parse_version(""), None);
    }

    #[tokio::test]
    async fn version_reports_missing_binary() {
        let ffmpeg = Ffmpeg::new("/nonexistent/ffmpeg-binary");
        let err = ffmpeg.version().await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let ffmpeg = Ffmpeg::new("/nonexistent/ffmpeg-binary");
        let err = ffmpeg
            .change_tempo(Path::new("in.m4a"), Path::new("out.mp3"), 2.0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
