use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{FetchedMedia, MediaFetcher, MediaMetadata, MetadataResolver};
use crate::error::FetchError;
use crate::queue::parse_upload_date;

const METADATA_TEMPLATE: &str = "%(.{id,title,duration_string,upload_date})j";

/// [`MetadataResolver`] and [`MediaFetcher`] backed by the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    id: Option<String>,
    title: Option<String>,
    duration_string: Option<String>,
    upload_date: Option<String>,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Version reported by `yt-dlp --version`, e.g. `2025.06.30`.
    pub async fn version(&self) -> Result<String, FetchError> {
        let stdout = self.run(&["--version"]).await?;
        let version = stdout.trim();
        if version.is_empty() {
            return Err(FetchError::Unreachable(
                "yt-dlp did not report a version".into(),
            ));
        }
        Ok(version.to_string())
    }

    async fn run(&self, args: &[&str]) -> Result<String, FetchError> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::Unreachable(format!("{} not found", self.binary.display()))
                } else {
                    FetchError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MetadataResolver for YtDlp {
    async fn resolve(&self, source_ref: &str) -> Result<MediaMetadata, FetchError> {
        let args = [
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--print",
            METADATA_TEMPLATE,
            source_ref,
        ];
        let stdout = self.run(&args).await?;
        parse_metadata(&stdout)
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn fetch(&self, source_ref: &str, dest_dir: &Path) -> Result<FetchedMedia, FetchError> {
        let template = dest_dir.join("%(id)s.%(ext)s");
        let template = template.to_string_lossy().into_owned();
        let args = [
            "--format",
            "bestaudio/best",
            "--no-playlist",
            "--no-warnings",
            "--no-simulate",
            "--output",
            template.as_str(),
            "--print",
            "after_move:filepath",
            source_ref,
        ];
        let stdout = self.run(&args).await?;

        let path = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| FetchError::Unreachable("yt-dlp did not report a file path".into()))?;

        Ok(FetchedMedia {
            local_path: PathBuf::from(path),
        })
    }
}

fn parse_metadata(stdout: &str) -> Result<MediaMetadata, FetchError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| FetchError::Unreachable("yt-dlp did not return any metadata".into()))?;

    let raw: RawMetadata = serde_json::from_str(line).map_err(|e| {
        FetchError::Unreachable(format!("failed to parse yt-dlp metadata '{line}': {e}"))
    })?;

    let id = raw.id.unwrap_or_default();
    if id.is_empty() {
        return Err(FetchError::NotFound(format!(
            "yt-dlp returned no media id: '{line}'"
        )));
    }

    Ok(MediaMetadata {
        id,
        title: raw.title.unwrap_or_default(),
        duration: raw.duration_string.unwrap_or_default(),
        published_at: raw.upload_date.as_deref().and_then(parse_upload_date),
    })
}

fn classify_failure(stderr: &str) -> FetchError {
    let detail = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let lower = detail.to_lowercase();

    if lower.contains("unsupported url") || lower.contains("is not a valid url") {
        FetchError::Unsupported(detail)
    } else if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("http error 404")
        || lower.contains("does not exist")
    {
        FetchError::NotFound(detail)
    } else {
        FetchError::Unreachable(detail)
    }
}
