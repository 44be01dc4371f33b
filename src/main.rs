use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use ytscribe::app::{self, App};
use ytscribe::cli::{Cli, Command};
use ytscribe::config::Config;
use ytscribe::fetch::YtDlp;
use ytscribe::ffmpeg::Ffmpeg;
use ytscribe::queue::JobStatus;
use ytscribe::summarize::{NoOpSummarizer, Summarizer};
use ytscribe::ui::TranscribeProgress;
use ytscribe::{http, observability};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { addr } => {
            observability::init(cli.verbose, config.log_format)?;
            serve(config, addr).await
        }
        Command::Transcribe { url, summarize } => {
            // Logs would interleave with the spinner unless asked for.
            if cli.verbose {
                observability::init(true, config.log_format)?;
            }
            transcribe(config, &url, summarize).await
        }
        Command::Version => {
            version(&config, cli.verbose).await;
            Ok(())
        }
    }
}

/// Prints the crate version and, with `verbose`, the external tool versions.
/// A missing tool is reported, not treated as an error.
async fn version(config: &Config, verbose: bool) {
    println!("ytscribe {}", env!("CARGO_PKG_VERSION"));
    if !verbose {
        return;
    }

    match Ffmpeg::new(&config.transcription.ffmpeg_bin).version().await {
        Ok(version) => println!("ffmpeg {version}"),
        Err(e) => println!("ffmpeg not found or error: {e}"),
    }
    match YtDlp::new(&config.fetch.ytdlp_bin).version().await {
        Ok(version) => println!("yt-dlp {version}"),
        Err(e) => println!("yt-dlp not found or error: {e}"),
    }
}

async fn serve(config: Config, addr: Option<SocketAddr>) -> Result<()> {
    config.validate()?;
    let addr = addr.unwrap_or(config.listen_addr);

    let App { service, worker } = App::build(&config)?;
    tokio::spawn(worker.run());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, http::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Runs one reference through the same pipeline the queue uses, with a
/// spinner instead of the HTTP boundary.
async fn transcribe(config: Config, url: &str, summarize: bool) -> Result<()> {
    config.validate()?;

    let summarizer: Arc<dyn Summarizer> = if summarize {
        let summarizer = app::summarizer(&config.summary)?;
        if !summarizer.is_enabled() {
            bail!("--summarize needs summary.endpoint (or YTSCRIBE_SUMMARY_ENDPOINT)");
        }
        summarizer
    } else {
        Arc::new(NoOpSummarizer)
    };

    let App { service, worker } = App::with_summarizer(&config, summarizer)?;
    let progress = TranscribeProgress::start(url);

    let job = match service.submit(url).await {
        Ok(job) => job,
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e.into());
        }
    };

    let processing = tokio::spawn(async move { worker.run_once().await });
    while !processing.is_finished() {
        if let Some(current) = service.store().get(&job.id) {
            progress.stage(current.status, &current.title);
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    processing.await.context("worker task panicked")?;

    let done = service.get_job(&job.id)?;
    match done.status {
        JobStatus::Completed | JobStatus::SummaryFailed => {
            progress.complete(&done);
            Ok(())
        }
        status => {
            progress.fail(&done.last_error);
            bail!("job {} ended as {status}", done.id)
        }
    }
}
