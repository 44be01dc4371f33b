//! Interface de terminal do ytscribe: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`TranscribeProgress`] acompanha visualmente
//! o comando `transcribe` no terminal.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::queue::{JobRecord, JobStatus};

/// Indicador visual de progresso para uma transcrição avulsa.
///
/// Exibe um spinner animado durante cada etapa e mensagens coloridas
/// para sucesso (verde), falha (vermelho) e resumo ausente (amarelo).
pub struct TranscribeProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
    bold: Style,
}

impl TranscribeProgress {
    /// Inicia o spinner com a referência do vídeo.
    pub fn start(source_ref: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Resolving {source_ref}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            bold: Style::new().bold(),
        }
    }

    /// Atualiza a mensagem do spinner para a etapa atual.
    pub fn stage(&self, status: JobStatus, title: &str) {
        self.pb.set_message(format!("{}: {title}", stage_label(status)));
    }

    /// Finaliza o spinner com erro.
    pub fn fail(&self, reason: &str) {
        self.pb.finish_and_clear();
        println!("  {} {reason}", self.red.apply_to("✗"));
    }

    /// Finaliza o spinner e imprime a transcrição e, se houver, o resumo.
    pub fn complete(&self, job: &JobRecord) {
        self.pb.finish_and_clear();
        match job.status {
            JobStatus::Completed => {
                println!("  {} {}", self.green.apply_to("✓"), job.title);
            }
            JobStatus::SummaryFailed => {
                println!(
                    "  {} {} (summary failed: {})",
                    self.yellow.apply_to("!"),
                    job.title,
                    job.last_error
                );
            }
            other => {
                println!("  {} {} ({other})", self.red.apply_to("✗"), job.title);
            }
        }

        println!();
        println!("{}", self.bold.apply_to("─── Transcript ───"));
        println!("{}", job.transcript);

        if !job.summary.is_empty() {
            println!();
            println!("{}", self.bold.apply_to("─── Summary ───"));
            println!("{}", job.summary);
        }
    }
}

fn stage_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Downloading => "Downloading audio",
        JobStatus::Transcribing => "Transcribing",
        JobStatus::Summarizing => "Summarizing",
        _ => "Processing",
    }
}
