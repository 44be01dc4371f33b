//! Interface de linha de comando do ytscribe baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, transcribe, version)
//! e flags globais (--config, --verbose).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ytscribe: fila de transcrição e resumo de vídeos.
#[derive(Debug, Parser)]
#[command(name = "ytscribe", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./ytscribe.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inicia o servidor HTTP e o worker da fila.
    Serve {
        /// Endereço de escuta; sobrescreve `listen_addr` do arquivo.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Baixa e transcreve um único vídeo sem passar pela fila.
    Transcribe {
        /// URL ou identificador do vídeo.
        url: String,

        /// Também gera o resumo (requer `[summary]` configurado).
        #[arg(long, default_value_t = false)]
        summarize: bool,
    },

    /// Mostra a versão; com `--verbose`, também as de ffmpeg e yt-dlp.
    Version,
}
