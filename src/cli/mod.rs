//! Interface de linha de comando do memokit.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::CONFIG_FILE;

/// memokit - demonstração de caches de memoização.
#[derive(Parser, Debug)]
#[command(name = "memokit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cria memokit.toml no diretório indicado.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Mostra a configuração efetiva.
    Config,

    /// Mostra a chave de cache de uma lista de argumentos em JSON.
    Key {
        /// Argumentos, ex.: '[1, {"b": 2, "a": 1}]'.
        args: String,
    },

    /// Calcula fibonacci memoizado e mostra os contadores.
    Fib {
        /// Índice n.
        n: u64,

        /// Faz as chamadas recursivas passarem pelo cache.
        #[arg(short, long)]
        recursive: bool,

        /// Lista cada evento do cache.
        #[arg(short, long)]
        trace: bool,
    },

    /// Executa os cenários de demonstração.
    Demo,

    /// Mostra versão.
    Version,
}
