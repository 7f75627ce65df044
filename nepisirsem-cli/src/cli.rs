use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nepisirsem_telemetry::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "nepisirsem", version, about = "Ne Pişirsem - tarif koleksiyonundan cevap veren yemek asistanı")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    /// Log line format: pretty or json
    #[arg(long, global = true, env = "NEPISIRSEM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Build the vector store from the recipe document
    Index,
    /// Start an interactive conversation
    Chat,
    /// Answer a single question and exit
    Ask {
        question: String,
        /// Print `{"answer": ...}` instead of plain text
        #[arg(long)]
        json: bool,
    },
}

/// Process settings shared by every subcommand.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Recipe document (.pdf, .txt or .md)
    #[arg(long, global = true, env = "NEPISIRSEM_SOURCE", default_value = "yemektarifleri.pdf")]
    pub source: PathBuf,

    /// Directory of the vector store
    #[arg(long = "store", global = true, env = "NEPISIRSEM_STORE_DIR", default_value = "./vector_db")]
    pub store_dir: PathBuf,

    #[arg(long, global = true, env = "NEPISIRSEM_EMBEDDING_MODEL", default_value = "text-embedding-004")]
    pub embedding_model: String,

    #[arg(long, global = true, env = "NEPISIRSEM_GENERATION_MODEL", default_value = "gemini-2.5-flash")]
    pub generation_model: String,

    /// Number of chunks retrieved per question
    #[arg(long, global = true, default_value_t = 5)]
    pub top_k: usize,

    /// Maximum chunk length in characters
    #[arg(long, global = true, default_value_t = 1500)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, global = true, default_value_t = 150)]
    pub chunk_overlap: usize,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ask_with_flags() {
        let cli = Cli::parse_from([
            "nepisirsem",
            "ask",
            "Menemen tarifi nedir?",
            "--json",
            "--top-k",
            "3",
            "--store",
            "/tmp/db",
        ]);
        assert_eq!(
            cli.command,
            Commands::Ask { question: "Menemen tarifi nedir?".to_string(), json: true }
        );
        assert_eq!(cli.settings.top_k, 3);
        assert_eq!(cli.settings.store_dir, PathBuf::from("/tmp/db"));
        assert_eq!(cli.settings.chunk_size, 1500);
    }
}
