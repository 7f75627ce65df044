use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use nepisirsem_cli::{
    AppConfig, AppContext, Cli, Commands, GREETING, QueryOutput, build_index, exit_code,
    run_console,
};
use nepisirsem_session::Session;
use nepisirsem_telemetry::{TelemetryConfig, init_telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // keep the conversation readable unless RUST_LOG asks for more
    let default_filter = if cli.command == Commands::Chat { "warn" } else { "info" };
    let telemetry = TelemetryConfig::new("nepisirsem")
        .with_format(cli.log_format)
        .with_default_filter(default_filter);
    if let Err(e) = init_telemetry(&telemetry) {
        eprintln!("Loglama başlatılamadı: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Hata oluştu: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env(&cli.settings)?;

    match cli.command {
        Commands::Index => {
            let report = build_index(&config).await?;
            println!(
                "'{}' indekslendi: {} sayfa, {} parça ({} boyutlu, {}).",
                config.source.display(),
                report.page_count,
                report.chunk_count,
                report.dimensions,
                report.embedding_model
            );
        }
        Commands::Chat => {
            let context = AppContext::initialize(&config).await?;
            let manifest = context.manifest();
            println!(
                "Kaynak: {} ({} parça, {})",
                manifest.source, manifest.record_count, manifest.embedding_model
            );
            let mut session = Session::with_greeting(GREETING);
            run_console(context.assistant(), &mut session).await?;
        }
        Commands::Ask { question, json } => {
            let context = AppContext::initialize(&config).await?;
            let answer = context.assistant().answer(&question).await?;
            if json {
                println!("{}", serde_json::to_string(&QueryOutput::from(&answer))?);
            } else {
                println!("{}", answer.answer);
            }
        }
    }
    Ok(())
}
