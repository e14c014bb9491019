use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use noteastyle::{create_router, AppState, AudioUpload, Config, ExtractionPipeline};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "noteastyle", version, about = "Voice memo treatment records for beauty salons")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, global = true, default_value = "config/noteastyle")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Run one voice memo through transcription and extraction, print the candidate
    Transcribe {
        /// Audio file (webm, m4a, mp3, wav, ...)
        audio: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("noteastyle=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;
    info!("Loaded config: {}", cfg.service.name);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg).await,
        Command::Transcribe { audio } => transcribe(cfg, audio).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let state = AppState::from_config(&cfg).await?;
    let app = create_router(state, &cfg.service);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn transcribe(cfg: Config, audio: PathBuf) -> Result<()> {
    let bytes = tokio::fs::read(&audio)
        .await
        .with_context(|| format!("failed to read {}", audio.display()))?;
    let filename = audio
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    let pipeline = ExtractionPipeline::openai(&cfg.openai)?;
    let candidate = pipeline
        .transcribe_and_extract(AudioUpload { bytes, filename })
        .await?;

    println!("{}", serde_json::to_string_pretty(&candidate)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
