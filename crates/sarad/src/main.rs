//! Sara daemon - answers assistant queries on stdin.
//!
//! Transport (WebSocket capture, TTS) lives in separate services; this
//! binary wires the pipeline to a line-oriented loop for local use and
//! one-shot queries.

use anyhow::Result;
use clap::Parser;
use sarad::config::Config;
use sarad::handlers::Pipeline;
use sarad::ollama::OllamaBackend;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sarad", about = "Sara assistant pipeline daemon", version)]
struct Args {
    /// Config file path (defaults to /etc/sara/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Answer a single question and exit
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load(),
    };

    info!("sarad v{} starting", env!("CARGO_PKG_VERSION"));

    let backend = OllamaBackend::new(config.llm.base_url.clone());
    let pipeline = Pipeline::new(config, backend);

    if let Some(question) = args.question {
        let reply = pipeline.handle_text(&question).await;
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    info!("Reading questions from stdin, one per line");
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let reply = pipeline.handle_text(&line).await;
        println!("{}", serde_json::to_string(&reply)?);
    }

    info!("Shutting down");
    Ok(())
}
