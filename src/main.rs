use anyhow::Result;
use clap::Parser;
use multitalk::{
    create_router, AppState, Config, HttpTranscriber, OrchestratorConfig, SessionOrchestrator,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "multitalk", about = "Speech-to-text dialogue service")]
struct Args {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/multitalk")]
    config: String,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Recognition endpoint: {}", cfg.recognizer.endpoint);
    info!("Audio temp dir: {}", cfg.audio.temp_dir);

    let transcriber = Arc::new(HttpTranscriber::new(cfg.recognizer.endpoint.clone()));
    let orchestrator = Arc::new(SessionOrchestrator::new(
        OrchestratorConfig::from(&cfg),
        transcriber,
    ));

    let router = create_router(AppState::new(orchestrator));

    let addr = format!("{}:{}", cfg.service.http.bind, port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
