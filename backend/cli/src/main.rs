mod check_config;
mod describe;
mod providers;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use narrator_config::{resolve_config_path, NarratorConfig, ValidationReport};
use narrator_gateway::{build_router, load_index_page, start_server, GatewayState, RouterSettings};
use narrator_logging::init_logger;
use narrator_media::UploadStager;

#[derive(Parser)]
#[command(name = "narrator")]
#[command(about = "Narrator: spoken descriptions of photos for blind and low-vision users")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $NARRATOR_CONFIG, then ~/.narrator/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },
    /// Describe a single image file and print the result as JSON
    Describe {
        /// Image to describe
        image: PathBuf,
    },
    /// Validate the configuration and print it with secrets redacted
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let (mut config, report) = narrator_config::load_and_prepare(&config_path)
        .await
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(dir) = &config.logging.dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    init_logger(&config.logging.level, config.logging.dir.as_deref());

    match cli.command {
        Commands::CheckConfig => check_config::run(&config_path, &config, &report).await,
        Commands::Serve { port } => {
            ensure_valid(&report)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await
        }
        Commands::Describe { image } => {
            ensure_valid(&report)?;
            describe::run(&config, &image).await
        }
    }
}

/// Log warnings and refuse to start on any validation error.
fn ensure_valid(report: &ValidationReport) -> Result<()> {
    for warning in &report.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    if let Some(first) = report.errors.first() {
        for error in &report.errors {
            tracing::error!(path = %error.path, "{}", error.message);
        }
        bail!("Invalid configuration ({} error(s)); first: {first}", report.errors.len());
    }
    Ok(())
}

async fn run_server(config: NarratorConfig) -> Result<()> {
    let storage = &config.storage;
    for dir in [&storage.upload_dir, &storage.audio_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let pipeline = providers::build_pipeline(&config)?;
    let index_html = load_index_page(config.server.index_page.as_deref()).await?;
    let state = GatewayState::new(pipeline, UploadStager::new(storage.upload_dir.clone()), index_html);
    let router = build_router(
        state,
        RouterSettings {
            max_upload_bytes: config.server.max_upload_bytes,
            audio_dir: storage.audio_dir.clone(),
            audio_url_prefix: storage.audio_url_prefix.clone(),
        },
    );

    let addr = resolve_bind_address(&config.server.bind_address, config.server.port).await?;
    info!(
        addr = %addr,
        upload_dir = %storage.upload_dir.display(),
        audio_dir = %storage.audio_dir.display(),
        "Starting Narrator"
    );
    start_server(addr, router).await
}

async fn resolve_bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve bind address {host}:{port}"))?
        .next()
        .with_context(|| format!("Bind address {host}:{port} resolved to nothing"))
}
