//! Ditherdrop - a Floyd-Steinberg dithering studio.
//!
//! A Rust-based server that:
//! - Accepts images via drag-and-drop or URL fetch
//! - Runs the downscale/dither/upscale pipeline on every parameter change
//! - Serves a web interface with live preview and PNG download
//! - Offers a one-shot CLI mode for dithering a local file

mod config;
mod image_proc;
mod web;

use std::path::PathBuf;

use clap::Parser;
use config::Config;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ditherdrop")]
#[command(about = "Floyd-Steinberg dithering studio with a web UI")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Web server port (overrides config, default: 8888)
    #[arg(long = "http-port")]
    http_port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Dither a local image file and exit
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output path for one-shot mode (default: <input>-dithered.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scale factor override for one-shot mode
    #[arg(long)]
    scale: Option<u32>,

    /// Grayscale override for one-shot mode
    #[arg(long)]
    grayscale: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    // Load configuration
    let config = Config::load(&args.config).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from {}: {}", args.config, e);
        tracing::info!("Using default configuration");
        Config::default()
    });

    // One-shot mode: dither a file and exit
    if let Some(input) = &args.input {
        return dither_file(input, &args, &config);
    }

    tracing::info!("Starting Ditherdrop server");

    // Setup shutdown signal handling
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Create web server
    let port = args.http_port.unwrap_or(config.web_port);
    let web_server = web::WebServer::new(config, args.config.clone());

    let web_shutdown = shutdown_tx.subscribe();
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web_server.run_with_shutdown(port, web_shutdown).await {
            tracing::error!("Web server error: {}", e);
        }
    });

    // Wait for shutdown signal
    wait_for_shutdown().await;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(());

    tokio::select! {
        _ = web_handle => {},
        _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => {
            tracing::warn!("Web server shutdown timeout");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// One-shot mode: run the pipeline on a local file and write a PNG
fn dither_file(input: &PathBuf, args: &Args, config: &Config) -> anyhow::Result<()> {
    let mut params = config.params();
    if let Some(scale) = args.scale {
        params.scale_factor = scale;
    }
    if args.grayscale {
        params.grayscale = true;
    }

    tracing::info!("Dithering {} (one-shot)", input.display());

    let img = image::open(input)?;
    let source = image_proc::normalize_source(&img, config.max_dimension);
    let result = image_proc::process_image(&source, &params)?;

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        input.with_file_name(format!("{}-dithered.png", stem))
    });

    result.save(&output)?;
    tracing::info!("Wrote {}", output.display());
    println!("{}", output.display());
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ditherdrop={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT");
        }
    }
}
