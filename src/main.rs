//! CLI entry point for the sharepoint-sync tool.

use anyhow::{Context, Result};
use clap::Parser;
use sharepoint_sync_core::{SharePointClient, download_files, load_config, upload_files};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = load_config(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    if args.download_path.is_none() && args.upload_path.is_none() {
        info!("No --download_path or --upload_path given; nothing to do");
        return Ok(());
    }

    let mut client = SharePointClient::connect(&config)
        .await
        .context("connecting to Microsoft Graph")?
        .with_progress(!args.quiet);

    if let Some(download_path) = args.download_path.as_deref() {
        let download_path = std::path::absolute(download_path)
            .with_context(|| format!("resolving {}", download_path.display()))?;
        let report = download_files(&mut client, &config, &download_path)
            .await
            .context("download failed")?;
        info!(
            files = report.downloaded,
            bytes = report.bytes,
            path = %download_path.display(),
            "Download complete"
        );
    } else if let Some(upload_path) = args.upload_path.as_deref() {
        let upload_path = std::path::absolute(upload_path)
            .with_context(|| format!("resolving {}", upload_path.display()))?;
        let report = upload_files(&mut client, &config, &upload_path)
            .await
            .context("upload failed")?;
        info!(
            replaced = report.replaced,
            created = report.created,
            bytes = report.bytes,
            "Upload complete"
        );
    }

    Ok(())
}
