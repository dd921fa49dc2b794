//! Shipkit console - Entry Point
//!
//! Terminal client for a Shipkit gateway: accounts, deployments, live status
//! and domain setup.

mod cli;
mod commands;

use clap::Parser;
use shipkit::app::options::AppOptions;
use shipkit::errors::ShipkitError;
use shipkit::http::endpoint::forget_cached;
use shipkit::logs::{init_logging, LogLevel, LogOptions};
use shipkit::storage::layout::StorageLayout;
use shipkit::storage::settings::Settings;

use tracing::{error, info};

use crate::cli::Cli;
use crate::commands::{dispatch, Context, Reported};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Storage and settings
    let layout = StorageLayout::default();
    if let Err(e) = layout.setup().await {
        eprintln!("Failed to prepare {}: {e}", layout.base_dir.display());
        std::process::exit(1);
    }
    let mut settings = Settings::load(&layout.settings_file()).await;
    if cli.graphql_url.is_some() {
        settings.api.graphql_url = cli.graphql_url.clone();
    }
    if cli.console_url.is_some() {
        settings.api.console_url = cli.console_url.clone();
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.log_level.clone(),
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    let log_options = LogOptions {
        log_level,
        log_dir: settings
            .log_to_file
            .then(|| layout.logs_dir().path().to_path_buf()),
        json_format: cli.json_logs,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    if cli.refresh_endpoint {
        if let Err(e) = forget_cached(&layout.endpoint_file()).await {
            error!("Failed to forget cached endpoint: {}", e);
        }
    }

    let ctx = Context {
        options: AppOptions::from_settings(layout, &settings),
        api: settings.api.clone(),
    };
    info!("Running shipkit with options: {:?}", ctx.options);

    if let Err(e) = dispatch(ctx, cli.command).await {
        report(&e);
        drop(_log_guard);
        std::process::exit(1);
    }
}

fn report(err: &anyhow::Error) {
    if err.downcast_ref::<Reported>().is_some() {
        return;
    }
    match err.downcast_ref::<ShipkitError>() {
        Some(e) if e.is_auth_failure() => {
            eprintln!("{e}");
            eprintln!("Your session has ended. Run `shipkit login` to sign in again.");
        }
        _ => eprintln!("Error: {err:#}"),
    }
}

pub(crate) async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
