// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry Sink Daemon (tsinkd)
//!
//! Reads decoded subscribe notifications as JSON lines on stdin and exports
//! them to an InfluxDB v2 compatible backend.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod feed;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::BufReader;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tsink_adapters::{InfluxBackend, TracedBackend};
use tsink_core::{ConfigError, SinkConfig};
use tsink_engine::Sink;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before loading config
    let arg = std::env::args().nth(1);
    if let Some(arg) = arg.as_deref() {
        match arg {
            "--version" | "-V" | "-v" => {
                println!("tsinkd {VERSION}");
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            flag if flag.starts_with('-') => {
                eprintln!("error: unexpected argument '{flag}'");
                eprintln!("Usage: tsinkd [CONFIG] [--help | --version]");
                std::process::exit(1);
            }
            _ => {}
        }
    }

    let config_path = env::config_path(arg);
    let config = load_config(&config_path)?;
    let _log_guard = setup_logging(&config, env::log_file().as_deref())?;

    info!(config = %config_path.display(), "starting tsinkd {VERSION}");

    let cancel = CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // Startup blocks until the backend answers; signals abort it
    let startup = Sink::start(
        config,
        |cfg: &SinkConfig| InfluxBackend::new(cfg).map(TracedBackend::new),
        &cancel,
    );
    let sink = tokio::select! {
        sink = startup => sink,
        _ = sigterm.recv() => {
            info!("Received SIGTERM during startup");
            return Ok(());
        }
        _ = sigint.recv() => {
            info!("Received SIGINT during startup");
            return Ok(());
        }
    };
    let sink = match sink {
        Ok(sink) => sink,
        Err(e) => {
            error!("Failed to start sink: {e}");
            return Err(e.into());
        }
    };
    info!("{sink}");

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = feed::run(&sink, stdin, &cancel) => match result {
            Ok(summary) => info!(
                records = summary.records,
                rejected = summary.rejected,
                events = summary.events,
                "feed finished"
            ),
            Err(e) => error!("Error reading feed: {e}"),
        },
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    stop(&sink, &cancel, env::shutdown_grace()).await;
    Ok(())
}

/// Close the sink and give its workers `grace` to flush before returning.
async fn stop(sink: &Sink, cancel: &CancellationToken, grace: Duration) {
    if let Err(e) = sink.shutdown(grace).await {
        warn!("{e}");
    }
    cancel.cancel();
    let stats = sink.stats();
    info!(
        delivered = stats.delivered,
        dropped = stats.dropped,
        write_errors = stats.write_errors,
        rebuilds = stats.rebuilds,
        "tsinkd stopped"
    );
}

fn print_help() {
    println!("tsinkd {VERSION}");
    println!("Telemetry sink daemon - exports JSON-lines notifications from stdin");
    println!("to an InfluxDB v2 compatible backend");
    println!();
    println!("USAGE:");
    println!("    tsinkd [CONFIG]");
    println!();
    println!("CONFIG defaults to $TSINK_CONFIG, then ./tsink.toml.");
    println!("Logs go to stderr unless $TSINK_LOG_FILE is set; RUST_LOG overrides the level.");
    println!("$TSINK_SHUTDOWN_GRACE_MS bounds the final flush on exit (default 10000).");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

/// Load the config file; a missing file means all defaults.
fn load_config(path: &Path) -> Result<SinkConfig, ConfigError> {
    if !path.exists() {
        return Ok(SinkConfig::default().with_defaults());
    }
    SinkConfig::load(path)
}

/// Default filter directive when RUST_LOG is unset
fn default_directive(config: &SinkConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "info"
    }
}

fn setup_logging(
    config: &SinkConfig,
    log_file: Option<&Path>,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(log_file.is_none()))
        .init();

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), std::io::Error> {
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log path {} has no file name", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(name)))
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
