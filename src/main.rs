use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use stream_encoder::console::{self, LogBuffer};
use stream_encoder::{
    create_router, AppState, ConfigSource, FfmpegLauncher, FileConfigSource,
    SessionRegistry, Supervisor, SupervisorSettings,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stream-encoder", version, about = "Supervises audio encoders streaming to a relay")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/stream-encoder")]
    config: String,

    /// Override service.http.port
    #[arg(long)]
    port: Option<u16>,

    /// Disable the HTTP status surface
    #[arg(long)]
    no_web: bool,

    /// Full-screen status dashboard; logs go to its log pane
    #[arg(long)]
    console: bool,
}

/// Log lines kept for the dashboard's log pane
const CONSOLE_LOG_LINES: usize = 500;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let logs = LogBuffer::new(CONSOLE_LOG_LINES);
    if cli.console {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(logs.clone())
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let source = FileConfigSource::new(&cli.config);
    let cfg = source
        .load()
        .with_context(|| format!("Failed to load config from {}", source.path()))?;

    info!("{} v{} is starting", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Loaded {} encoder(s) from {}", cfg.encoders.len(), source.path());

    let registry = SessionRegistry::shared();
    let launcher = Arc::new(FfmpegLauncher::new(cfg.encoder.capture_backend.clone()));
    let settings = SupervisorSettings::from_config(&cfg)?;

    let mut supervisor = Supervisor::new(registry.clone(), launcher, settings);
    supervisor
        .reconcile(&cfg.encoders)
        .await
        .context("Initial reconcile failed")?;

    let cancel = CancellationToken::new();

    let http_task = if cfg.service.http.enabled && !cli.no_web {
        let port = cli.port.unwrap_or(cfg.service.http.port);
        let addr = format!("{}:{}", cfg.service.http.bind, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;
        info!("Web UI started on http://{}", addr);

        let router = create_router(AppState::new(registry.clone(), cfg.service.name.clone()));
        let shutdown = cancel.clone().cancelled_owned();
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("HTTP server failed: {}", e);
            }
        }))
    } else {
        None
    };

    let console_task = if cli.console {
        let registry = registry.clone();
        let refresh = cfg.supervisor.console_interval;
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = console::run_threaded(registry, logs, refresh, cancel) {
                eprintln!("Console failed: {:#}", e);
            }
        })
    } else {
        console::spawn_summary(registry.clone(), cfg.supervisor.console_interval, cancel.clone())
    };

    let quit = cancel.clone();
    supervisor
        .run(source, async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = quit.cancelled() => info!("Console closed"),
            }
        })
        .await;

    cancel.cancel();
    if let Some(task) = http_task {
        task.await.ok();
    }
    console_task.await.ok();

    info!("Exiting");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }
}
