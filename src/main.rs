use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artifact_store::FsObjectStore;
use browser_session::ChromiumLauncher;
use snapgrid::config::AppConfig;
use snapgrid::metrics;
use snapgrid::registry::{ActorRegistry, LauncherFactory};
use snapgrid::server::{build_router, ServeState};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the capture HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Listen address, overrides the config file
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Artifact directory, overrides the config file
    #[arg(long)]
    storage_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = AppConfig::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Serve(args) => cmd_serve(args, config).await,
    };

    if let Err(err) = result {
        error!("command failed: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

async fn cmd_serve(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = args.storage_root {
        config.storage_root = root;
    }

    metrics::register_metrics();

    let store = Arc::new(FsObjectStore::new(config.storage_root.clone()));
    let browser = config.browser.clone();
    let factory: LauncherFactory = Arc::new(move || Box::new(ChromiumLauncher::new(browser.clone())));
    let registry = Arc::new(ActorRegistry::new(factory, store, config.capture));

    let router = build_router(ServeState::new(registry));
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(
        addr = %config.bind_addr,
        storage_root = %config.storage_root.display(),
        "snapgrid serving"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
