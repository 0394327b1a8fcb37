//! Mock diagnostics backend entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mock_diagnostics::api::{create_router, frontend_router, AppState};
use mock_diagnostics::config::Config;
use mock_diagnostics::diagnostics::{DiagnosticsRegistry, ServerId};
use mock_diagnostics::error::AppError;
use mock_diagnostics::metrics;
use mock_diagnostics::utils::{shutdown_signal, spawn_heartbeat};

/// Mock server diagnostics backend.
#[derive(Parser, Debug)]
#[command(name = "mock-diagnostics")]
#[command(about = "Simulated server diagnostics API with a static frontend")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long, global = true, env = "PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the unified backend: API, homepage and static frontend (default).
    Serve,

    /// Serve only the static frontend, redirecting `/` to the entry page.
    Frontend,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(args.port),
        Some(Command::Frontend) => cmd_frontend(args.port).await,
        Some(Command::Serve) | None => cmd_serve(args.port).await,
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("mock_diagnostics=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Load and validate configuration, applying the CLI port override.
fn load_config(port_override: Option<u16>) -> Result<Config, AppError> {
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port_override {
        config.port = port;
    }

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        AppError::InvalidConfig(e)
    })?;

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config(port_override: Option<u16>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("MOCK DIAGNOSTICS - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match load_config(port_override) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen Address: {}", config.listen_addr());
    println!("  Static Dir: {}", config.static_dir.display());
    println!("  Frontend Entry: {}", config.frontend_entry_path());
    println!("  Heartbeat: {}s", config.heartbeat_interval_secs);
    println!(
        "  Servers: {}",
        ServerId::all()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the unified diagnostics backend.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(port_override)?;

    let handle = metrics::install_prometheus()?;
    let registry = Arc::new(DiagnosticsRegistry::new());
    let state = AppState::new(registry)
        .with_metrics(handle)
        .with_frontend_entry(config.frontend_entry_path());

    let router = create_router(state, &config.static_dir);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Unified server running on {}", addr);
    info!("Serving static files from {}", config.static_dir.display());

    let (stop_tx, stop_rx) = watch::channel(false);
    let heartbeat = spawn_heartbeat(config.heartbeat_interval(), stop_rx);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let _ = stop_tx.send(true);
    if let Ok(beats) = heartbeat.await {
        info!(beats, "Heartbeat task finished");
    }

    served?;
    info!("Server stopped");
    Ok(())
}

/// Run the static frontend server.
async fn cmd_frontend(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = load_config(port_override)?;
    let entry = config.frontend_entry_path();

    let state = AppState::default().with_frontend_entry(entry.clone());
    let router = frontend_router(state, &config.static_dir);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Frontend server running at http://localhost:{}{}", config.port, entry);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Frontend server stopped");
    Ok(())
}
