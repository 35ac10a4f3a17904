use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use trading_dashboard::config::{load_config, to_toml, DashboardConfig};
use trading_dashboard::{ConsoleRenderer, DashboardClient, RefreshCoordinator, RefreshOutcome};

#[derive(Parser)]
#[command(name = "trading-dashboard")]
#[command(author = "Trading Bot")]
#[command(version = "0.1.0")]
#[command(about = "Live client for the trading bot dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "dashboard.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the dashboard live: timed refresh, push updates, clock
    Watch {
        /// Disable the push stream even if the config enables it
        #[arg(long)]
        no_stream: bool,
    },
    /// Ask the backend to refresh once and show the reloaded dashboard
    Refresh,
    /// Show current container status
    Containers,
    /// Show per-user and overall trading stats
    Stats,
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);
    if cli.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Watch { no_stream } => run_watch(config, !no_stream).await?,
        Commands::Refresh => run_refresh(config).await?,
        Commands::Containers => {
            let (coordinator, renderer) = build(&config)?;
            coordinator.pull_container_status().await;
            print!("{}", renderer.view());
        }
        Commands::Stats => {
            let (coordinator, renderer) = build(&config)?;
            coordinator.pull_trading_stats().await;
            print!("{}", renderer.view());
        }
        Commands::ShowConfig => print!("{}", to_toml(&config)?),
    }

    Ok(())
}

fn build(config: &DashboardConfig) -> Result<(RefreshCoordinator, Arc<ConsoleRenderer>)> {
    let client = Arc::new(DashboardClient::new(config)?);
    let renderer = Arc::new(ConsoleRenderer::new(&config.containers, &config.users));
    let coordinator = RefreshCoordinator::new(client, renderer.clone(), config);
    Ok((coordinator, renderer))
}

async fn run_refresh(config: DashboardConfig) -> Result<()> {
    let (coordinator, renderer) = build(&config)?;

    let outcome = coordinator.trigger_refresh().await;
    coordinator.dispose().await;

    match outcome {
        RefreshOutcome::Refreshed => {
            coordinator.reload_all().await;
            print!("{}", renderer.view());
            Ok(())
        }
        RefreshOutcome::Rejected { message } => Err(anyhow!(
            "Backend rejected refresh: {}",
            message.unwrap_or_else(|| "no message".to_string())
        )),
        RefreshOutcome::Unreachable { error } => Err(anyhow!("Backend unreachable: {}", error)),
    }
}

async fn run_watch(config: DashboardConfig, stream_enabled: bool) -> Result<()> {
    info!("Trading dashboard client v0.1.0");
    info!("Backend: {}", config.base_url);

    let client = Arc::new(DashboardClient::new(&config)?);
    let renderer = Arc::new(ConsoleRenderer::new(&config.containers, &config.users));
    let coordinator = RefreshCoordinator::new(client.clone(), renderer.clone(), &config);

    let stream = if config.stream_enabled && stream_enabled {
        Some(client.event_stream(config.stream_reconnect())?)
    } else {
        info!("Push stream disabled");
        None
    };
    coordinator.start(stream);

    info!("Commands: r = refresh, s = show, q = quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(cmd) => match cmd.trim() {
                        "r" | "refresh" => coordinator.spawn_refresh(),
                        "s" | "show" => print!("{}", renderer.view()),
                        "q" | "quit" => break,
                        "" => {}
                        other => warn!("Unknown command: {}", other),
                    },
                    // stdin closed; keep running until Ctrl-C
                    None => {
                        tokio::signal::ctrl_c().await?;
                        info!("Received shutdown signal");
                        break;
                    }
                }
            }
        }
    }

    coordinator.dispose().await;
    Ok(())
}
