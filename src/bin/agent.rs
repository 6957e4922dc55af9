//! volagent binary: runs the controller or replica role of the membership agent

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volagent::common::AgentConfig;
use volagent::controller::{ControllerAgent, HttpControllerClient};
use volagent::metadata::{Discovery, HttpMetadataClient};
use volagent::replica::{HttpReplicaClient, HttpReplicaConnector, ReplicaAgent};
use volagent::status::{self, ReplicaHealthCheck, StatusState};

#[derive(Parser)]
#[command(name = "volagent")]
#[command(about = "Replica membership agent for a replicated block volume")]
#[command(version)]
struct Cli {
    /// Bind address for the status endpoints
    #[arg(short, long, global = true)]
    listen: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run next to the volume controller
    Controller,

    /// Run next to a replica
    Replica,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AgentConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("volagent {}", volagent::VERSION);

    match cli.command {
        Commands::Controller => run_controller(config).await,
        Commands::Replica => run_replica(config).await,
    }
}

async fn run_controller(config: AgentConfig) -> anyhow::Result<()> {
    let http_timeout = config.http_timeout()?;

    let listen = config.listen;
    tokio::spawn(async move {
        if let Err(e) = status::serve(listen, StatusState::default()).await {
            tracing::error!("Status server error: {}", e);
        }
    });

    let metadata = Arc::new(HttpMetadataClient::new(&config.metadata_url, http_timeout)?);
    metadata
        .wait_until_reachable(config.metadata_wait_interval()?)
        .await;

    let controller = Arc::new(HttpControllerClient::new(
        &config.controller_url,
        config.volume_name.clone(),
        http_timeout,
    )?);
    let discovery = Discovery::new(metadata, config.replica_service.clone(), config.replica_port);
    let agent = ControllerAgent::new(
        controller,
        discovery,
        Arc::new(HttpReplicaConnector::new(http_timeout)),
        config.timings()?,
    );

    let shutdown = agent.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, stopping after the current pass.");
            shutdown.notify_one();
        }
    });

    let res = agent.start().await;
    agent.close();
    match res {
        Ok(()) | Err(volagent::Error::Shutdown) => Ok(()),
        Err(e) => {
            tracing::error!("{}", e);
            Err(e).context("controller startup failed")
        }
    }
}

async fn run_replica(config: AgentConfig) -> anyhow::Result<()> {
    let http_timeout = config.http_timeout()?;

    let metadata = Arc::new(HttpMetadataClient::new(&config.metadata_url, http_timeout)?);
    metadata
        .wait_until_reachable(config.metadata_wait_interval()?)
        .await;

    let replica = Arc::new(HttpReplicaClient::new(&config.replica_url, http_timeout)?);
    let agent = ReplicaAgent::new(
        replica.clone(),
        metadata,
        config.replica_service.clone(),
        config.replica_port,
        config.default_volume_size,
    );
    let res = start_replica(&agent, replica, &config, http_timeout).await;
    agent.close();
    res
}

async fn start_replica(
    agent: &ReplicaAgent,
    replica: Arc<HttpReplicaClient>,
    config: &AgentConfig,
    http_timeout: std::time::Duration,
) -> anyhow::Result<()> {
    agent.start().await?;

    let controller = Arc::new(HttpControllerClient::new(
        &config.controller_status_url,
        config.volume_name.clone(),
        http_timeout,
    )?);
    let check = ReplicaHealthCheck::new(replica, controller, agent.self_address().await?);
    tracing::info!("Reporting health for replica {}", check.address());
    let state = StatusState {
        replica: Some(Arc::new(check)),
    };

    tokio::select! {
        res = status::serve(config.listen, state) => res?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown requested."),
    }
    Ok(())
}
