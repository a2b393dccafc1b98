use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use messenger_status::{
    SnapshotState,
    actors::{stats_aggregator::StatsAggregatorHandle, status_monitor::StatusMonitorHandle},
    config::{Config, StorageConfig, read_config_file},
    storage::{StatsSource, memory::MemoryStatsSource},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON); site defaults are used without one
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("messenger_status", LevelFilter::DEBUG),
        ("status_hub", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path).with_context(|| format!("failed to load {path}"))?,
        None => Config::default(),
    };

    let source = open_stats_source(&config.stats.storage).await?;
    let snapshots = Arc::new(SnapshotState::new());
    let cancel = CancellationToken::new();

    let monitor = StatusMonitorHandle::spawn(&config.probe, snapshots.clone(), cancel.child_token());
    let aggregator = StatsAggregatorHandle::spawn(
        &config.stats,
        source,
        snapshots.clone(),
        cancel.child_token(),
    );

    #[cfg(feature = "api")]
    {
        use messenger_status::api::{ApiConfig, ApiState, spawn_api_server};
        use messenger_status::tokens::AuthTokenService;

        let api_config = ApiConfig::from(&config.api);
        let tokens = Arc::new(AuthTokenService::new());
        let api_state = ApiState::new(snapshots, tokens);
        spawn_api_server(api_config, api_state, cancel.child_token()).await?;
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    cancel.cancel();

    let (monitor, aggregator) = tokio::join!(monitor.shutdown(), aggregator.shutdown());
    for result in [monitor, aggregator] {
        if let Err(e) = result {
            error!("background task ended abnormally: {e:#}");
        }
    }

    Ok(())
}

async fn open_stats_source(storage: &StorageConfig) -> anyhow::Result<Arc<dyn StatsSource>> {
    match storage {
        StorageConfig::None => {
            warn!("no stats database configured, dashboard will stay empty");
            Ok(Arc::new(MemoryStatsSource::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => {
            use messenger_status::storage::sqlite::SqliteStatsSource;

            let source = SqliteStatsSource::open(path)
                .await
                .with_context(|| format!("failed to open stats database {}", path.display()))?;
            Ok(Arc::new(source))
        }
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => {
            anyhow::bail!("built without the storage-sqlite feature")
        }
    }
}
