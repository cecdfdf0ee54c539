//! LIFELINE probe
//!
//! Connects to a TCP-reachable store through the connection manager, records
//! the outcome in an LMDB-backed offline store, and prints the connection
//! metrics. When the store is unreachable the last cached observation is
//! reported instead.
//!
//! ```text
//! lifeline-probe --target db.internal:5432 [--config lifeline.toml] [--data-dir ./lifeline-data]
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lifeline_connection::{ConnectionManager, TcpConnector};
use lifeline_core::constants::{CONFIG_PATH_ENV, DEFAULT_LMDB_MAP_SIZE_MB};
use lifeline_core::{ConfigError, LifelineConfig, LifelineError, LifelineResult};
use lifeline_storage::{LmdbKeyValueStore, OfflineStore, TcpReachabilityObserver};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LAST_SEEN_KEY: &str = "probe:last_seen";
const REACHABILITY_POLL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Observation {
    target: SocketAddr,
    connected_at: DateTime<Utc>,
    source: String,
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    target: Option<String>,
    data_dir: Option<PathBuf>,
}

fn parse_args() -> LifelineResult<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next().ok_or_else(|| {
                LifelineError::from(ConfigError::InvalidValue {
                    field: name.to_string(),
                    value: String::new(),
                    reason: format!("{} requires a value", flag),
                })
            })
        };
        match flag.as_str() {
            "--config" => args.config = Some(PathBuf::from(value("config")?)),
            "--target" => args.target = Some(value("target")?),
            "--data-dir" => args.data_dir = Some(PathBuf::from(value("data_dir")?)),
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "argument".to_string(),
                    value: other.to_string(),
                    reason: "expected --config, --target or --data-dir".to_string(),
                }
                .into())
            }
        }
    }

    Ok(args)
}

fn load_config(args: &Args) -> LifelineResult<LifelineConfig> {
    match &args.config {
        Some(path) => LifelineConfig::from_path(path),
        None => LifelineConfig::load(),
    }
}

async fn resolve_target(args: &Args) -> LifelineResult<SocketAddr> {
    let target = args
        .target
        .clone()
        .or_else(|| std::env::var("LIFELINE_TARGET").ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: "target".to_string(),
            value: String::new(),
            reason: "pass --target host:port or set LIFELINE_TARGET".to_string(),
        })?;

    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "target".to_string(),
        value: target.clone(),
        reason,
    };

    let addr = tokio::net::lookup_host(target.as_str())
        .await
        .map_err(|e| invalid(e.to_string()))?
        .next();
    addr.ok_or_else(|| invalid("no addresses resolved".to_string()).into())
}

#[tokio::main]
async fn main() -> LifelineResult<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;
    let config = load_config(&args)?;
    let target = resolve_target(&args).await?;

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| std::env::var("LIFELINE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("lifeline-data"));

    tracing::info!(
        %target,
        data_dir = %data_dir.display(),
        config_env = CONFIG_PATH_ENV,
        "Starting LIFELINE probe"
    );

    let persistent = Arc::new(LmdbKeyValueStore::open(&data_dir, DEFAULT_LMDB_MAP_SIZE_MB)?);
    let store = Arc::new(OfflineStore::open(config.cache.clone(), persistent)?);

    let observer =
        TcpReachabilityObserver::spawn(target, REACHABILITY_POLL, config.connection.probe_timeout);
    store.start(&observer);

    let connector = TcpConnector::new(target, config.connection.probe_timeout);
    let manager = ConnectionManager::new(config.connection.clone(), connector, Arc::clone(&store))?;
    manager.start(&observer);

    let observation = manager
        .execute_with_sync_fallback(
            |client| {
                let store = Arc::clone(&store);
                async move {
                    let observation = Observation {
                        target: client.addr(),
                        connected_at: client.connected_at(),
                        source: "live".to_string(),
                    };
                    store.set(LAST_SEEN_KEY, &observation);
                    Ok(observation)
                }
            },
            || {
                store
                    .get::<Observation>(LAST_SEEN_KEY)
                    .map(|mut cached| {
                        cached.source = "cache".to_string();
                        cached
                    })
                    .ok_or_else(|| LifelineError::query("target unreachable and nothing cached"))
            },
        )
        .await;

    match &observation {
        Ok(observation) => println!(
            "{} reachable at {} (source: {})",
            observation.target, observation.connected_at, observation.source
        ),
        Err(e) => eprintln!("probe failed: {}", e),
    }

    let report = serde_json::json!({
        "state": manager.state(),
        "metrics": manager.metrics(),
        "health": manager.health(),
        "cache": store.stats(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::warn!(error = %e, "Could not render report"),
    }

    manager.stop().await;
    store.stop();
    observer.stop();

    observation.map(|_| ())
}
