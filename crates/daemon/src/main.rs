//! Offload Job Engine - Main Entry Point
//! JSON-RPC gateway + dispatcher worker pool + notification hub

mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use offload_api_rpc::{server::RpcServerConfig, RpcServer};
use offload_core::application::{shutdown_channel, Dispatcher, SubmitService};
use offload_core::port::id_provider::ClockEntropyIdProvider;
use offload_core::port::job_runner::SimulatedJobRunner;
use offload_core::port::time_provider::SystemTimeProvider;
use offload_core::port::{InMemoryJobQueue, JobQueue, NotificationPublisher, StateStore};
use offload_infra_sqlite::{create_pool, run_migrations, SqliteStateStore};
use offload_notify::NotificationHub;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.offload/jobs.db";
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_WORK_DELAY_MS: u64 = 10_000;
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = std::env::var("OFFLOAD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("offload=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Offload Job Engine v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let db_path = std::env::var("OFFLOAD_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let rpc_port: u16 = std::env::var("OFFLOAD_RPC_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9630);

    let worker_count: usize = std::env::var("OFFLOAD_WORKERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_WORKERS);

    let work_delay_ms: u64 = std::env::var("OFFLOAD_WORK_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_WORK_DELAY_MS);

    let topic_base_url = std::env::var("OFFLOAD_TOPIC_BASE_URL").unwrap_or_default();

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(ClockEntropyIdProvider);
    let state_store: Arc<dyn StateStore> =
        Arc::new(SqliteStateStore::new(pool.clone(), time_provider.clone()));
    let queue: Arc<InMemoryJobQueue> = Arc::new(InMemoryJobQueue::new());
    let hub = Arc::new(NotificationHub::default());
    let runner = Arc::new(SimulatedJobRunner::new(Duration::from_millis(work_delay_ms)));

    let submit_service = Arc::new(SubmitService::new(
        state_store.clone(),
        queue.clone(),
        id_provider,
        time_provider.clone(),
        topic_base_url,
    ));

    // 5. Start dispatcher workers
    info!(workers = worker_count, "Starting dispatcher workers...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut worker_handles = Vec::with_capacity(worker_count);

    for _ in 0..worker_count {
        let dispatcher = Dispatcher::new(
            queue.clone() as Arc<dyn JobQueue>,
            state_store.clone(),
            hub.clone() as Arc<dyn NotificationPublisher>,
            runner.clone(),
            time_provider.clone(),
        );
        let shutdown = shutdown_rx.clone();
        worker_handles.push(tokio::spawn(async move {
            if let Err(e) = dispatcher.run(shutdown).await {
                tracing::error!(error = ?e, "Dispatcher worker failed");
            }
        }));
    }

    // 6. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        submit_service,
        state_store.clone(),
        hub.clone(),
    );
    let (_rpc_addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Waiting for jobs...");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown: stop intake, drain workers, close push channels
    queue.close();
    shutdown_tx.shutdown();
    for handle in worker_handles {
        let _ = tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, handle).await;
    }
    hub.shutdown_all();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;

    info!("Shutdown complete.");

    Ok(())
}
