//! Full-stack round-trip: SDK client -> JSON-RPC server -> pipeline -> push.
//!
//! Runs the real jsonrpsee server on an ephemeral port and talks to it the
//! way an external client would.

use std::sync::Arc;
use std::time::Duration;

use jsonrpsee::server::ServerHandle;
use offload_api_rpc::server::RpcServerConfig;
use offload_api_rpc::RpcServer;
use offload_core::application::{shutdown_channel, Dispatcher, ShutdownSender, SubmitService};
use offload_core::port::id_provider::ClockEntropyIdProvider;
use offload_core::port::job_runner::mocks::GatedJobRunner;
use offload_core::port::time_provider::SystemTimeProvider;
use offload_core::port::{InMemoryJobQueue, JobQueue, NotificationPublisher, StateStore};
use offload_infra_sqlite::{create_pool, run_migrations, SqliteStateStore};
use offload_notify::NotificationHub;
use offload_sdk::{OffloadClient, OffloadSubscriber, SdkError};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

struct Stack {
    http_url: String,
    ws_url: String,
    runner: Arc<GatedJobRunner>,
    _rpc_handle: ServerHandle,
    _shutdown_tx: ShutdownSender,
}

async fn start_stack() -> Stack {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(SystemTimeProvider);
    let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(pool, time_provider.clone()));
    let queue = Arc::new(InMemoryJobQueue::new());
    let hub = Arc::new(NotificationHub::default());
    let runner = Arc::new(GatedJobRunner::new());

    let submit_service = Arc::new(SubmitService::new(
        store.clone(),
        queue.clone(),
        Arc::new(ClockEntropyIdProvider),
        time_provider.clone(),
        "",
    ));

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let dispatcher = Dispatcher::new(
        queue.clone() as Arc<dyn JobQueue>,
        store.clone(),
        hub.clone() as Arc<dyn NotificationPublisher>,
        runner.clone(),
        time_provider,
    );
    tokio::spawn(async move {
        dispatcher.run(shutdown_rx).await.unwrap();
    });

    // Port 0: let the OS pick a free port for the test.
    let config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let server = RpcServer::new(config, submit_service, store, hub);
    let (addr, rpc_handle) = server.start().await.unwrap();

    Stack {
        http_url: format!("http://{}", addr),
        ws_url: format!("ws://{}", addr),
        runner,
        _rpc_handle: rpc_handle,
        _shutdown_tx: shutdown_tx,
    }
}

#[tokio::test]
async fn submit_read_subscribe_roundtrip() {
    let stack = start_stack().await;
    let client = OffloadClient::connect(&stack.http_url).unwrap();
    let subscriber = OffloadSubscriber::connect(&stack.ws_url).await.unwrap();

    // Submit: immediate acknowledgment with id and topic.
    let receipt = client.submit(1).await.unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.topic, receipt.message_id);

    // Immediate read never observes done (the job is gated).
    let record = client.read(&receipt.message_id).await.unwrap();
    assert_ne!(record.state, "done");
    assert_eq!(record.message_id, receipt.message_id);
    assert_eq!(record.job_type, 1);

    // Subscribe before completion, then let the work finish.
    let mut subscription = subscriber.subscribe(&receipt.topic).await.unwrap();
    stack.runner.release_one();

    let pushed = tokio::time::timeout(WAIT_TIMEOUT, subscription.next())
        .await
        .expect("notification should arrive")
        .expect("subscription should stay open")
        .expect("notification should deserialize");

    assert_eq!(pushed.message_id, receipt.message_id);
    assert_eq!(pushed.job_type, 1);
    assert_eq!(pushed.state, "done");
    drop(subscription);

    // The polling fallback agrees with the push.
    let final_record = client.read(&receipt.message_id).await.unwrap();
    assert_eq!(final_record.state, "done");
}

#[tokio::test]
async fn wait_for_done_takes_first_push_and_closes() {
    let stack = start_stack().await;
    let client = OffloadClient::connect(&stack.http_url).unwrap();
    let subscriber = OffloadSubscriber::connect(&stack.ws_url).await.unwrap();

    let receipt = client.submit(3).await.unwrap();

    let wait = tokio::spawn({
        let topic = receipt.topic.clone();
        async move { subscriber.wait_for_done(&topic).await }
    });

    // Give the subscription a moment to register before releasing the gate.
    tokio::time::sleep(Duration::from_millis(250)).await;
    stack.runner.release_one();

    let record = tokio::time::timeout(WAIT_TIMEOUT, wait)
        .await
        .expect("wait_for_done should return")
        .unwrap()
        .unwrap();
    assert_eq!(record.message_id, receipt.message_id);
    assert_eq!(record.state, "done");
}

#[tokio::test]
async fn read_unknown_id_is_not_found() {
    let stack = start_stack().await;
    let client = OffloadClient::connect(&stack.http_url).unwrap();

    let err = client.read("no-such-id").await.unwrap_err();
    match err {
        SdkError::Rpc { code, .. } => assert_eq!(code, 4001),
        other => panic!("expected RPC not-found error, got {:?}", other),
    }
}

#[tokio::test]
async fn submit_with_invalid_type_is_rejected() {
    let stack = start_stack().await;
    let client = OffloadClient::connect(&stack.http_url).unwrap();

    let err = client.submit(0).await.unwrap_err();
    match err {
        SdkError::Rpc { code, .. } => assert_eq!(code, 4000),
        other => panic!("expected RPC validation error, got {:?}", other),
    }
}
