//! Offload Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{StateRecord, SubmitResponse};
use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use std::time::Duration;

/// Request/response client for the Offload daemon.
///
/// # Example
///
/// ```no_run
/// use offload_sdk::OffloadClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OffloadClient::connect("http://127.0.0.1:9630")?;
/// let receipt = client.submit(1).await?;
/// let record = client.read(&receipt.message_id).await?;
/// # Ok(())
/// # }
/// ```
pub struct OffloadClient {
    client: HttpClient,
}

impl OffloadClient {
    /// Connect to the Offload daemon over HTTP
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9630`)
    pub fn connect(url: impl AsRef<str>) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url.as_ref())
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Submit a job for asynchronous processing.
    ///
    /// The response comes back immediately with the `messageId` to poll on
    /// and the `topic` to subscribe to; the work itself has not started.
    pub async fn submit(&self, job_type: i64) -> Result<SubmitResponse> {
        let mut params = ObjectParams::new();
        params.insert("type", job_type)?;

        let response: SubmitResponse = self.client.request("job.submit.v1", params).await?;
        Ok(response)
    }

    /// Read a job's current state record (polling fallback).
    pub async fn read(&self, message_id: impl AsRef<str>) -> Result<StateRecord> {
        let mut params = ObjectParams::new();
        params.insert("messageId", message_id.as_ref())?;

        let record: StateRecord = self.client.request("job.read.v1", params).await?;
        Ok(record)
    }
}

/// Push-channel client: a WebSocket connection to the daemon's hub.
///
/// # Example
///
/// ```no_run
/// use offload_sdk::OffloadSubscriber;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let subscriber = OffloadSubscriber::connect("ws://127.0.0.1:9630").await?;
/// let record = subscriber.wait_for_done("abc123").await?;
/// assert_eq!(record.state, "done");
/// # Ok(())
/// # }
/// ```
pub struct OffloadSubscriber {
    client: WsClient,
}

impl OffloadSubscriber {
    /// Connect to the Offload daemon over WebSocket
    ///
    /// # Arguments
    ///
    /// * `url` - WebSocket endpoint URL (e.g., `ws://127.0.0.1:9630`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let client = WsClientBuilder::default()
            .build(url.as_ref())
            .await
            .map_err(|e| SdkError::Connection(format!("Failed to create ws client: {}", e)))?;

        Ok(Self { client })
    }

    /// Open a live subscription on a topic.
    ///
    /// Must be opened before the job completes: the hub keeps no history, so
    /// a publish with nobody attached is gone for good.
    pub async fn subscribe(&self, topic: impl AsRef<str>) -> Result<Subscription<StateRecord>> {
        let mut params = ObjectParams::new();
        params.insert("topic", topic.as_ref())?;

        let subscription = self
            .client
            .subscribe("job.subscribe.v1", params, "job.unsubscribe.v1")
            .await?;

        Ok(subscription)
    }

    /// Subscribe, take the first notification, and tear the subscription
    /// down - the single-shot protocol the push channel is designed around.
    pub async fn wait_for_done(&self, topic: impl AsRef<str>) -> Result<StateRecord> {
        let mut subscription = self.subscribe(topic).await?;

        match subscription.next().await {
            Some(Ok(record)) => Ok(record),
            Some(Err(e)) => Err(SdkError::Serialization(e)),
            None => Err(SdkError::Connection(
                "Subscription closed before any notification".to_string(),
            )),
        }
        // Dropping the subscription unsubscribes from the hub.
    }
}
