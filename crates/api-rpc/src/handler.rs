//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{throttled_error, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{ReadRequest, SubmitRequest, SubmitResponse, SubscribeRequest};
use jsonrpsee::core::StringError;
use jsonrpsee::server::{PendingSubscriptionSink, SubscriptionMessage};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use offload_core::application::SubmitService;
use offload_core::domain::StateRecord;
use offload_core::error::AppError;
use offload_core::port::StateStore;
use offload_notify::NotificationHub;
use std::sync::Arc;
use tracing::{debug, info};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    submit_service: Arc<SubmitService>,
    state_store: Arc<dyn StateStore>,
    hub: Arc<NotificationHub>,
    rate_limiter: Arc<RateLimiter>,
}

impl RpcHandler {
    pub fn new(
        submit_service: Arc<SubmitService>,
        state_store: Arc<dyn StateStore>,
        hub: Arc<NotificationHub>,
    ) -> Self {
        // Default: 200 burst, 100 req/sec (configurable via env)
        let max_burst: u32 = std::env::var("OFFLOAD_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        let rate_per_sec: u32 = std::env::var("OFFLOAD_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            submit_service,
            state_store,
            hub,
            rate_limiter: Arc::new(RateLimiter::new(max_burst, rate_per_sec)),
        }
    }

    /// job.submit.v1
    ///
    /// Returns immediately with the receipt; processing happens on the
    /// dispatcher workers, never on the request path.
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check() {
            return Err(throttled_error());
        }

        let receipt = self
            .submit_service
            .submit(params.job_type)
            .await
            .map_err(to_rpc_error)?;

        Ok(SubmitResponse {
            message_id: receipt.message_id,
            topic: receipt.topic,
            success: true,
        })
    }

    /// job.read.v1
    ///
    /// Polling fallback: pure read-through to the state store.
    pub async fn read(&self, params: ReadRequest) -> Result<StateRecord, ErrorObjectOwned> {
        self.state_store
            .get(&params.message_id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::NotFound(format!(
                    "No record for message {}",
                    params.message_id
                )))
            })
    }

    /// job.subscribe.v1
    ///
    /// Long-lived push channel: registers the connection with the hub and
    /// forwards every notification on the topic until the client disconnects
    /// or the hub shuts down. The hub never closes a connection after one
    /// delivery - tearing down after the first message is the subscriber's
    /// job.
    pub async fn subscribe(
        &self,
        params: Params<'static>,
        pending: PendingSubscriptionSink,
    ) -> Result<(), StringError> {
        let req: SubscribeRequest = match params.parse() {
            Ok(req) => req,
            Err(e) => {
                pending.reject(e).await;
                return Ok(());
            }
        };

        let mut subscription = self.hub.subscribe(req.topic.clone());
        let sink = pending.accept().await?;

        info!(topic = %req.topic, "Push subscription opened");

        loop {
            tokio::select! {
                maybe_msg = subscription.recv() => {
                    match maybe_msg {
                        Some(msg) => {
                            let payload = SubscriptionMessage::from_json(&msg.record)?;
                            if sink.send(payload).await.is_err() {
                                debug!(topic = %req.topic, "Subscriber gone, stopping forward loop");
                                break;
                            }
                        }
                        None => {
                            debug!(topic = %req.topic, "Hub shut down, closing subscription");
                            break;
                        }
                    }
                }
                _ = sink.closed() => {
                    debug!(topic = %req.topic, "Subscriber disconnected");
                    break;
                }
            }
        }

        info!(topic = %req.topic, "Push subscription closed");
        Ok(())
    }
}
