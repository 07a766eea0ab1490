//! JSON-RPC Server
//!
//! Serves request/response methods over HTTP and the push subscription over
//! WebSocket on the same localhost listener.

use crate::handler::RpcHandler;
use crate::types::{ReadRequest, SubmitRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use offload_core::application::SubmitService;
use offload_core::port::StateStore;
use offload_notify::NotificationHub;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        submit_service: Arc<SubmitService>,
        state_store: Arc<dyn StateStore>,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(submit_service, state_store, hub)),
        }
    }

    /// Start the JSON-RPC server.
    ///
    /// Security: only binds to localhost by default (no external access).
    /// Returns the bound address (useful with port 0) and the server handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to resolve local addr: {}", e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("job.submit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SubmitRequest = params.parse()?;
                    handler.submit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.read.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ReadRequest = params.parse()?;
                    handler.read(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_subscription(
                "job.subscribe.v1",
                "job.notification.v1",
                "job.unsubscribe.v1",
                move |params, pending, _, _| {
                    let handler = handler.clone();
                    async move { handler.subscribe(params, pending).await }
                },
            )
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
