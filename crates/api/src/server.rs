//! RPC server: serves the transaction use-case until shutdown.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use codebank_infra::TransactionUseCase;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Transaction RPC server.
///
/// Holds the one use-case instance shared by every request.
#[derive(Debug, Clone)]
pub struct RpcServer {
    use_case: Arc<TransactionUseCase>,
}

impl RpcServer {
    pub fn new(use_case: Arc<TransactionUseCase>) -> Self {
        Self { use_case }
    }

    pub fn use_case(&self) -> &Arc<TransactionUseCase> {
        &self.use_case
    }

    pub fn router(&self) -> Router {
        crate::app::build_app(self.use_case.clone())
    }

    pub async fn bind(address: &str) -> Result<TcpListener, ServerError> {
        TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.to_string(),
                source,
            })
    }

    /// Serve until `shutdown` completes, then drain in-flight requests.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match listener.local_addr() {
            Ok(addr) => info!(%addr, topic = %self.use_case.topic(), "transaction rpc server running"),
            Err(e) => info!(error = %e, "transaction rpc server running (address unknown)"),
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;

        info!("transaction rpc server stopped");
        Ok(())
    }
}

/// Completes on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to install Ctrl-C handler; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
