use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use bill_ledger::BillRegistry;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::router::{build_router, AppState};

/// Relay gateway HTTP server.
pub struct GatewayServer {
    config: GatewayConfig,
    registry: Arc<dyn BillRegistry>,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, registry: Arc<dyn BillRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Router with tracing and, when enabled, permissive CORS.
    pub fn router(&self) -> Router {
        let mut router =
            build_router(AppState::new(self.registry.clone())).layer(TraceLayer::new_for_http());
        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        router
    }

    /// Start serving requests.
    pub async fn serve(self) -> GatewayResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("relay gateway listening on {}", self.config.bind_addr);
        axum::serve(listener, self.router())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }

    /// Serve on an already bound listener in a background task and return
    /// its local address (useful with port 0).
    pub fn spawn(self, listener: TcpListener) -> GatewayResult<SocketAddr> {
        let addr = listener.local_addr()?;
        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("gateway server error: {e}");
            }
        });
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bill_ledger::InMemoryLedger;

    #[test]
    fn server_construction() {
        let server = GatewayServer::new(GatewayConfig::default(), Arc::new(InMemoryLedger::default()));
        assert_eq!(server.config().bind_addr.port(), 8787);
        let _router = server.router();
    }

    #[tokio::test]
    async fn spawned_server_answers_health() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = GatewayServer::new(GatewayConfig::default(), Arc::new(InMemoryLedger::default()));
        let addr = server.spawn(listener).unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"chainId\""));
    }
}
