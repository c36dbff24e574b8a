//! Exposition server bootstrap and lifecycle.
//!
//! Startup happens in two phases. During registration the [`MetricsServer`]
//! owns a mutable [`MetricsCollector`] and accepts providers. [`MetricsServer::run`]
//! then freezes the collector and serves it from a background task for the
//! rest of the process lifetime.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use prometheus::IntCounter;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{MetricsServerConfig, ResolvedServerConfig};
use crate::connection::{serve_connection, ConnectionTimeouts};
use crate::error::{MetricsError, Result};
use crate::metrics::{MetricsCollector, MetricsProvider};
use crate::routes;
use crate::state::AppState;

/// Back-off after a failed `accept`, e.g. when file descriptors run out.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The exposition server during its registration phase.
pub struct MetricsServer {
    config: ResolvedServerConfig,
    collector: MetricsCollector,
    timeouts: ConnectionTimeouts,
}

impl MetricsServer {
    /// Applies configuration defaults and builds the collector with its
    /// default instruments. An unroutable path is rejected here, before
    /// anything is bound.
    pub fn new(config: &MetricsServerConfig) -> Result<Self> {
        Ok(Self {
            config: config.resolve()?,
            collector: MetricsCollector::new()?,
            timeouts: ConnectionTimeouts::default(),
        })
    }

    /// Replaces the fixed connection timeouts.
    pub fn with_timeouts(mut self, timeouts: ConnectionTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn config(&self) -> &ResolvedServerConfig {
        &self.config
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    pub fn register_provider(&mut self, provider: &dyn MetricsProvider) -> Result<usize> {
        self.collector.register_provider(provider)
    }

    /// Handle to the default event-received counter.
    pub fn event_received(&self) -> IntCounter {
        self.collector.event_received()
    }

    /// Ends registration and binds the configured address.
    pub async fn bind(self) -> Result<BoundServer> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| MetricsError::Bind { address, source })?;
        Ok(self.attach(listener))
    }

    /// Ends registration and serves on an already bound listener.
    pub fn attach(self, listener: TcpListener) -> BoundServer {
        let state = AppState::new(Arc::new(self.collector));
        let app = routes::create_router(state, &self.config.path, self.timeouts.write);
        BoundServer {
            listener,
            app,
            path: self.config.path,
            timeouts: self.timeouts,
        }
    }

    /// Starts serving in a background task and returns immediately.
    ///
    /// Failing to bind is fatal: the error is logged and the process exits.
    pub fn run(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let server = match self.bind().await {
                Ok(server) => server,
                Err(e) => {
                    error!(error = %e, "Metrics server error");
                    std::process::exit(1);
                }
            };
            if let Err(e) = server.serve().await {
                error!(error = %e, "Metrics server error");
                std::process::exit(1);
            }
        })
    }
}

/// A listening exposition server whose registry can no longer change.
pub struct BoundServer {
    listener: TcpListener,
    app: Router,
    path: String,
    timeouts: ConnectionTimeouts,
}

impl BoundServer {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever, one task per connection.
    pub async fn serve(self) -> Result<()> {
        let local_addr = self.local_addr()?;
        info!("Metrics server listening on {}{}", local_addr, self.path);

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Failed to accept metrics connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            tokio::spawn(serve_connection(
                stream,
                peer_addr,
                self.app.clone(),
                self.timeouts,
            ));
        }
    }
}
