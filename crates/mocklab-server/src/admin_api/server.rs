//! Admin API server.

use crate::admin_api::router::route_request;
use crate::config::Config;
use crate::fixture::OverlayState;
use crate::history::RequestHistory;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, error};

/// Server state the admin endpoints read and mutate.
pub struct AdminState {
    /// Effective configuration at startup
    pub config: Config,
    pub overlay: Arc<OverlayState>,
    pub history: Arc<RequestHistory>,
}

impl AdminState {
    pub fn new(config: Config, overlay: Arc<OverlayState>, history: Arc<RequestHistory>) -> Self {
        Self {
            config,
            overlay,
            history,
        }
    }
}

/// Admin API server for the mock server
pub struct AdminApiServer {
    listener: TcpListener,
    state: Arc<AdminState>,
}

impl AdminApiServer {
    /// Bind the admin listener
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        state: Arc<AdminState>,
    ) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the admin API server
    pub async fn run(self) -> Result<(), anyhow::Error> {
        loop {
            let (stream, _) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Admin API accept error: {}", e);
                    continue;
                }
            };
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { route_request(req, state).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Admin API connection error: {}", e);
                }
            });
        }
    }
}
