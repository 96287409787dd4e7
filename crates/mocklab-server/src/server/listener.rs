//! TCP listener for mock traffic.

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, error};

use super::dispatcher::Dispatcher;
use super::handler::handle_mock_request;

/// Accept loop serving fixture responses.
pub struct MockServer {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl MockServer {
    /// Bind the listener. Port 0 picks an ephemeral port.
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the task is dropped. Accept failures are logged and the
    /// loop continues.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let service = service_fn(move |req| {
                            let dispatcher = Arc::clone(&dispatcher);
                            async move { handle_mock_request(req, dispatcher).await }
                        });
                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            debug!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}
