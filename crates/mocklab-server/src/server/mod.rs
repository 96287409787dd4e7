//! Mock server assembly and lifecycle.
//!
//! ## Module Structure
//!
//! - `dispatcher`: Resolve, decode, record and delay one request
//! - `handler`: HTTP framing for the mock listener
//! - `listener`: Accept loop for mock traffic

mod dispatcher;
mod handler;
mod listener;

pub use dispatcher::{DispatchError, Dispatcher, MockResponse};
pub use handler::{handle_mock_request, FIXTURE_HEADER};
pub use listener::MockServer;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::admin_api::{AdminApiServer, AdminState};
use crate::config::Config;
use crate::fixture::{LayeredResolver, OverlayState};
use crate::history::{HistorySink, RequestHistory};

/// The mock server with its shared state, not yet listening.
pub struct Mocklab {
    config: Config,
    overlay: Arc<OverlayState>,
    history: Arc<RequestHistory>,
    dispatcher: Arc<Dispatcher>,
}

impl Mocklab {
    /// Build the server from a validated configuration.
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        config.validate()?;
        let overlay = Arc::new(OverlayState::new(config.overlay.clone())?);
        let history = Arc::new(RequestHistory::new(config.history_limit));
        let resolver = Arc::new(LayeredResolver::new(
            config.mocks_dir.clone(),
            config.overlays_dir.clone(),
            Arc::clone(&overlay),
        ));
        let sink: Arc<dyn HistorySink> = history.clone();
        let dispatcher = Arc::new(Dispatcher::new(resolver, sink));
        Ok(Self {
            config,
            overlay,
            history,
            dispatcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn overlay(&self) -> &Arc<OverlayState> {
        &self.overlay
    }

    pub fn history(&self) -> &Arc<RequestHistory> {
        &self.history
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Bind the listeners and start serving in the background.
    pub async fn start(self) -> Result<RunningMocklab, anyhow::Error> {
        let mock = MockServer::bind(self.config.listen_addr(), Arc::clone(&self.dispatcher)).await?;
        let mock_addr = mock.local_addr()?;

        let admin = match self.config.admin_addr() {
            Some(addr) => {
                let state = Arc::new(AdminState::new(
                    self.config.clone(),
                    Arc::clone(&self.overlay),
                    Arc::clone(&self.history),
                ));
                Some(AdminApiServer::bind(addr, state).await?)
            }
            None => None,
        };
        let admin_addr = admin.as_ref().map(|a| a.local_addr()).transpose()?;

        self.log_banner(mock_addr, admin_addr);

        let mut tasks = JoinSet::new();
        tasks.spawn(mock.run());
        if let Some(admin) = admin {
            tasks.spawn(admin.run());
        }

        Ok(RunningMocklab {
            mock_addr,
            admin_addr,
            tasks,
        })
    }

    /// Serve until Ctrl-C or until a listener fails.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let running = self.start().await?;
        tokio::select! {
            result = running.wait() => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                Ok(())
            }
        }
    }

    fn log_banner(&self, mock_addr: SocketAddr, admin_addr: Option<SocketAddr>) {
        info!("Mock server running at http://{}", mock_addr);
        info!("Mocks directory: {}", self.config.mocks_dir.display());
        match self.overlay.get() {
            Some(name) => info!(
                "Active overlay: {} ({})",
                name,
                self.config.overlays_dir.join(&name).display()
            ),
            None => info!("Active overlay: none"),
        }
        if let Some(addr) = admin_addr {
            info!("Admin API listening on http://{}", addr);
        }
        match serde_json::to_string_pretty(&self.config) {
            Ok(json) => info!("Configuration: {}", json),
            Err(e) => error!("Could not serialize configuration: {}", e),
        }
    }
}

/// Handle to a started server. Dropping it stops the listeners.
pub struct RunningMocklab {
    mock_addr: SocketAddr,
    admin_addr: Option<SocketAddr>,
    tasks: JoinSet<Result<(), anyhow::Error>>,
}

impl RunningMocklab {
    pub fn mock_addr(&self) -> SocketAddr {
        self.mock_addr
    }

    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_addr
    }

    /// Wait until any listener stops.
    pub async fn wait(mut self) -> Result<(), anyhow::Error> {
        match self.tasks.join_next().await {
            Some(Ok(result)) => result,
            Some(Err(e)) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Stop accepting connections.
    pub fn shutdown(mut self) {
        self.tasks.abort_all();
    }
}
