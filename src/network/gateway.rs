//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the socket and spawns a Connection task for each
//! incoming client. Bind failure is fatal; accept failure is logged and
//! the event dropped.

use crate::config::Config;
use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::{Hub, SessionIdGenerator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
    registry: Arc<Registry>,
    sid_gen: SessionIdGenerator,
    max_line_bytes: usize,
    idle_timeout: Option<Duration>,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(
        config: &Config,
        hub: Arc<Hub>,
        registry: Arc<Registry>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.listen.address).await?;
        info!(address = %config.listen.address, "Listener bound");

        Ok(Self {
            listener,
            hub,
            registry,
            sid_gen: SessionIdGenerator::new(),
            max_line_bytes: config.limits.max_line_bytes,
            idle_timeout: config.idle_timeout(),
        })
    }

    /// The actually bound address (relevant when the port was 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let sid = self.sid_gen.next();
                    let session = self.hub.register_session(sid);
                    info!(%sid, %addr, username = %session.username, "Connection accepted");

                    let connection = Connection::new(
                        sid,
                        stream,
                        addr,
                        Arc::clone(&self.hub),
                        Arc::clone(&self.registry),
                        self.max_line_bytes,
                        self.idle_timeout,
                    );
                    tokio::spawn(async move {
                        if let Err(e) = connection.run().await {
                            error!(%sid, %addr, error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
