//! Test server management.
//!
//! Spawns in-process chatd instances for integration testing. Each server
//! binds an ephemeral port and stores uploads in its own temp directory.

use chatd::config::Config;
use chatd::handlers::Registry;
use chatd::network::Gateway;
use chatd::state::Hub;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    upload_dir: TempDir,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server with default configuration.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a server with a configuration tweak applied on top of the
    /// defaults (limits, timeouts).
    pub async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let upload_dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.listen.address = "127.0.0.1:0".parse()?;
        config.upload.dir = upload_dir.path().to_path_buf();
        tweak(&mut config);

        let hub = Arc::new(Hub::new(&config));
        let registry = Arc::new(Registry::new());
        let gateway = Gateway::bind(&config, hub, registry).await?;
        let addr = gateway.local_addr()?;

        let task = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self {
            addr,
            upload_dir,
            task,
        })
    }

    /// Get the server address.
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Where this server stores uploads.
    #[allow(dead_code)]
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(self.addr).await
    }

    /// Connect and claim a username, asserting the welcome reply.
    pub async fn connect_as(&self, name: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect().await?;
        client.send_line(&format!("/name {name}")).await?;
        client.expect_line(&format!("Welcome, {name}!\n")).await?;
        Ok(client)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
