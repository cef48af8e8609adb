//! Test chat client.
//!
//! A thin line client for integration tests: send commands, read reply
//! lines, and assert exact wire strings.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send one command line (terminator appended).
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    /// Send raw bytes verbatim - for split writes and file payloads.
    #[allow(dead_code)]
    pub async fn send_raw(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        Ok(())
    }

    /// Receive a single line, terminator included.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_line_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout. A clean EOF is an error ("connection
    /// closed") so tests can assert on disconnects.
    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line)
    }

    /// Assert the next line equals `want` exactly.
    pub async fn expect_line(&mut self, want: &str) -> anyhow::Result<()> {
        let got = self.recv_line().await?;
        if got != want {
            anyhow::bail!("expected {want:?}, got {got:?}");
        }
        Ok(())
    }

    /// Assert nothing arrives within `dur`.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await {
            Err(_) => Ok(()), // timed out: silence, as expected
            Ok(Ok(0)) => anyhow::bail!("connection closed while expecting silence"),
            Ok(Ok(_)) => anyhow::bail!("unexpected line: {line:?}"),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Wait for the server to close the connection.
    #[allow(dead_code)]
    pub async fn expect_eof(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut sink = Vec::new();
        timeout(dur, self.reader.read_to_end(&mut sink)).await??;
        Ok(())
    }

    /// Close the write side, simulating an abrupt client exit.
    #[allow(dead_code)]
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
