//! Connection - handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task: framed line reads and the
//! session's outbound queue are multiplexed with `tokio::select!`, so a
//! write to this client can never starve reads from it and vice versa.
//! A `/sendfile` command switches the inbound side into file-receive mode
//! until the declared byte count has been drained, then line parsing
//! resumes.

use crate::error::HandlerError;
use crate::handlers::{Context, Registry, UploadRequest};
use crate::state::{Hub, SessionId, SessionMode};
use crate::upload::UploadSink;
use chatd_proto::{LineCodec, ProtocolError, replies};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument, warn};

/// Idle cutoff used when the timeout is disabled; far enough out that the
/// timer never fires within a process lifetime.
const NO_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 3600);

/// Transfer chunk size for file-receive mode.
const UPLOAD_CHUNK: usize = 8 * 1024;

/// A client connection handler.
pub struct Connection {
    sid: SessionId,
    addr: SocketAddr,
    hub: Arc<Hub>,
    registry: Arc<Registry>,
    framed: Framed<TcpStream, LineCodec>,
    idle_timeout: Option<Duration>,
}

impl Connection {
    pub fn new(
        sid: SessionId,
        stream: TcpStream,
        addr: SocketAddr,
        hub: Arc<Hub>,
        registry: Arc<Registry>,
        max_line_bytes: usize,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sid,
            addr,
            hub,
            registry,
            framed: Framed::new(stream, LineCodec::with_max_len(max_line_bytes)),
            idle_timeout,
        }
    }

    /// Run the connection loop until the session ends, then clean up every
    /// trace of it in the Hub.
    #[instrument(skip(self), fields(sid = %self.sid, addr = %self.addr), name = "connection")]
    pub async fn run(mut self) -> anyhow::Result<()> {
        let (outgoing_tx, mut outgoing_rx) =
            mpsc::channel::<String>(self.hub.config.outbound_queue_depth);
        self.hub.register_sender(self.sid, outgoing_tx.clone());

        let idle = self.idle_timeout.unwrap_or(NO_TIMEOUT);
        let idle_sleep = tokio::time::sleep(idle);
        tokio::pin!(idle_sleep);

        let reason = loop {
            tokio::select! {
                result = self.framed.next() => {
                    match result {
                        Some(Ok(line)) => {
                            idle_sleep.as_mut().reset(tokio::time::Instant::now() + idle);
                            debug!(raw = %line, "Received line");
                            match self.dispatch_line(&outgoing_tx, &line).await {
                                Ok(None) => {}
                                Ok(Some(request)) => {
                                    if let Err(e) = self.receive_file(&outgoing_tx, request).await {
                                        debug!(error = %e, "Upload aborted");
                                        break "upload aborted";
                                    }
                                    idle_sleep.as_mut().reset(tokio::time::Instant::now() + idle);
                                }
                                Err(HandlerError::Quit) => break "client quit",
                                Err(e) => {
                                    debug!(error = %e, code = e.error_code(), "Handler error");
                                    break "handler error";
                                }
                            }
                        }
                        Some(Err(ProtocolError::LineTooLong { actual, limit })) => {
                            warn!(actual, limit, "Oversized line - disconnecting");
                            break "protocol violation";
                        }
                        Some(Err(e)) => {
                            debug!(error = %e, "Read error");
                            break "read error";
                        }
                        None => break "client disconnected",
                    }
                }
                Some(line) = outgoing_rx.recv() => {
                    if let Err(e) = self.framed.send(line).await {
                        debug!(error = %e, "Write error");
                        break "write error";
                    }
                }
                _ = &mut idle_sleep => {
                    info!("Idle timeout - disconnecting");
                    break "idle timeout";
                }
            }
        };

        self.hub.remove_session(self.sid);
        info!(reason, "Session closed");
        Ok(())
    }

    /// Dispatch one line; a `/sendfile` acceptance comes back as an
    /// [`UploadRequest`] for the loop to act on.
    async fn dispatch_line(
        &self,
        outgoing_tx: &mpsc::Sender<String>,
        line: &str,
    ) -> Result<Option<UploadRequest>, HandlerError> {
        let mut ctx = Context {
            sid: self.sid,
            hub: &self.hub,
            sender: outgoing_tx,
            upload: None,
        };
        self.registry.dispatch(&mut ctx, line).await?;
        Ok(ctx.upload)
    }

    /// File-receive sub-state: drain exactly `request.size` raw bytes into
    /// the upload sink, then resume line mode.
    async fn receive_file(
        &mut self,
        outgoing_tx: &mpsc::Sender<String>,
        request: UploadRequest,
    ) -> std::io::Result<()> {
        self.hub.set_mode(self.sid, SessionMode::FileRecv);
        info!(file = %request.filename, size = request.size, "Receiving upload");

        let sink = match UploadSink::create(
            &self.hub.config.upload_dir,
            &request.filename,
            request.size,
        )
        .await
        {
            Ok(sink) => sink,
            Err(e) => {
                // A sink failure is the server's problem, not a protocol
                // violation; the session stays up.
                warn!(error = %e, file = %request.filename, "Failed to open upload sink");
                self.hub.set_mode(self.sid, SessionMode::Line);
                let _ = outgoing_tx.try_send(replies::UPLOAD_FAILED.to_string());
                return Ok(());
            }
        };

        let result = self.copy_upload(sink).await;
        self.hub.set_mode(self.sid, SessionMode::Line);
        match result {
            Ok(()) => {
                info!(file = %request.filename, size = request.size, "Upload complete");
                let _ = outgoing_tx.try_send(replies::UPLOAD_DONE.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn copy_upload(&mut self, mut sink: UploadSink) -> std::io::Result<()> {
        // Bytes the line codec already pulled off the socket belong to the
        // file; drain those first.
        let buffered = self.framed.read_buffer_mut();
        if !buffered.is_empty() && sink.remaining() > 0 {
            let take = u64::min(buffered.len() as u64, sink.remaining()) as usize;
            let head = buffered.split_to(take);
            if let Err(e) = sink.write(&head).await {
                sink.discard().await;
                return Err(e);
            }
        }

        let idle_timeout = self.idle_timeout;
        let mut chunk = [0u8; UPLOAD_CHUNK];
        while sink.remaining() > 0 {
            let want = usize::min(chunk.len(), sink.remaining() as usize);
            let stream = self.framed.get_mut();
            let read = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.read(&mut chunk[..want])).await {
                    Ok(read) => read,
                    Err(_) => {
                        sink.discard().await;
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::TimedOut,
                            "upload stalled",
                        ));
                    }
                },
                None => stream.read(&mut chunk[..want]).await,
            };
            match read {
                Ok(0) => {
                    sink.discard().await;
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "connection closed mid-upload",
                    ));
                }
                Ok(n) => {
                    if let Err(e) = sink.write(&chunk[..n]).await {
                        sink.discard().await;
                        return Err(e);
                    }
                }
                Err(e) => {
                    sink.discard().await;
                    return Err(e);
                }
            }
        }

        sink.finish().await
    }
}
