//! TCP bridge server.
//!
//! Exposes the dispatcher on a TCP port that stands in for the serial link.
//! One peer session is served at a time, and within a session each command is
//! dispatched to completion, transport write included, before the next line
//! is read. The protocol has no request identifiers, so this strict ordering
//! is what keeps responses attributable.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use sbridge_protocol::LineCodec;
use sbridge_runtime::{Dispatcher, TransportWriter};

/// Transport writer that queues encoded frames for the session loop.
///
/// Dispatch is synchronous while the socket is async, so writes are queued
/// during dispatch and drained to the socket immediately afterwards. Status
/// lines get the line terminator; chunked JSON buffers go out verbatim so
/// their chunk-size windows stay intact.
#[derive(Debug)]
pub struct SessionWriter {
    chunk_size: usize,
    pending: Vec<Vec<u8>>,
}

impl SessionWriter {
    /// Create a writer with the given chunk size.
    pub fn new(chunk_size: usize) -> Self {
        SessionWriter {
            chunk_size,
            pending: Vec::new(),
        }
    }

    /// Take all queued frames, in emission order.
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending)
    }
}

impl TransportWriter for SessionWriter {
    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn write_status(&mut self, line: &str) -> io::Result<()> {
        self.pending.push(LineCodec::encode_line(line));
        Ok(())
    }

    fn write_json(&mut self, payload: &[u8]) -> io::Result<()> {
        self.pending.push(payload.to_vec());
        Ok(())
    }
}

/// The TCP bridge server.
pub struct BridgeServer {
    listener: TcpListener,
    max_line: usize,
}

impl BridgeServer {
    /// Bind the server to an address (use port 0 to let the OS pick).
    pub async fn bind(addr: &str, max_line: usize) -> io::Result<BridgeServer> {
        let listener = TcpListener::bind(addr).await?;
        Ok(BridgeServer { listener, max_line })
    }

    /// The bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve peer sessions, one at a time, forever.
    ///
    /// `session_factory` builds a fresh dispatcher for each session, so one
    /// peer's collaborator state does not leak into the next session.
    pub async fn serve<F>(&self, mut session_factory: F) -> io::Result<()>
    where
        F: FnMut() -> Dispatcher<SessionWriter>,
    {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!(%peer, "peer connected");
            let dispatcher = session_factory();
            match run_session(stream, dispatcher, self.max_line).await {
                Ok(()) => info!(%peer, "peer disconnected"),
                Err(e) => warn!(%peer, error = %e, "session error"),
            }
        }
    }
}

/// Serve one peer session until the peer hangs up.
async fn run_session(
    mut stream: TcpStream,
    mut dispatcher: Dispatcher<SessionWriter>,
    max_line: usize,
) -> io::Result<()> {
    let mut codec = LineCodec::new(max_line);
    let mut read_buf = [0u8; 1024];

    loop {
        let n = stream.read(&mut read_buf).await?;
        if n == 0 {
            return Ok(());
        }
        codec.push(&read_buf[..n]);

        loop {
            match codec.decode_line() {
                Ok(Some(line)) => {
                    // A rejected line (unknown code, bad grammar) produces no
                    // wire output; the session just moves on.
                    if let Err(e) = dispatcher.dispatch_line(&line) {
                        warn!(line = %line, error = %e, "rejected command");
                    }
                    for frame in dispatcher.writer_mut().drain() {
                        stream.write_all(&frame).await?;
                    }
                    stream.flush().await?;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "line decode failed");
                }
            }
        }
    }
}
