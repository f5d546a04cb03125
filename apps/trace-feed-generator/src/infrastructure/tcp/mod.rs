//! TCP feed server: one client at a time, newline-delimited JSON.
//!
//! The delivery side of the feed. The server binds once at startup with
//! address reuse, accepts a single client, and drains the shared delivery
//! queue to it as JSON lines. Client failures are routine rather than
//! fatal: any send or accept error logs and returns the server to the
//! accepting state. Only the initial bind can fail.
//!
//! # Connection lifecycle
//!
//! `LISTENING -> CONNECTED -> (send loop) -> LISTENING` on any send
//! failure or peer disconnect. Delivery is at-most-once: a record whose
//! send failed mid-stream is not retried.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::queue::FeedQueue;

/// Sleep between queue polls while a client is connected and the queue
/// is empty.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Listen backlog. One client is served at a time; the backlog only
/// holds peers waiting for the slot.
const ACCEPT_BACKLOG: u32 = 64;

// =============================================================================
// Error Type
// =============================================================================

/// Startup errors for the feed server. Everything after a successful
/// bind is handled internally.
#[derive(Debug, thiserror::Error)]
pub enum FeedServerError {
    /// The configured host did not resolve to an address.
    #[error("Failed to resolve feed address {0}: {1}")]
    ResolveFailed(String, String),

    /// The listener could not be created or bound.
    #[error("Failed to bind feed server to {0}: {1}")]
    BindFailed(String, String),
}

// =============================================================================
// Configuration
// =============================================================================

/// Bind configuration for the feed server.
#[derive(Debug, Clone)]
pub struct FeedServerConfig {
    /// Host to bind: an IP address or a resolvable name.
    pub host: String,
    /// Port to bind. Port 0 asks the OS for a free port.
    pub port: u16,
}

// =============================================================================
// Feed Server
// =============================================================================

/// Single-client TCP server draining the delivery queue.
pub struct TcpFeedServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    queue: Arc<FeedQueue>,
    cancel: CancellationToken,
}

impl TcpFeedServer {
    /// Resolves the configured address and binds the listener once, with
    /// address reuse so a quick restart does not trip `TIME_WAIT`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedServerError`] if the host does not resolve or the
    /// listener cannot be bound. Bind failures are fatal at startup;
    /// nothing after a successful bind fails the server.
    pub async fn bind(
        config: &FeedServerConfig,
        queue: Arc<FeedQueue>,
        cancel: CancellationToken,
    ) -> Result<Self, FeedServerError> {
        let target = format!("{}:{}", config.host, config.port);
        let addr = tokio::net::lookup_host(&target)
            .await
            .map_err(|e| FeedServerError::ResolveFailed(target.clone(), e.to_string()))?
            .next()
            .ok_or_else(|| {
                FeedServerError::ResolveFailed(target.clone(), "no addresses returned".to_string())
            })?;

        let listener = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .and_then(|socket| {
            socket.set_reuseaddr(true)?;
            socket.bind(addr)?;
            socket.listen(ACCEPT_BACKLOG)
        })
        .map_err(|e| FeedServerError::BindFailed(target.clone(), e.to_string()))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| FeedServerError::BindFailed(target, e.to_string()))?;

        Ok(Self {
            listener,
            local_addr,
            queue,
            cancel,
        })
    }

    /// The bound address. With port 0 this is where the OS actually put
    /// the listener.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until cancelled. Accept errors log at warn and retry;
    /// client disconnects log at info and return to accepting. The
    /// server never fails once bound.
    pub async fn run(self) {
        info!(addr = %self.local_addr, "Feed server listening");

        loop {
            info!("Waiting for feed client");
            tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("Feed server cancelled");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "Feed client connected");
                        match self.stream_records(stream).await {
                            Ok(()) => {
                                info!("Feed server cancelled");
                                return;
                            }
                            Err(e) => {
                                info!(%peer, error = %e, "Feed client disconnected");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Feed accept failed");
                    }
                }
            }
        }
    }

    /// Drains the queue to one client. `Ok` means shutdown was signaled;
    /// `Err` is a transport failure and sends the caller back to accept.
    async fn stream_records(&self, mut stream: TcpStream) -> Result<(), std::io::Error> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            match self.queue.dequeue() {
                Some(record) => {
                    let mut line = match serde_json::to_string(&record) {
                        Ok(line) => line,
                        Err(e) => {
                            // Unsendable as-is; skip rather than stall the feed.
                            warn!(error = %e, "Dropping unserializable record");
                            continue;
                        }
                    };
                    line.push('\n');
                    stream.write_all(line.as_bytes()).await?;
                }
                None => tokio::time::sleep(IDLE_POLL).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::{TradeOverrides, TradeRecord};
    use parking_lot::Mutex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;

    fn config(host: &str, port: u16) -> FeedServerConfig {
        FeedServerConfig {
            host: host.to_string(),
            port,
        }
    }

    // Buffers subscriber output so assertions can scan emitted events.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogCapture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn bind_reports_os_assigned_port() {
        let server = TcpFeedServer::bind(
            &config("127.0.0.1", 0),
            Arc::new(FeedQueue::new()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_ne!(server.local_addr().port(), 0);
        assert!(server.local_addr().ip().is_loopback());
    }

    #[tokio::test]
    async fn bind_fails_for_unresolvable_host() {
        let result = TcpFeedServer::bind(
            &config("no-such-host.invalid", 0),
            Arc::new(FeedQueue::new()),
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(FeedServerError::ResolveFailed(_, _))));
    }

    #[tokio::test]
    async fn rebind_succeeds_after_listener_drops() {
        let queue = Arc::new(FeedQueue::new());
        let first = TcpFeedServer::bind(
            &config("127.0.0.1", 0),
            Arc::clone(&queue),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        let port = first.local_addr().port();
        drop(first);

        // Address reuse lets the same port come straight back.
        TcpFeedServer::bind(
            &config("127.0.0.1", port),
            queue,
            CancellationToken::new(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn accept_loop_announces_waiting_between_clients() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();
        // Thread-scoped subscriber; the single-threaded test runtime polls
        // the server task on this thread, so its events land in the capture.
        let _guard = tracing::subscriber::set_default(subscriber);

        let cancel = CancellationToken::new();
        let queue = Arc::new(FeedQueue::new());
        let server = TcpFeedServer::bind(
            &config("127.0.0.1", 0),
            Arc::clone(&queue),
            cancel.clone(),
        )
        .await
        .unwrap();
        let addr = server.local_addr();
        let handle = tokio::spawn(server.run());

        let stream = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(stream);

        // The dead peer only surfaces on a failed write, so keep records
        // flowing until the server falls back to accepting.
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            queue.enqueue(TradeRecord::generate(TradeOverrides::default(), &mut rng));
            tokio::time::sleep(Duration::from_millis(5)).await;
            if capture.contents().matches("Waiting for feed client").count() >= 2 {
                break;
            }
        }

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("server should stop after cancel")
            .unwrap();

        let logs = capture.contents();
        assert!(
            logs.matches("Waiting for feed client").count() >= 2,
            "expected a waiting announcement before each accept, got:\n{logs}"
        );
    }

    #[tokio::test]
    async fn run_exits_promptly_on_cancel() {
        let cancel = CancellationToken::new();
        let server = TcpFeedServer::bind(
            &config("127.0.0.1", 0),
            Arc::new(FeedQueue::new()),
            cancel.clone(),
        )
        .await
        .unwrap();

        let handle = tokio::spawn(server.run());
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("server should stop after cancel")
            .unwrap();
    }
}
