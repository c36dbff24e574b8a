//! Per-connection timeouts for the exposition server.
//!
//! A connection moves through four phases, and each phase has its own clock:
//!
//! - `Idle`: waiting for the first byte of the next request. A fresh
//!   connection gets the read timeout, a kept-alive one the idle timeout.
//! - `Reading`: a request has started but its headers are incomplete. The
//!   read timeout runs from the first byte.
//! - `Handling`: the router is producing the response. The write deadline
//!   middleware bounds this phase.
//! - `Writing`: the response is being written to the socket. The write
//!   timeout runs until the connection has flushed it, then the connection
//!   is idle again.
//!
//! When a clock runs out the connection is dropped.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::Instant;
use tower::ServiceExt;
use tracing::debug;

/// Time allowed for a client to send a request once it has started.
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);
/// Time allowed to produce a response and write it out.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(15);
/// Keep-alive connections without a new request for this long are closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// The read, write and idle timeouts applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTimeouts {
    pub read: Duration,
    pub write: Duration,
    pub idle: Duration,
}

impl Default for ConnectionTimeouts {
    fn default() -> Self {
        Self {
            read: READ_TIMEOUT,
            write: WRITE_TIMEOUT,
            idle: IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Reading,
    Handling,
    Writing,
}

/// Shared view of the phase, updated by the socket and the service.
struct PhaseTracker {
    tx: watch::Sender<Phase>,
}

impl PhaseTracker {
    fn new() -> Self {
        let (tx, _) = watch::channel(Phase::Idle);
        Self { tx }
    }

    fn subscribe(&self) -> watch::Receiver<Phase> {
        self.tx.subscribe()
    }

    fn enter(&self, phase: Phase) {
        self.tx.send_replace(phase);
    }

    /// Moves to `to` only when currently in `from`.
    fn advance(&self, from: Phase, to: Phase) {
        self.tx.send_if_modified(|current| {
            if *current == from {
                *current = to;
                true
            } else {
                false
            }
        });
    }
}

/// A TCP stream reporting the first byte of a request and the flush of a
/// response to the tracker.
struct TrackedStream {
    inner: TcpStream,
    tracker: Arc<PhaseTracker>,
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            if buf.filled().len() > before {
                self.tracker.advance(Phase::Idle, Phase::Reading);
            }
        }
        poll
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let poll = Pin::new(&mut self.inner).poll_flush(cx);
        if let Poll::Ready(Ok(())) = poll {
            self.tracker.advance(Phase::Writing, Phase::Idle);
        }
        poll
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Serves one HTTP/1.1 connection until the client leaves or a timeout fires.
pub(crate) async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    app: Router,
    timeouts: ConnectionTimeouts,
) {
    let tracker = Arc::new(PhaseTracker::new());
    let mut phases = tracker.subscribe();

    let svc = {
        let tracker = tracker.clone();
        service_fn(move |request: Request<Incoming>| {
            let tracker = tracker.clone();
            let app = app.clone();
            tracker.enter(Phase::Handling);
            async move {
                let response = app.oneshot(request).await;
                tracker.enter(Phase::Writing);
                response
            }
        })
    };

    let io = TokioIo::new(TrackedStream {
        inner: stream,
        tracker: tracker.clone(),
    });
    let connection = http1::Builder::new().serve_connection(io, svc);
    tokio::pin!(connection);

    let mut phase = Phase::Idle;
    let mut deadline = Some(Instant::now() + timeouts.read);
    loop {
        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    debug!(%peer_addr, error = %e, "Metrics connection closed with error");
                }
                break;
            }
            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                phase = *phases.borrow_and_update();
                let now = Instant::now();
                deadline = match phase {
                    Phase::Idle => Some(now + timeouts.idle),
                    Phase::Reading => Some(now + timeouts.read),
                    Phase::Handling => None,
                    Phase::Writing => Some(now + timeouts.write),
                };
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                debug!(%peer_addr, phase = ?phase, "Metrics connection timed out");
                break;
            }
        }
    }
}
