//! HTTP connection handling module
//!
//! One [`HttpConnection`] drives one transport: it feeds received bytes to a
//! [`ParserAdapter`](crate::parser::ParserAdapter), hands every request to the
//! handler together with its response, and writes the responses back in
//! request order whatever order they complete in.
//!
//! # Components
//!
//! - [`HttpConnection`]: the per-connection task
//! - [`ConnectionConfig`]: pipelining, buffering and timeout knobs
//! - [`ConnectionInfo`]: what hooks learn about the connection
//! - [`ConnectionState`]: where the connection is in its lifecycle

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

mod http_connection;
mod message_writer;
mod response_queue;

pub use http_connection::HttpConnection;
pub use message_writer::MessageWriter;

/// Called with the connection that stayed idle past its timeout.
pub type TimeoutCallback = Arc<dyn Fn(&ConnectionInfo) + Send + Sync>;

/// Identity of a connection, as given to hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: u64,
    pub peer_addr: Option<SocketAddr>,
}

impl ConnectionInfo {
    pub fn new(id: u64, peer_addr: Option<SocketAddr>) -> Self {
        Self { id, peer_addr }
    }
}

/// Lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// between requests, nothing outstanding
    Idle,
    /// in the middle of a request
    Receiving,
    /// requests parsed, responses outstanding
    AwaitingResponse,
    /// the peer ended or the last response is known, finishing what is queued
    Draining,
    Closed,
}

#[derive(Clone)]
pub struct ConnectionConfig {
    /// Keep writing after the peer ended its side.
    pub allow_half_open: bool,
    /// Reading pauses while this many responses are outstanding.
    pub max_pipelined_requests: usize,
    pub read_buffer_size: usize,
    /// Unflushed bytes above which `OutgoingMessage::write` hints to slow down.
    pub write_high_water_mark: usize,
    /// `None` disables the idle timeout.
    pub idle_timeout: Option<Duration>,
    pub on_timeout: Option<TimeoutCallback>,
}

impl ConnectionConfig {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn allow_half_open(mut self, allow_half_open: bool) -> Self {
        self.allow_half_open = allow_half_open;
        self
    }

    pub fn max_pipelined_requests(mut self, max: usize) -> Self {
        self.max_pipelined_requests = max.max(1);
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    pub fn write_high_water_mark(mut self, size: usize) -> Self {
        self.write_high_water_mark = size;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn on_timeout<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ConnectionInfo) + Send + Sync + 'static,
    {
        self.on_timeout = Some(Arc::new(callback));
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            allow_half_open: false,
            max_pipelined_requests: 16,
            read_buffer_size: 8 * 1024,
            write_high_water_mark: 16 * 1024,
            idle_timeout: Some(Self::DEFAULT_IDLE_TIMEOUT),
            on_timeout: None,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("allow_half_open", &self.allow_half_open)
            .field("max_pipelined_requests", &self.max_pipelined_requests)
            .field("read_buffer_size", &self.read_buffer_size)
            .field("write_high_water_mark", &self.write_high_water_mark)
            .field("idle_timeout", &self.idle_timeout)
            .field("on_timeout", &self.on_timeout.as_ref().map(|_| ".."))
            .finish()
    }
}
