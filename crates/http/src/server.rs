//! TCP accept loop.
//!
//! A [`Server`] binds its addresses and drives every accepted stream with its
//! own [`HttpConnection`] task. Connections share the handler and nothing else.
//!
//! The library never installs a tracing subscriber; binaries do.

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span, warn};

use crate::connection::{ConnectionConfig, ConnectionInfo, HttpConnection};
use crate::handler::Handler;

pub struct ServerBuilder<H> {
    address: Option<io::Result<Vec<SocketAddr>>>,
    handler: Option<H>,
    config: ConnectionConfig,
}

impl<H: Handler> ServerBuilder<H> {
    fn new() -> Self {
        Self { address: None, handler: None, config: ConnectionConfig::default() }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server<H>, ServerBuildError> {
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }
        Ok(Server { address, handler: Arc::new(handler), config: self.config })
    }
}

impl<H> fmt::Debug for ServerBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("address", &self.address)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

pub struct Server<H> {
    address: Vec<SocketAddr>,
    handler: Arc<H>,
    config: ConnectionConfig,
}

impl<H: Handler> Server<H> {
    pub fn builder() -> ServerBuilder<H> {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Sets how long a connection may stay idle, and what to call before an
    /// idle connection is destroyed.
    pub fn set_timeout<F>(&mut self, timeout: Duration, callback: F)
    where
        F: Fn(&ConnectionInfo) + Send + Sync + 'static,
    {
        self.config = self.config.clone().idle_timeout(Some(timeout)).on_timeout(callback);
    }

    /// Binds the configured addresses and serves them.
    ///
    /// Only returns if binding fails.
    pub async fn start(self) -> io::Result<()> {
        info!(address = ?self.address, "start listening");
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        self.serve(tcp_listener).await;
        Ok(())
    }

    /// Serves an already bound listener, forever.
    pub async fn serve(self, tcp_listener: TcpListener) {
        let mut next_id = 0_u64;
        loop {
            let (tcp_stream, peer_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let info = ConnectionInfo::new(next_id, Some(peer_addr));
            next_id += 1;

            let handler = Arc::clone(&self.handler);
            let config = self.config.clone();
            let span = info_span!("connection", id = info.id, peer = %peer_addr);

            tokio::spawn(
                async move {
                    let (reader, writer) = tcp_stream.into_split();
                    let connection = HttpConnection::with_config(reader, writer, config, info);
                    match connection.process(handler).await {
                        Ok(()) => info!("finished process, connection shutdown"),
                        Err(e) => error!(cause = %e, "connection failed, shutdown"),
                    }
                }
                .instrument(span),
            );
        }
    }
}

impl<H> fmt::Debug for Server<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("address", &self.address).field("config", &self.config).finish()
    }
}
