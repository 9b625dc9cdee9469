//! The server side of HTTP/1.1 connections, with pipelining.
//!
//! A client may send several requests on one connection without waiting for
//! the responses. This crate parses them as they arrive, hands each one to the
//! application together with its [`OutgoingMessage`](message::OutgoingMessage),
//! and writes the responses back in request order, however the application
//! interleaves them. A response that completes early waits in its slot, a
//! response that owns the connection streams straight to it.
//!
//! # Example
//!
//! ```no_run
//! use h1_pipeline::handler::make_handler;
//! use h1_pipeline::message::{IncomingMessage, OutgoingMessage};
//! use h1_pipeline::server::Server;
//! use tracing::{Level, error};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let handler = make_handler(|mut request: IncomingMessage, mut response: OutgoingMessage| async move {
//!         let body = match request.body_mut().collect_bytes().await {
//!             Ok(body) => body,
//!             Err(e) => return error!(cause = %e, "request body aborted"),
//!         };
//!         if let Err(e) = response.end_with(format!("{} {} bytes\r\n", request.url(), body.len())) {
//!             error!(cause = %e, "can't send response");
//!         }
//!     });
//!
//!     let server = Server::builder().address("127.0.0.1:8080").handler(handler).build().unwrap();
//!     if let Err(e) = server.start().await {
//!         error!(cause = %e, "server stopped");
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`server`]: accept loop, one connection task per stream
//! - [`connection`]: the per-connection pipeline and its configuration
//! - [`parser`]: turns received bytes into [`ParseEvent`](parser::ParseEvent)s
//! - [`message`]: the request and response objects handed to the application
//! - [`handler`]: the application hooks
//! - [`codec`]: `tokio_util` decoders and encoders of heads and bodies
//! - [`protocol`]: message types and errors
//!
//! # Ordering
//!
//! Every parsed request gets a slot in the connection's response queue. Only
//! the slot at the head of the queue writes to the transport; the others keep
//! what their response produced until the earlier responses are complete.
//! A response flagged last (HTTP/1.0 without keep-alive, `Connection: close`,
//! an upgrade, or an explicit `set_keep_alive(false)`) closes the connection
//! once it is written, and requests parsed after it are discarded.
//!
//! # Limitations
//!
//! - HTTP/1.1 and HTTP/1.0 only, no TLS
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64
//! - Upgrades end the connection; the upgraded protocol is not served

pub mod codec;
pub mod connection;
pub mod handler;
pub mod message;
pub mod parser;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
