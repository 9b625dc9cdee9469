//! Application hooks of a connection.
//!
//! A [`Handler`] receives every parsed request together with its response,
//! and decides what happens when a client sends something unusable. Each
//! [`call`](Handler::call) runs on its own task, so a slow handler never holds
//! up parsing or the responses of other requests.

use std::future::Future;
use std::sync::Arc;

use http::StatusCode;

use crate::connection::ConnectionInfo;
use crate::message::{IncomingMessage, OutgoingMessage};
use crate::protocol::HttpError;

/// What to do with a connection that failed on a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientErrorAction {
    /// Close the connection without writing anything.
    #[default]
    Destroy,
    /// Write a bodyless response with this status first, when the error is a
    /// malformed request and no response is outstanding.
    Reply(StatusCode),
}

pub trait Handler: Send + Sync + 'static {
    type Future: Future<Output = ()> + Send + 'static;

    fn call(&self, request: IncomingMessage, response: OutgoingMessage) -> Self::Future;

    fn on_client_error(&self, _error: &HttpError, _info: &ConnectionInfo) -> ClientErrorAction {
        ClientErrorAction::Destroy
    }
}

impl<H: Handler> Handler for Arc<H> {
    type Future = H::Future;

    fn call(&self, request: IncomingMessage, response: OutgoingMessage) -> Self::Future {
        (**self).call(request, response)
    }

    fn on_client_error(&self, error: &HttpError, info: &ConnectionInfo) -> ClientErrorAction {
        (**self).on_client_error(error, info)
    }
}

#[derive(Debug, Clone)]
pub struct HandlerFn<F> {
    f: F,
    client_error: ClientErrorAction,
}

impl<F> HandlerFn<F> {
    /// Answers malformed requests with `status` instead of closing silently.
    pub fn reply_on_client_error(mut self, status: StatusCode) -> Self {
        self.client_error = ClientErrorAction::Reply(status);
        self
    }
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(IncomingMessage, OutgoingMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    type Future = Fut;

    fn call(&self, request: IncomingMessage, response: OutgoingMessage) -> Self::Future {
        (self.f)(request, response)
    }

    fn on_client_error(&self, _error: &HttpError, _info: &ConnectionInfo) -> ClientErrorAction {
        self.client_error
    }
}

pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(IncomingMessage, OutgoingMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    HandlerFn { f, client_error: ClientErrorAction::Destroy }
}
