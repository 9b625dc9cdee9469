use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::StreamExt;
use futures::channel::mpsc;
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderValue, Method, Request, Uri, Version};
use http_body::{Body, Frame, SizeHint};
use tracing::trace;

use crate::protocol::{BodyError, PayloadItem, PayloadSize, RawHeader, RequestHead};

type BodyItem = Result<PayloadItem, BodyError>;

/// A received request: its head and a stream over its body.
///
/// The body is fed by the connection as bytes arrive. Chunks the consumer has
/// not read yet are buffered, the connection never waits for the consumer.
#[derive(Debug)]
pub struct IncomingMessage {
    head: RequestHead,
    body: RequestBody,
}

impl IncomingMessage {
    pub fn new(head: RequestHead, body: RequestBody) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn uri(&self) -> &Uri {
        self.head.uri()
    }

    /// The request target as sent, path and query.
    pub fn url(&self) -> &str {
        self.head.uri().path_and_query().map_or_else(|| self.head.uri().path(), |target| target.as_str())
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.head.headers().get(name)
    }

    pub fn raw_headers(&self) -> &[RawHeader] {
        self.head.raw_headers()
    }

    pub fn is_upgrade(&self) -> bool {
        self.head.is_upgrade()
    }

    pub fn keep_alive(&self) -> bool {
        self.head.keep_alive()
    }

    /// Reads the next body item, see [`RequestBody::read`].
    pub async fn read(&mut self) -> Result<PayloadItem, BodyError> {
        self.body.read().await
    }

    pub fn body_mut(&mut self) -> &mut RequestBody {
        &mut self.body
    }

    pub fn into_body(self) -> RequestBody {
        self.body
    }

    pub fn into_request(self) -> Request<RequestBody> {
        self.head.body(self.body)
    }
}

/// The body of an [`IncomingMessage`].
///
/// Yields the chunks in arrival order, then exactly one terminal item:
/// `PayloadItem::Eof` when the body was complete, `BodyError::Aborted` when
/// the connection went away first. The stream is fused: reading past the end
/// repeats the terminal item.
#[derive(Debug)]
pub struct RequestBody {
    receiver: mpsc::UnboundedReceiver<BodyItem>,
    terminal: Option<Result<(), BodyError>>,
    remaining: Option<u64>,
}

/// The connection side of a [`RequestBody`].
#[derive(Debug)]
pub struct BodySender {
    sender: mpsc::UnboundedSender<BodyItem>,
    done: bool,
}

impl RequestBody {
    /// Creates a body and the sender the connection feeds it through.
    pub fn channel(payload_size: PayloadSize) -> (RequestBody, BodySender) {
        let (sender, receiver) = mpsc::unbounded();
        let remaining = match payload_size {
            PayloadSize::Length(length) => Some(length),
            PayloadSize::Empty => Some(0),
            PayloadSize::Chunked => None,
        };
        (RequestBody { receiver, terminal: None, remaining }, BodySender { sender, done: false })
    }

    /// Returns the next chunk, or the terminal item.
    pub async fn read(&mut self) -> Result<PayloadItem, BodyError> {
        poll_fn(|cx| self.poll_item(cx)).await
    }

    /// Reads the whole remaining body into one buffer.
    pub async fn collect_bytes(&mut self) -> Result<Bytes, BodyError> {
        let mut collected = bytes::BytesMut::new();
        while let PayloadItem::Chunk(bytes) = self.read().await? {
            collected.extend_from_slice(&bytes);
        }
        Ok(collected.freeze())
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.terminal, Some(Ok(())))
    }

    fn poll_item(&mut self, cx: &mut Context<'_>) -> Poll<Result<PayloadItem, BodyError>> {
        if let Some(terminal) = self.terminal {
            return Poll::Ready(terminal.map(|()| PayloadItem::Eof));
        }

        let item = match ready!(self.receiver.poll_next_unpin(cx)) {
            Some(item) => item,
            // sender dropped without a terminal item
            None => Err(BodyError::Aborted),
        };

        match &item {
            Ok(PayloadItem::Chunk(bytes)) => {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(bytes.len() as u64);
                }
            }
            Ok(PayloadItem::Eof) => self.terminal = Some(Ok(())),
            Err(e) => self.terminal = Some(Err(*e)),
        }
        Poll::Ready(item)
    }
}

impl Body for RequestBody {
    type Data = Bytes;
    type Error = BodyError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match ready!(this.poll_item(cx)) {
            Ok(PayloadItem::Chunk(bytes)) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
            Ok(PayloadItem::Eof) => Poll::Ready(None),
            Err(e) => Poll::Ready(Some(Err(e))),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.is_complete()
    }

    fn size_hint(&self) -> SizeHint {
        match self.remaining {
            Some(remaining) => SizeHint::with_exact(remaining),
            None => SizeHint::default(),
        }
    }
}

impl BodySender {
    /// Forwards a chunk. A consumer that dropped its body simply misses it.
    pub fn send_chunk(&self, bytes: Bytes) {
        if self.done {
            return;
        }
        if self.sender.unbounded_send(Ok(PayloadItem::Chunk(bytes))).is_err() {
            trace!("request body dropped by consumer, discard chunk");
        }
    }

    pub fn finish(&mut self) {
        self.terminate(Ok(PayloadItem::Eof));
    }

    /// Tells the consumer the body will never complete. No-op once finished.
    pub fn abort(&mut self) {
        self.terminate(Err(BodyError::Aborted));
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn terminate(&mut self, item: BodyItem) {
        if self.done {
            return;
        }
        self.done = true;
        let _ = self.sender.unbounded_send(item);
    }
}
