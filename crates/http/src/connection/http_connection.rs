use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::channel::mpsc;
use http::header::CONNECTION;
use http::{HeaderValue, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::select;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::connection::message_writer::MessageWriter;
use crate::connection::response_queue::ResponseQueue;
use crate::connection::{ConnectionConfig, ConnectionInfo, ConnectionState};
use crate::handler::{ClientErrorAction, Handler};
use crate::message::{BodySender, FrameKind, IncomingMessage, OutgoingMessage, RequestBody, ResponseFrame};
use crate::parser::{ParseEvent, ParserAdapter};
use crate::protocol::{Framing, HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHead, ResponseHead, SendError};

const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// A request whose body is still being received.
#[derive(Debug)]
struct IncomingSlot {
    id: u64,
    /// `None` for requests discarded after the last one
    body: Option<BodySender>,
}

/// An HTTP/1.1 server connection.
///
/// `HttpConnection` owns both halves of a transport and everything that
/// touches them: it reads and parses requests, spawns the handler of each one
/// on its own task, and writes the responses back strictly in request order.
/// Responses reach it as frames over a channel, so a response that completes
/// early simply waits in its slot until every earlier response is written.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    reader: R,
    writer: MessageWriter<W>,
    read_buf: BytesMut,
    parser: Option<ParserAdapter>,
    incoming_queue: VecDeque<IncomingSlot>,
    responses: ResponseQueue,
    frames_tx: mpsc::UnboundedSender<ResponseFrame>,
    frames_rx: mpsc::UnboundedReceiver<ResponseFrame>,
    config: ConnectionConfig,
    info: ConnectionInfo,
    next_id: u64,
    /// peer ended, close once the queue is empty
    closing: bool,
    peer_ended: bool,
    /// id of the request after which the connection closes
    last_request: Option<u64>,
    last_request_complete: bool,
}

impl<R, W> fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("info", &self.info)
            .field("config", &self.config)
            .field("parser", &self.parser)
            .field("incoming", &self.incoming_queue.len())
            .field("responses", &self.responses)
            .field("next_id", &self.next_id)
            .field("peer_ended", &self.peer_ended)
            .field("last_request", &self.last_request)
            .finish_non_exhaustive()
    }
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default(), ConnectionInfo::new(0, None))
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig, info: ConnectionInfo) -> Self {
        let (frames_tx, frames_rx) = mpsc::unbounded();
        Self {
            reader,
            writer: MessageWriter::with_capacity(writer, config.write_high_water_mark),
            read_buf: BytesMut::with_capacity(config.read_buffer_size),
            parser: Some(ParserAdapter::new()),
            incoming_queue: VecDeque::new(),
            responses: ResponseQueue::new(),
            frames_tx,
            frames_rx,
            config,
            info,
            next_id: 0,
            closing: false,
            peer_ended: false,
            last_request: None,
            last_request_complete: false,
        }
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    pub fn state(&self) -> ConnectionState {
        match &self.parser {
            None => ConnectionState::Closed,
            Some(_) if self.peer_ended || self.closing || self.responses.is_closed() => ConnectionState::Draining,
            Some(parser) if parser.is_mid_message() => ConnectionState::Receiving,
            Some(_) if self.last_request.is_some() => ConnectionState::Draining,
            Some(_) if !self.responses.is_empty() => ConnectionState::AwaitingResponse,
            Some(_) => ConnectionState::Idle,
        }
    }

    /// Serves the connection until it closes.
    ///
    /// Returns `Ok` when the connection ended in an orderly way: the last
    /// response was written, the peer ended and nothing was outstanding, or
    /// the idle timeout fired. Any parse or transport error is returned after
    /// the handler's [`on_client_error`](Handler::on_client_error) had its say.
    /// Either way, bodies still being received observe an abort.
    pub async fn process<H: Handler>(mut self, handler: Arc<H>) -> Result<(), HttpError> {
        debug!(id = self.info.id, peer = ?self.info.peer_addr, "connection opened");
        let result = self.run(&handler).await;

        if let Err(e) = &result {
            error!(id = self.info.id, cause = %e, "connection failed");
            if let ClientErrorAction::Reply(status) = handler.on_client_error(e, &self.info)
                && e.is_parse_error()
                && self.responses.is_empty()
                && let Err(reply_error) = self.reply(status)
            {
                warn!(cause = %reply_error, "can't encode client error reply");
            }
        }

        self.close();
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "transport shutdown failed");
        }
        result
    }

    async fn run<H: Handler>(&mut self, handler: &Arc<H>) -> Result<(), HttpError> {
        let idle_timeout = self.config.idle_timeout;
        let idle = time::sleep(idle_timeout.unwrap_or(Duration::MAX));
        tokio::pin!(idle);

        loop {
            trace!(state = ?self.state(), queued = self.responses.len(), "connection loop");

            if self.responses.is_closed() {
                debug!(id = self.info.id, "last response written");
                return Ok(());
            }
            if self.peer_ended && self.responses.is_empty() {
                debug!(id = self.info.id, "peer ended and nothing is outstanding");
                return Ok(());
            }

            // back-pressure only applies between messages, a body being received is always read
            let mid_message = self.parser.as_ref().is_some_and(|parser| parser.is_mid_message());
            let can_read = !self.peer_ended
                && !self.last_request_complete
                && (mid_message || self.responses.len() < self.config.max_pipelined_requests);

            select! {
                biased;

                Some(frame) = self.frames_rx.next() => {
                    self.on_frame(frame);
                    while let Ok(frame) = self.frames_rx.try_recv() {
                        self.on_frame(frame);
                    }
                    self.flush().await?;
                }

                read = self.reader.read_buf(&mut self.read_buf), if can_read => {
                    match read {
                        Ok(0) => self.on_peer_end()?,
                        Ok(size) => {
                            trace!(size, "read bytes");
                            self.on_data(handler)?;
                        }
                        Err(e) => return Err(ParseError::io(e).into()),
                    }
                    self.flush().await?;
                }

                () = &mut idle, if idle_timeout.is_some() => {
                    info!(id = self.info.id, "connection idle timeout");
                    if let Some(on_timeout) = &self.config.on_timeout {
                        on_timeout(&self.info);
                    }
                    return Ok(());
                }
            }

            if let Some(timeout) = idle_timeout {
                idle.as_mut().reset(Instant::now() + timeout);
            }
        }
    }

    fn on_data<H: Handler>(&mut self, handler: &Arc<H>) -> Result<(), HttpError> {
        let fed = match self.parser.as_mut() {
            Some(parser) => parser.feed(&self.read_buf),
            None => Ok(()),
        };
        self.read_buf.clear();

        // requests parsed before a bad byte are still dispatched
        self.drain_events(handler);

        match fed {
            Err(e) if self.last_request_complete => {
                debug!(cause = %e, "unparsable bytes after the last request, ignored");
                Ok(())
            }
            fed => fed.map_err(Into::into),
        }
    }

    fn on_peer_end(&mut self) -> Result<(), HttpError> {
        debug!(id = self.info.id, "peer ended its side");
        self.peer_ended = true;

        if !self.last_request_complete
            && let Some(parser) = self.parser.as_mut()
        {
            parser.finish()?;
        }

        if self.config.allow_half_open {
            if !self.responses.mark_last() {
                trace!("nothing queued, ending now");
            }
        } else {
            self.closing = true;
        }
        Ok(())
    }

    fn drain_events<H: Handler>(&mut self, handler: &Arc<H>) {
        while let Some(event) = self.parser.as_mut().and_then(|parser| parser.next_event()) {
            match event {
                ParseEvent::HeaderFragment(lines) => trace!(lines = lines.len(), "header fragment"),
                ParseEvent::HeadersComplete(head, payload_size) => self.on_head(head, payload_size, handler),
                ParseEvent::BodyChunk(bytes) => {
                    if let Some(body) = self.incoming_queue.back().and_then(|slot| slot.body.as_ref()) {
                        body.send_chunk(bytes);
                    }
                }
                ParseEvent::MessageComplete => self.on_message_complete(),
            }
        }
    }

    fn on_head<H: Handler>(&mut self, head: RequestHead, payload_size: PayloadSize, handler: &Arc<H>) {
        let id = self.next_id;
        self.next_id += 1;

        if self.last_request.is_some() {
            debug!(id, method = %head.method(), uri = %head.uri(), "request after the last one, discarded");
            self.incoming_queue.push_back(IncomingSlot { id, body: None });
            return;
        }

        let is_last = !head.keep_alive() || head.is_upgrade();
        if is_last {
            self.last_request = Some(id);
        }

        debug!(id, method = %head.method(), uri = %head.uri(), version = ?head.version(), is_last, "request received");

        let write_state = self.responses.enqueue(id, is_last);
        if head.expects_continue() {
            write_state.queued.fetch_add(CONTINUE.len(), Ordering::AcqRel);
            self.responses.stage(id, Bytes::from_static(CONTINUE));
        }

        let response =
            OutgoingMessage::new(id, &head, is_last, self.frames_tx.clone(), write_state, self.config.write_high_water_mark);
        let (body, sender) = RequestBody::channel(payload_size);
        self.incoming_queue.push_back(IncomingSlot { id, body: Some(sender) });

        tokio::spawn(handler.call(IncomingMessage::new(head, body), response));
    }

    fn on_message_complete(&mut self) {
        if let Some(slot) = self.incoming_queue.back_mut() {
            if let Some(body) = slot.body.as_mut() {
                body.finish();
            }
            trace!(id = slot.id, "request complete");
            if self.last_request == Some(slot.id) {
                self.last_request_complete = true;
            }
        }
        self.incoming_queue.retain(|slot| slot.body.as_ref().is_some_and(|body| !body.is_done()));
    }

    fn on_frame(&mut self, frame: ResponseFrame) {
        match frame.kind {
            FrameKind::Data(bytes) => self.responses.stage(frame.id, bytes),
            FrameKind::End { last } => self.responses.finish(frame.id, last),
            FrameKind::Abandoned => {
                warn!(id = frame.id, "response abandoned, connection closes after it");
                self.responses.abandon(frame.id);
            }
        }
    }

    async fn flush(&mut self) -> Result<(), HttpError> {
        let flush = self.responses.poll_flush();
        for bytes in &flush.bytes {
            self.writer.push(bytes);
        }
        self.writer.flush().await?;

        for id in flush.retired {
            trace!(id, "response written");
        }
        if flush.close {
            debug!(id = self.info.id, "closing after the last response");
        }
        Ok(())
    }

    /// Encodes a bodyless reply closing the connection, sent on shutdown.
    fn reply(&mut self, status: StatusCode) -> Result<(), SendError> {
        let mut head = ResponseHead::new(status);
        head.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
        self.writer.write(Message::<_, Bytes>::Header((&head, Framing::Length(0))))?;
        self.writer.write(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Eof))
    }

    fn close(&mut self) {
        for slot in self.incoming_queue.drain(..) {
            if let Some(mut body) = slot.body {
                body.abort();
            }
        }
        self.parser = None;
        trace!(id = self.info.id, state = ?self.state(), "connection closed");
    }
}
