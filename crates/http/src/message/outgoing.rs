use std::borrow::Cow;
use std::fmt::Display;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::{Buf, Bytes, BytesMut};
use futures::channel::mpsc;
use http::header::{AsHeaderName, CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode, Version};
use http_body::Body;
use http_body_util::BodyExt;
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::codec::ResponseEncoder;
use crate::ensure;
use crate::protocol::{Framing, Message, PayloadItem, RequestHead, ResponseError, ResponseHead};

/// Shared between a response and its connection: whether the response owns
/// the transport, and how many of its bytes are not flushed yet.
#[derive(Debug, Default)]
pub(crate) struct WriteState {
    pub(crate) owner: AtomicBool,
    pub(crate) queued: AtomicUsize,
}

#[derive(Debug)]
pub(crate) struct ResponseFrame {
    pub(crate) id: u64,
    pub(crate) kind: FrameKind,
}

#[derive(Debug)]
pub(crate) enum FrameKind {
    /// Encoded bytes, head and body alike.
    Data(Bytes),
    /// The response is complete. `last` asks the connection to close after it.
    End { last: bool },
    /// The response was dropped unfinished.
    Abandoned,
}

/// The response to one [`IncomingMessage`](crate::message::IncomingMessage).
///
/// Nothing here touches the transport: every call encodes bytes under the
/// response framing and hands them to the connection, which writes them once
/// every earlier response on the connection is complete. Calls never block.
///
/// The head can be changed until it is sent, either explicitly with
/// [`write_head`](Self::write_head) or implicitly by the first
/// [`write`](Self::write) or [`end`](Self::end).
#[derive(Debug)]
pub struct OutgoingMessage {
    id: u64,
    head: ResponseHead,
    request_version: Version,
    suppress_body: bool,
    forced_last: bool,
    is_last: bool,
    headers_sent: bool,
    finished: bool,
    framing: Option<Framing>,
    encoder: ResponseEncoder,
    buffer: BytesMut,
    frames: mpsc::UnboundedSender<ResponseFrame>,
    write_state: triomphe::Arc<WriteState>,
    high_water_mark: usize,
}

impl OutgoingMessage {
    pub(crate) fn new(
        id: u64,
        request: &RequestHead,
        is_last: bool,
        frames: mpsc::UnboundedSender<ResponseFrame>,
        write_state: triomphe::Arc<WriteState>,
        high_water_mark: usize,
    ) -> Self {
        Self {
            id,
            head: ResponseHead::new(StatusCode::OK),
            request_version: request.version(),
            suppress_body: *request.method() == Method::HEAD,
            forced_last: is_last,
            is_last,
            headers_sent: false,
            finished: false,
            framing: None,
            encoder: ResponseEncoder::new(),
            buffer: BytesMut::new(),
            frames,
            write_state,
            high_water_mark,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    /// The reason phrase the status line carries.
    pub fn status_message(&self) -> &str {
        self.head.reason()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.head.headers().get(name)
    }

    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Returns true if the connection closes once this response is written.
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        ensure!(!self.headers_sent, ResponseError::HeadersSent);
        self.head.set_status(status);
        Ok(())
    }

    pub fn set_status_message<R: Into<Cow<'static, str>>>(&mut self, message: R) -> Result<(), ResponseError> {
        ensure!(!self.headers_sent, ResponseError::HeadersSent);
        self.head.set_reason(message)
    }

    /// Sets a header, replacing any value it had.
    pub fn set_header<N, V>(&mut self, name: N, value: V) -> Result<(), ResponseError>
    where
        N: TryInto<HeaderName>,
        N::Error: Display,
        V: TryInto<HeaderValue>,
        V::Error: Display,
    {
        ensure!(!self.headers_sent, ResponseError::HeadersSent);
        let (name, value) = header_pair(name, value)?;
        self.head.headers_mut().insert(name, value);
        Ok(())
    }

    /// Adds a header line, keeping the values it already had.
    pub fn append_header<N, V>(&mut self, name: N, value: V) -> Result<(), ResponseError>
    where
        N: TryInto<HeaderName>,
        N::Error: Display,
        V: TryInto<HeaderValue>,
        V::Error: Display,
    {
        ensure!(!self.headers_sent, ResponseError::HeadersSent);
        let (name, value) = header_pair(name, value)?;
        self.head.headers_mut().append(name, value);
        Ok(())
    }

    pub fn remove_header<K: AsHeaderName>(&mut self, name: K) -> Result<Option<HeaderValue>, ResponseError> {
        ensure!(!self.headers_sent, ResponseError::HeadersSent);
        Ok(self.head.headers_mut().remove(name))
    }

    /// Marks this response as the last one of the connection when `keep_alive`
    /// is false. A request that already forbids reuse cannot be turned back.
    pub fn set_keep_alive(&mut self, keep_alive: bool) -> Result<(), ResponseError> {
        ensure!(!self.headers_sent, ResponseError::HeadersSent);
        self.is_last = self.forced_last || !keep_alive;
        Ok(())
    }

    /// Sends the status line and header block now.
    ///
    /// `headers` are merged into the headers set so far, replacing values of
    /// the same name.
    pub fn write_head(&mut self, status: StatusCode, headers: HeaderMap) -> Result<(), ResponseError> {
        ensure!(!self.finished, ResponseError::Finished);
        ensure!(!self.headers_sent, ResponseError::HeadersSent);

        self.head.set_status(status);
        self.head.headers_mut().extend(headers);
        self.send_head(None)?;
        self.flush_frame()
    }

    /// Writes a body chunk, sending the head first if needed.
    ///
    /// Returns `true` while this response owns the transport and its unflushed
    /// bytes are under the high-water mark. `false` is a hint to slow down,
    /// the chunk is queued either way.
    pub fn write<B: Into<Bytes>>(&mut self, chunk: B) -> Result<bool, ResponseError> {
        ensure!(!self.finished, ResponseError::Finished);

        if !self.headers_sent {
            self.send_head(None)?;
        }
        self.encode_chunk(chunk.into())?;
        self.flush_frame()?;
        Ok(self.flow_hint())
    }

    /// Completes the response. Calling it again is a no-op.
    pub fn end(&mut self) -> Result<(), ResponseError> {
        if self.finished {
            return Ok(());
        }
        self.finish(None)
    }

    /// Writes a last chunk and completes the response.
    ///
    /// When nothing was written yet, the length of `data` is announced with
    /// `Content-Length`.
    pub fn end_with<B: Into<Bytes>>(&mut self, data: B) -> Result<(), ResponseError> {
        ensure!(!self.finished, ResponseError::Finished);
        self.finish(Some(data.into()))
    }

    /// Sends an `http::Response` as this response: its status and headers,
    /// then every data frame of its body. Trailers are dropped.
    pub async fn send_response<B>(&mut self, response: Response<B>) -> Result<(), ResponseError>
    where
        B: Body,
        B::Error: Display,
    {
        ensure!(!self.finished, ResponseError::Finished);
        ensure!(!self.headers_sent, ResponseError::HeadersSent);

        let (parts, body) = response.into_parts();
        self.head.set_status(parts.status);
        self.head.headers_mut().extend(parts.headers);

        let headers = self.head.headers();
        if let Some(length) = body.size_hint().exact()
            && !headers.contains_key(CONTENT_LENGTH)
            && !headers.contains_key(TRANSFER_ENCODING)
        {
            self.head.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(length));
        }

        let mut body = pin!(body);
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(ResponseError::body)?;
            if let Ok(mut data) = frame.into_data() {
                let bytes = data.copy_to_bytes(data.remaining());
                self.write(bytes)?;
            }
        }
        self.end()
    }

    fn finish(&mut self, data: Option<Bytes>) -> Result<(), ResponseError> {
        if !self.headers_sent {
            let known_length = data.as_ref().map_or(0, Bytes::len) as u64;
            self.send_head(Some(known_length))?;
        }
        if let Some(data) = data {
            self.encode_chunk(data)?;
        }

        if let Some(remaining) = self.encoder.remaining()
            && remaining > 0
        {
            warn!(id = self.id, remaining, "response ended short of its content-length, closing connection after it");
            self.is_last = true;
        }

        self.encoder
            .encode(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Eof), &mut self.buffer)
            .map_err(ResponseError::body)?;
        self.flush_frame()?;

        self.finished = true;
        trace!(id = self.id, last = self.is_last, "response finished");
        self.send_frame(FrameKind::End { last: self.is_last })
    }

    /// Closes the header latch: decides the framing and encodes the head.
    fn send_head(&mut self, known_length: Option<u64>) -> Result<(), ResponseError> {
        let framing = self.decide_framing(known_length)?;

        let headers = self.head.headers_mut();
        if self.is_last {
            if !has_token(headers, "close") {
                headers.insert(CONNECTION, HeaderValue::from_static("close"));
            }
        } else if self.request_version == Version::HTTP_10 && !headers.contains_key(CONNECTION) {
            headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        }

        self.encoder
            .encode(Message::<_, Bytes>::Header((&self.head, framing)), &mut self.buffer)
            .map_err(ResponseError::body)?;

        trace!(id = self.id, status = %self.head.status(), ?framing, "response head sent");
        self.framing = Some(framing);
        self.headers_sent = true;
        Ok(())
    }

    fn decide_framing(&mut self, known_length: Option<u64>) -> Result<Framing, ResponseError> {
        let headers = self.head.headers();
        if has_token(headers, "close") {
            self.is_last = true;
        }

        if self.suppress_body || self.head.forbids_body() {
            let announced = if self.head.forbids_body() { None } else { known_length };
            return Ok(Framing::NoBody { announced });
        }

        if let Some(value) = headers.get(CONTENT_LENGTH) {
            let length = value
                .to_str()
                .ok()
                .and_then(|value| value.trim().parse::<u64>().ok())
                .ok_or_else(|| ResponseError::invalid_header(format!("content-length {value:?} is not a number")))?;
            return Ok(Framing::Length(length));
        }

        if let Some(value) = headers.get(TRANSFER_ENCODING) {
            let chunked = value.as_bytes().rsplit(|b| *b == b',').next().is_some_and(|last| last.trim_ascii().eq_ignore_ascii_case(b"chunked"));
            if chunked {
                return Ok(Framing::Chunked);
            }
            self.is_last = true;
            return Ok(Framing::CloseDelimited);
        }

        if let Some(length) = known_length {
            return Ok(Framing::Length(length));
        }

        if self.request_version == Version::HTTP_11 {
            return Ok(Framing::Chunked);
        }

        self.is_last = true;
        Ok(Framing::CloseDelimited)
    }

    fn encode_chunk(&mut self, chunk: Bytes) -> Result<(), ResponseError> {
        if let (Some(Framing::Length(limit)), Some(remaining)) = (self.framing, self.encoder.remaining()) {
            ensure!(chunk.len() as u64 <= remaining, ResponseError::ContentLengthExceeded { limit });
        }

        self.encoder
            .encode(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Chunk(chunk)), &mut self.buffer)
            .map_err(ResponseError::body)
    }

    fn flush_frame(&mut self) -> Result<(), ResponseError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let bytes = self.buffer.split().freeze();
        self.write_state.queued.fetch_add(bytes.len(), Ordering::AcqRel);
        self.send_frame(FrameKind::Data(bytes))
    }

    fn send_frame(&self, kind: FrameKind) -> Result<(), ResponseError> {
        self.frames.unbounded_send(ResponseFrame { id: self.id, kind }).map_err(|_| ResponseError::ConnectionClosed)
    }

    fn flow_hint(&self) -> bool {
        self.write_state.owner.load(Ordering::Acquire) && self.write_state.queued.load(Ordering::Acquire) < self.high_water_mark
    }
}

impl Drop for OutgoingMessage {
    fn drop(&mut self) {
        if !self.finished {
            warn!(id = self.id, headers_sent = self.headers_sent, "response dropped before it was finished");
            let _ = self.send_frame(FrameKind::Abandoned);
        }
    }
}

fn header_pair<N, V>(name: N, value: V) -> Result<(HeaderName, HeaderValue), ResponseError>
where
    N: TryInto<HeaderName>,
    N::Error: Display,
    V: TryInto<HeaderValue>,
    V::Error: Display,
{
    let name = name.try_into().map_err(ResponseError::invalid_header)?;
    let value = value.try_into().map_err(ResponseError::invalid_header)?;
    Ok((name, value))
}

fn has_token(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|item| item.trim().eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use http_body_util::{Full, StreamBody};

    struct Harness {
        frames: mpsc::UnboundedReceiver<ResponseFrame>,
        write_state: triomphe::Arc<WriteState>,
    }

    impl Harness {
        fn wire(&mut self) -> (String, Option<bool>) {
            let mut wire = Vec::new();
            let mut end = None;
            while let Ok(frame) = self.frames.try_recv() {
                match frame.kind {
                    FrameKind::Data(bytes) => wire.extend_from_slice(&bytes),
                    FrameKind::End { last } => end = Some(last),
                    FrameKind::Abandoned => panic!("unexpected abandon"),
                }
            }
            (String::from_utf8(wire).unwrap(), end)
        }
    }

    fn response_to(method: Method, version: Version, connection: Option<&str>) -> (OutgoingMessage, Harness) {
        let mut builder = Request::builder().method(method).uri("/").version(version);
        if let Some(value) = connection {
            builder = builder.header(CONNECTION, value);
        }
        let head = RequestHead::from(builder.body(()).unwrap());
        let (tx, rx) = mpsc::unbounded();
        let write_state = triomphe::Arc::new(WriteState::default());
        let is_last = !head.keep_alive();
        let response = OutgoingMessage::new(1, &head, is_last, tx, write_state.clone(), 16);
        (response, Harness { frames: rx, write_state })
    }

    #[test]
    fn end_with_announces_length() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.end_with("hello").unwrap();

        let (wire, end) = harness.wire();
        assert_eq!(wire, "HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello");
        assert_eq!(end, Some(false));
        assert!(response.finished());
        response.end().unwrap();
        assert!(matches!(response.end_with("again"), Err(ResponseError::Finished)));
    }

    #[test]
    fn streaming_is_chunked_on_http11() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.set_header("content-type", "text/plain").unwrap();
        response.write("hel").unwrap();
        response.write("").unwrap();
        response.write(String::from("lo")).unwrap();
        response.end().unwrap();

        let (wire, end) = harness.wire();
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("content-type: text/plain\r\n"));
        assert!(wire.contains("transfer-encoding: chunked\r\n"));
        assert!(wire.ends_with("\r\n\r\n3\r\nhel\r\n2\r\nlo\r\n0\r\n\r\n"));
        assert_eq!(end, Some(false));
    }

    #[test]
    fn http10_streaming_closes() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_10, None);
        assert!(response.is_last());
        response.write("raw").unwrap();
        response.end().unwrap();

        let (wire, end) = harness.wire();
        assert_eq!(wire, "HTTP/1.1 200 OK\r\nconnection: close\r\n\r\nraw");
        assert_eq!(end, Some(true));
    }

    #[test]
    fn http10_keep_alive_is_echoed() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_10, Some("keep-alive"));
        response.end_with("ok").unwrap();

        let (wire, end) = harness.wire();
        assert!(wire.contains("connection: keep-alive\r\n"));
        assert!(wire.contains("content-length: 2\r\n"));
        assert_eq!(end, Some(false));
    }

    #[test]
    fn head_request_has_no_body() {
        let (mut response, mut harness) = response_to(Method::HEAD, Version::HTTP_11, None);
        response.end_with("hello").unwrap();

        let (wire, _) = harness.wire();
        assert_eq!(wire, "HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\n");
    }

    #[test]
    fn header_latch() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.set_status(StatusCode::CREATED).unwrap();
        response.set_status_message("Made It").unwrap();
        response.write("x").unwrap();

        assert!(response.headers_sent());
        assert!(matches!(response.set_header("x-late", "1"), Err(ResponseError::HeadersSent)));
        assert!(matches!(response.set_status(StatusCode::OK), Err(ResponseError::HeadersSent)));
        assert!(matches!(response.remove_header("x-late"), Err(ResponseError::HeadersSent)));
        assert!(matches!(response.write_head(StatusCode::OK, HeaderMap::new()), Err(ResponseError::HeadersSent)));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.status_message(), "Made It");

        response.end().unwrap();
        assert!(matches!(response.write("y"), Err(ResponseError::Finished)));
        assert!(matches!(response.write_head(StatusCode::OK, HeaderMap::new()), Err(ResponseError::Finished)));
        assert!(harness.wire().0.starts_with("HTTP/1.1 201 Made It\r\n"));
    }

    #[test]
    fn write_head_after_end_without_body() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.end().unwrap();
        assert!(matches!(response.write_head(StatusCode::NOT_FOUND, HeaderMap::new()), Err(ResponseError::Finished)));
        assert_eq!(harness.wire().0, "HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n");
    }

    #[test]
    fn status_message_rejects_line_breaks() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        assert!(matches!(response.set_status_message("OK\r\nx-injected: 1"), Err(ResponseError::InvalidHeader { .. })));
        assert!(matches!(response.set_status_message("split\n"), Err(ResponseError::InvalidHeader { .. })));
        assert_eq!(response.status_message(), "OK");

        response.set_status_message("Fine\tThanks").unwrap();
        response.end().unwrap();
        assert_eq!(harness.wire().0, "HTTP/1.1 200 Fine\tThanks\r\ncontent-length: 0\r\n\r\n");
    }

    #[test]
    fn content_length_overrun_and_underrun() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.set_header(CONTENT_LENGTH, 4u64).unwrap();
        response.write("abc").unwrap();
        assert!(matches!(response.write("de"), Err(ResponseError::ContentLengthExceeded { limit: 4 })));
        assert!(!response.is_last());
        response.end().unwrap();

        assert!(response.is_last());
        let (wire, end) = harness.wire();
        assert_eq!(wire, "HTTP/1.1 200 OK\r\ncontent-length: 4\r\n\r\nabc");
        assert_eq!(end, Some(true));
    }

    #[test]
    fn connection_close_header_marks_last() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.set_header(CONNECTION, "close").unwrap();
        response.end().unwrap();

        let (wire, end) = harness.wire();
        assert_eq!(wire, "HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-length: 0\r\n\r\n");
        assert_eq!(end, Some(true));
    }

    #[test]
    fn set_keep_alive_false() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.set_keep_alive(false).unwrap();
        response.end().unwrap();
        assert_eq!(harness.wire().1, Some(true));

        let (mut response, _harness) = response_to(Method::GET, Version::HTTP_11, Some("close"));
        response.set_keep_alive(true).unwrap();
        assert!(response.is_last());
    }

    #[test]
    fn no_content_status() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.write_head(StatusCode::NO_CONTENT, HeaderMap::new()).unwrap();
        response.write("ignored").unwrap();
        response.end().unwrap();
        assert_eq!(harness.wire().0, "HTTP/1.1 204 No Content\r\n\r\n");
    }

    #[test]
    fn invalid_header() {
        let (mut response, _harness) = response_to(Method::GET, Version::HTTP_11, None);
        assert!(matches!(response.set_header("bad header", "v"), Err(ResponseError::InvalidHeader { .. })));
        assert!(matches!(response.set_header("x-ok", "bad\nvalue"), Err(ResponseError::InvalidHeader { .. })));
        response.append_header("x-multi", "a").unwrap();
        response.append_header("x-multi", "b").unwrap();
        assert_eq!(response.headers().get_all("x-multi").iter().count(), 2);
        assert_eq!(response.remove_header("x-multi").unwrap(), Some(HeaderValue::from_static("a")));
        assert!(response.header("x-multi").is_none());
    }

    #[test]
    fn flow_hint_follows_ownership() {
        let (mut response, harness) = response_to(Method::GET, Version::HTTP_11, None);
        assert!(!response.write("waiting").unwrap());

        harness.write_state.owner.store(true, Ordering::Release);
        harness.write_state.queued.store(0, Ordering::Release);
        assert!(response.write("owner").unwrap());
        assert!(!response.write(vec![b'x'; 64]).unwrap());
    }

    #[test]
    fn drop_unfinished_abandons() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        response.write("partial").unwrap();
        drop(response);

        let kinds: Vec<FrameKind> = std::iter::from_fn(|| harness.frames.try_recv().ok()).map(|frame| frame.kind).collect();
        assert!(matches!(kinds.last(), Some(FrameKind::Abandoned)));
    }

    #[test]
    fn closed_connection() {
        let (mut response, harness) = response_to(Method::GET, Version::HTTP_11, None);
        drop(harness);
        assert!(matches!(response.write("x"), Err(ResponseError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn send_response_with_exact_body() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        let reply = Response::builder().status(StatusCode::ACCEPTED).header("x-kind", "full").body(Full::new(Bytes::from_static(b"done"))).unwrap();
        response.send_response(reply).await.unwrap();

        let (wire, end) = harness.wire();
        assert!(wire.starts_with("HTTP/1.1 202 Accepted\r\n"));
        assert!(wire.contains("x-kind: full\r\n"));
        assert!(wire.contains("content-length: 4\r\n"));
        assert!(wire.ends_with("\r\n\r\ndone"));
        assert_eq!(end, Some(false));
    }

    #[tokio::test]
    async fn send_response_streaming_body() {
        let (mut response, mut harness) = response_to(Method::GET, Version::HTTP_11, None);
        let chunks = futures::stream::iter(vec![
            Ok::<_, std::io::Error>(http_body::Frame::data(Bytes::from_static(b"ab"))),
            Ok(http_body::Frame::data(Bytes::from_static(b"cd"))),
        ]);
        response.send_response(Response::new(StreamBody::new(chunks))).await.unwrap();

        let (wire, _) = harness.wire();
        assert!(wire.contains("transfer-encoding: chunked\r\n"));
        assert!(wire.ends_with("2\r\nab\r\n2\r\ncd\r\n0\r\n\r\n"));
    }
}
