use bytes::{Bytes, BytesMut};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use h1_pipeline::codec::ResponseEncoder;
use h1_pipeline::connection::HttpConnection;
use h1_pipeline::handler::make_handler;
use h1_pipeline::message::{IncomingMessage, OutgoingMessage};
use h1_pipeline::parser::ParserAdapter;
use h1_pipeline::protocol::{Framing, Message, PayloadItem, ResponseHead};
use http::StatusCode;
use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::Encoder;

const PIPELINED: &[u8] = b"GET /a HTTP/1.1\r\nHost: localhost\r\n\r\n\
    POST /b HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello\
    GET /c HTTP/1.1\r\nHost: localhost\r\nAccept: */*\r\n\r\n";

// reads the request bytes once, then eof; writes go nowhere
struct MockIO {
    read_data: &'static [u8],
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: &'static [u8]) -> Self {
        Self { read_data, read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

fn bench_parser(c: &mut Criterion) {
    c.bench_function("parse_pipelined_requests", |b| {
        b.iter(|| {
            let mut parser = ParserAdapter::new();
            parser.feed(black_box(PIPELINED)).unwrap();
            let mut events = 0;
            while let Some(event) = parser.next_event() {
                black_box(event);
                events += 1;
            }
            events
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let head = ResponseHead::new(StatusCode::OK);
    let body = Bytes::from_static(b"Hello World!");

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode(Message::<_, Bytes>::Header((&head, Framing::Length(body.len() as u64))), &mut bytes).unwrap();
            encoder.encode(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Chunk(body.clone())), &mut bytes).unwrap();
            black_box(bytes)
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let handler = Arc::new(make_handler(|_request: IncomingMessage, mut response: OutgoingMessage| async move {
        response.end_with("Hello World!").unwrap();
    }));

    c.bench_function("process_pipelined_requests", |b| {
        b.to_async(&runtime).iter(|| {
            let handler = Arc::clone(&handler);
            async move {
                let connection = HttpConnection::new(MockIO::new(PIPELINED), MockIO::new(b""));
                black_box(connection.process(handler).await.unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_parser, bench_response_encoder, bench_http_connection);
criterion_main!(benches);
