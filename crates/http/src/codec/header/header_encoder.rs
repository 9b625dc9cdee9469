//! HTTP header encoder implementation for serializing HTTP response heads
//!
//! This module encodes the status line and header block of a response into raw
//! bytes. The framing decided for the response body is reflected in the header
//! block: `Content-Length` for fixed length bodies, `Transfer-Encoding: chunked`
//! for chunked bodies, and nothing for bodies delimited by connection close.

use crate::protocol::{Framing, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::header;
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
///
/// The status line is always written as `HTTP/1.1`, whatever the request version.
#[derive(Debug, Default)]
pub struct HeaderEncoder;

impl Encoder<(&ResponseHead, Framing)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the response head into the provided bytes buffer.
    ///
    /// Framing headers set by the application are replaced by the ones the
    /// framing implies, with two exceptions: an application supplied
    /// `Transfer-Encoding` is kept as is for chunked bodies, and bodyless
    /// responses keep whatever the application set.
    fn encode(&mut self, item: (&ResponseHead, Framing), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, framing) = item;

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", head.status().as_str(), head.reason())?;

        let headers = head.headers();
        let skip = |name: &header::HeaderName| match framing {
            Framing::Length(_) => *name == header::CONTENT_LENGTH || *name == header::TRANSFER_ENCODING,
            Framing::Chunked => *name == header::CONTENT_LENGTH,
            Framing::CloseDelimited | Framing::NoBody { .. } => false,
        };

        for (name, value) in headers.iter().filter(|(name, _)| !skip(*name)) {
            put_header(dst, name.as_ref(), value.as_bytes());
        }

        match framing {
            Framing::Length(n) => {
                write!(FastWrite(dst), "content-length: {n}\r\n")?;
            }
            Framing::Chunked if !headers.contains_key(header::TRANSFER_ENCODING) => {
                put_header(dst, b"transfer-encoding", b"chunked");
            }
            Framing::NoBody { announced: Some(n) } if !headers.contains_key(header::CONTENT_LENGTH) => {
                write!(FastWrite(dst), "content-length: {n}\r\n")?;
            }
            _ => {}
        }

        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[inline]
fn put_header(dst: &mut BytesMut, name: &[u8], value: &[u8]) {
    dst.put_slice(name);
    dst.put_slice(b": ");
    dst.put_slice(value);
    dst.put_slice(b"\r\n");
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, StatusCode};

    fn encode(head: &ResponseHead, framing: Framing) -> String {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, framing), &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn fixed_length() {
        let mut head = ResponseHead::new(StatusCode::OK);
        head.headers_mut().insert(header::CONTENT_LENGTH, HeaderValue::from_static("99"));
        assert_eq!(encode(&head, Framing::Length(5)), "HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\n");
    }

    #[test]
    fn chunked() {
        let head = ResponseHead::new(StatusCode::OK);
        assert_eq!(encode(&head, Framing::Chunked), "HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n");

        let mut head = ResponseHead::new(StatusCode::OK);
        head.headers_mut().insert(header::TRANSFER_ENCODING, HeaderValue::from_static("gzip, chunked"));
        assert_eq!(encode(&head, Framing::Chunked), "HTTP/1.1 200 OK\r\ntransfer-encoding: gzip, chunked\r\n\r\n");
    }

    #[test]
    fn custom_reason_and_close_delimited() {
        let mut head = ResponseHead::new(StatusCode::IM_A_TEAPOT);
        head.set_reason("Short And Stout").unwrap();
        head.headers_mut().insert(header::CONNECTION, HeaderValue::from_static("close"));
        assert_eq!(encode(&head, Framing::CloseDelimited), "HTTP/1.1 418 Short And Stout\r\nconnection: close\r\n\r\n");
    }

    #[test]
    fn bodyless() {
        let head = ResponseHead::new(StatusCode::OK);
        assert_eq!(encode(&head, Framing::NoBody { announced: Some(11) }), "HTTP/1.1 200 OK\r\ncontent-length: 11\r\n\r\n");

        let head = ResponseHead::new(StatusCode::NO_CONTENT);
        assert_eq!(encode(&head, Framing::NoBody { announced: None }), "HTTP/1.1 204 No Content\r\n\r\n");
    }
}
