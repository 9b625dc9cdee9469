//! HTTP header decoder implementation for parsing HTTP request heads
//!
//! This module decodes a request head from raw bytes into a [`RequestHead`]:
//! method, URI, version, the folded header map and the raw header lines. It
//! also decides how the request body, if any, is delimited.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only supports HTTP/1.0 and HTTP/1.1

use std::mem::MaybeUninit;

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, Request};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, RawHeader, RequestHead, fold_header};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
///
/// This decoder parses raw bytes into a structured [`RequestHead`] and determines the
/// [`PayloadSize`] of the body from the Content-Length and Transfer-Encoding headers.
#[derive(Debug, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, payload_size)))` if a complete head was successfully parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut req = httparse::Request::new(&mut []);
        let mut headers = [const { MaybeUninit::<httparse::Header<'_>>::uninit() }; MAX_HEADER_NUM];

        let parsed_result = req.parse_with_uninit_headers(src, &mut headers).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(head_size = body_offset, "parsed request head");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let version = match req.version {
                    Some(0) => http::Version::HTTP_10,
                    Some(1) => http::Version::HTTP_11,
                    _ => return Err(ParseError::InvalidVersion(req.version)),
                };

                let mut folded = HeaderMap::with_capacity(req.headers.len());
                let mut raw_headers = Vec::with_capacity(req.headers.len());
                for header in req.headers.iter() {
                    let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
                    let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
                    raw_headers.push(RawHeader { name: bytes::Bytes::copy_from_slice(header.name.as_bytes()), value: value.clone() });
                    fold_header(&mut folded, name, value)?;
                }

                let mut request = Request::builder()
                    .method(req.method.ok_or(ParseError::InvalidMethod)?)
                    .uri(req.path.ok_or(ParseError::InvalidUri)?)
                    .version(version)
                    .body(())
                    .map_err(|_e| ParseError::InvalidUri)?;
                *request.headers_mut() = folded;

                let _ = src.split_to(body_offset);

                let head = RequestHead::new(request, raw_headers);
                let payload_size = parse_payload(&head)?;

                Ok(Some((head, payload_size)))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Determines how the request body is delimited.
///
/// A request carries a body only when it announces one through
/// Transfer-Encoding or Content-Length, whatever its method (RFC 9112 section 6.3).
///
/// # Errors
///
/// Returns `ParseError` if:
/// - Both Content-Length and Transfer-Encoding headers are present
/// - Content-Length value is invalid
/// - Transfer-Encoding is present but chunked is not the final encoding
fn parse_payload(head: &RequestHead) -> Result<PayloadSize, ParseError> {
    // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding
    let te_header = head.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = head.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::Empty),

        (te_value @ Some(_), None) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::Chunked)
            } else {
                Err(ParseError::invalid_body("transfer-encoding without final chunked coding"))
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_e| ParseError::invalid_content_length("value can't to_str"))?;

            let length =
                cl_str.trim().parse::<u64>().map_err(|_e| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            Ok(PayloadSize::Length(length))
        }

        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")),
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value
        && let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next()
    {
        return bytes.trim_ascii().eq_ignore_ascii_case(CHUNKED);
    }
    false
}
