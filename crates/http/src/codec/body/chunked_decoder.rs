//! Decoder for request bodies sent with `Transfer-Encoding: chunked`,
//! see [RFC 9112 section 7.1](https://www.rfc-editor.org/rfc/rfc9112.html#name-chunked-transfer-coding).
//!
//! Chunk extensions and trailer fields are read and dropped.

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: Size, remaining_size: 0 }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// hex digits of the chunk size
    Size,
    /// whitespace after the size
    SizeLws,
    /// chunk extension, ignored
    Extension,
    SizeLf,
    Body,
    BodyCr,
    BodyLf,
    /// a trailer field line, ignored
    Trailer,
    TrailerLf,
    EndCr,
    EndLf,
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            if self.state == Body {
                if src.is_empty() {
                    return Ok(None);
                }
                let read_size = self.remaining_size.min(src.len() as u64) as usize;
                self.remaining_size -= read_size as u64;
                if self.remaining_size == 0 {
                    self.state = BodyCr;
                }
                let bytes = src.split_to(read_size).freeze();
                trace!(len = bytes.len(), "read chunked bytes");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let byte = src.get_u8();
            self.state = self.state.step(byte, &mut self.remaining_size)?;
        }
    }
}

impl ChunkedState {
    /// Advances over one byte of framing, everything but chunk data.
    fn step(self, byte: u8, size: &mut u64) -> Result<ChunkedState, ParseError> {
        let next = match (self, byte) {
            (Size, b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F') => {
                let digit = (byte as char).to_digit(16).map(u64::from).unwrap_or_default();
                *size = size
                    .checked_mul(16)
                    .and_then(|size| size.checked_add(digit))
                    .ok_or_else(|| ParseError::invalid_body("chunk size overflow"))?;
                Size
            }
            (Size | SizeLws, b'\t' | b' ') => SizeLws,
            (Size | SizeLws, b';') => Extension,
            (Size | SizeLws | Extension, b'\r') => SizeLf,
            (Size, _) => return Err(ParseError::invalid_body("invalid chunk size")),
            (SizeLws, _) => return Err(ParseError::invalid_body("invalid chunk size linear white space")),
            // a bare LF inside an extension is rejected rather than taken as a line end
            (Extension, b'\n') => return Err(ParseError::invalid_body("chunk extension contains newline")),
            (Extension, _) => Extension,
            (SizeLf, b'\n') if *size == 0 => EndCr,
            (SizeLf, b'\n') => Body,
            (SizeLf, _) => return Err(ParseError::invalid_body("invalid chunk size LF")),
            (BodyCr, b'\r') => BodyLf,
            (BodyCr, _) => return Err(ParseError::invalid_body("invalid chunk body CR")),
            (BodyLf, b'\n') => Size,
            (BodyLf, _) => return Err(ParseError::invalid_body("invalid chunk body LF")),
            (Trailer, b'\r') => TrailerLf,
            (Trailer, _) => Trailer,
            (TrailerLf, b'\n') => EndCr,
            (TrailerLf, _) => return Err(ParseError::invalid_body("invalid trailer end LF")),
            (EndCr, b'\r') => EndLf,
            (EndCr, _) => Trailer,
            (EndLf, b'\n') => End,
            (EndLf, _) => return Err(ParseError::invalid_body("invalid chunk end LF")),
            (Body | End, _) => self,
        };
        Ok(next)
    }
}
