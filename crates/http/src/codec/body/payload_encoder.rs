use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{Framing, PayloadItem, SendError};
use bytes::{Buf, BytesMut};

use tokio_util::codec::Encoder;

/// encode payload for response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// bytes written as they are, the connection close ends the body
    Identity { eof: bool },

    /// no body bytes are written at all
    NoBody { eof: bool },
}

impl PayloadEncoder {
    /// create an empty `PayloadEncoder`
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody { eof: false } }
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    /// create a fixed length `PayloadEncoder`
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthEncoder::new(size)) }
    }

    /// create a `PayloadEncoder` for a body delimited by connection close
    pub fn identity() -> Self {
        Self { kind: Kind::Identity { eof: false } }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody { .. })
    }

    /// Bytes still owed to a fixed length body, `None` for other framings.
    pub fn remaining(&self) -> Option<u64> {
        match &self.kind {
            Kind::Length(encoder) => Some(encoder.remaining()),
            _ => None,
        }
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Length(encoder) => encoder.is_finish(),
            Kind::Chunked(encoder) => encoder.is_finish(),
            Kind::Identity { eof } | Kind::NoBody { eof } => *eof,
        }
    }
}

impl From<Framing> for PayloadEncoder {
    fn from(framing: Framing) -> Self {
        match framing {
            Framing::Length(size) => PayloadEncoder::fix_length(size),
            Framing::Chunked => PayloadEncoder::chunked(),
            Framing::CloseDelimited => PayloadEncoder::identity(),
            Framing::NoBody { .. } => PayloadEncoder::empty(),
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::Identity { eof } => {
                match item {
                    PayloadItem::Chunk(mut bytes) if !*eof => {
                        while bytes.has_remaining() {
                            let chunk = bytes.chunk();
                            let n = chunk.len();
                            dst.extend_from_slice(chunk);
                            bytes.advance(n);
                        }
                    }
                    PayloadItem::Chunk(_) => {}
                    PayloadItem::Eof => *eof = true,
                }
                Ok(())
            }
            Kind::NoBody { eof } => {
                if item.is_eof() {
                    *eof = true;
                }
                Ok(())
            }
        }
    }
}
