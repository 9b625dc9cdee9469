use crate::codec::header::FastWrite;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use std::io::Write;

use tokio_util::codec::Encoder;

/// Writes `Transfer-Encoding: chunked` framing around each payload chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            // a zero sized chunk would terminate the body
            PayloadItem::Chunk(bytes) if !bytes.has_remaining() => Ok(()),
            PayloadItem::Chunk(mut bytes) => {
                write!(FastWrite(dst), "{:X}\r\n", bytes.remaining())?;
                dst.reserve(bytes.remaining() + 2);
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}
