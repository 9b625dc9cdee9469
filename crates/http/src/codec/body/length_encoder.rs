use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

/// Writes a body whose size was announced with `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    remaining: u64,
    eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length, eof: false }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let len = bytes.remaining() as u64;
                if len > self.remaining {
                    return Err(SendError::invalid_body(format!("{len} bytes exceed the {} bytes left", self.remaining)));
                }
                self.remaining -= len;
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let n = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(n);
                }
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                Ok(())
            }
        }
    }
}
