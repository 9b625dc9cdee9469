//! Serializes one response: its head, then its body under the head's framing.

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Framing, Message, ResponseHead, SendError};
use bytes::{Buf, BytesMut};
use std::io;
use std::io::ErrorKind;
use tokio_util::codec::Encoder;
use tracing::error;

#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Bytes still owed to a fixed length body.
    pub fn remaining(&self) -> Option<u64> {
        self.payload_encoder.as_ref().and_then(PayloadEncoder::remaining)
    }
}

impl<'a, D: Buf> Encoder<Message<(&'a ResponseHead, Framing), D>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(&'a ResponseHead, Framing), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, framing)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive response head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.payload_encoder = Some(framing.into());
                self.header_encoder.encode((head, framing), dst)
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect response head but receive payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                let result = payload_encoder.encode(payload_item, dst);

                if payload_encoder.is_finish() {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use bytes::Bytes;
    use http::StatusCode;

    #[test]
    fn head_then_body() {
        let head = ResponseHead::new(StatusCode::OK);
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Message::<_, Bytes>::Header((&head, Framing::Length(2))), &mut dst).unwrap();
        assert_eq!(encoder.remaining(), Some(2));
        encoder.encode(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Chunk(Bytes::from_static(b"ok"))), &mut dst).unwrap();
        encoder.encode(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
        assert_eq!(encoder.remaining(), None);
    }

    #[test]
    fn out_of_order_items() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        assert!(encoder.encode(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Eof), &mut dst).is_err());

        let head = ResponseHead::new(StatusCode::OK);
        encoder.encode(Message::<_, Bytes>::Header((&head, Framing::Chunked)), &mut dst).unwrap();
        assert!(encoder.encode(Message::<_, Bytes>::Header((&head, Framing::Chunked)), &mut dst).is_err());
    }
}
