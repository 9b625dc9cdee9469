//! HTTP request decoder module
//!
//! Decodes a stream of pipelined requests, one head then its body, using a
//! [`HeaderDecoder`] for heads and a [`PayloadDecoder`] for bodies.

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP requests that handles both heads and payload
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: between messages, or parsing a head
/// - `Some(PayloadDecoder)`: parsing the body of the last head
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true while the body of a decoded head is still being read.
    pub fn in_body(&self) -> bool {
        self.payload_decoder.is_some()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder, payload_decoder: None }
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHead, PayloadSize)>;
    type Error = ParseError;

    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: a request head
    /// - `Ok(Some(Message::Payload(_)))`: a body chunk, or `Eof` once the body is complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: malformed input, the stream cannot be resynchronized
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        let message = match self.header_decoder.decode(src)? {
            Some((head, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((head, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }
}
