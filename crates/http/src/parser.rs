//! Push-style request parser.
//!
//! [`ParserAdapter`] wraps a pull-style [`Decoder`] (by default the crate's
//! [`RequestDecoder`]): the connection pushes every chunk it reads with
//! [`feed`](ParserAdapter::feed) and then drains the resulting
//! [`ParseEvent`]s with [`next_event`](ParserAdapter::next_event). Events come
//! out in byte order, per message:
//!
//! 1. zero or more [`ParseEvent::HeaderFragment`]
//! 2. exactly one [`ParseEvent::HeadersComplete`]
//! 3. zero or more [`ParseEvent::BodyChunk`]
//! 4. exactly one [`ParseEvent::MessageComplete`]
//!
//! A tokenizer error is fatal: once one is returned, every later call fails
//! with [`ParseError::Failed`].

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::RequestDecoder;
use crate::ensure;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RawHeader, RequestHead};

/// Header lines are surfaced in groups of at most this many.
pub const HEADER_FRAGMENT_SIZE: usize = 10;

/// A parse event, see the [module docs](self) for their order.
#[derive(Debug)]
pub enum ParseEvent {
    /// Raw header lines of the message being parsed.
    HeaderFragment(Vec<RawHeader>),
    /// The complete head, with how its body is delimited.
    HeadersComplete(RequestHead, PayloadSize),
    /// A piece of the body, in arrival order.
    BodyChunk(Bytes),
    /// The body is complete. The next event belongs to the next message.
    MessageComplete,
}

#[derive(Debug)]
pub struct ParserAdapter<D = RequestDecoder> {
    decoder: D,
    buffer: BytesMut,
    events: VecDeque<ParseEvent>,
    mid_message: bool,
    failed: bool,
}

impl ParserAdapter {
    pub fn new() -> Self {
        Self::with_decoder(RequestDecoder::new())
    }
}

impl Default for ParserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> ParserAdapter<D>
where
    D: Decoder<Item = Message<(RequestHead, PayloadSize)>, Error = ParseError>,
{
    pub fn with_decoder(decoder: D) -> Self {
        Self { decoder, buffer: BytesMut::new(), events: VecDeque::new(), mid_message: false, failed: false }
    }

    /// Appends `bytes` and tokenizes as far as they go.
    ///
    /// Bytes that do not complete a token stay buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        ensure!(!self.failed, ParseError::Failed);

        self.buffer.extend_from_slice(bytes);
        self.drain().inspect_err(|_| self.failed = true)
    }

    /// Signals the end of the byte stream.
    ///
    /// Succeeds only when the stream stopped between two messages.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        ensure!(!self.failed, ParseError::Failed);

        if self.mid_message || !self.buffer.is_empty() {
            self.failed = true;
            return Err(ParseError::Incomplete { buffered: self.buffer.len() });
        }
        Ok(())
    }

    pub fn next_event(&mut self) -> Option<ParseEvent> {
        self.events.pop_front()
    }

    /// Returns true between a message's first head byte and its `MessageComplete`.
    pub fn is_mid_message(&self) -> bool {
        self.mid_message || !self.buffer.is_empty()
    }

    fn drain(&mut self) -> Result<(), ParseError> {
        while let Some(message) = self.decoder.decode(&mut self.buffer)? {
            match message {
                Message::Header((head, payload_size)) => {
                    trace!(method = %head.method(), uri = %head.uri(), ?payload_size, "parsed request head");
                    self.mid_message = true;
                    for fragment in head.raw_headers().chunks(HEADER_FRAGMENT_SIZE) {
                        self.events.push_back(ParseEvent::HeaderFragment(fragment.to_vec()));
                    }
                    self.events.push_back(ParseEvent::HeadersComplete(head, payload_size));
                }
                Message::Payload(PayloadItem::Chunk(bytes)) => {
                    self.events.push_back(ParseEvent::BodyChunk(bytes));
                }
                Message::Payload(PayloadItem::Eof) => {
                    self.mid_message = false;
                    self.events.push_back(ParseEvent::MessageComplete);
                }
            }
        }
        Ok(())
    }
}
