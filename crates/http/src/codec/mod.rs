//! HTTP codec module for encoding and decoding HTTP/1.1 messages
//!
//! Both sides are `tokio_util` codecs:
//!
//! - [`RequestDecoder`]: a [`Decoder`](tokio_util::codec::Decoder) turning
//!   received bytes into request heads and body chunks
//! - [`ResponseEncoder`]: an [`Encoder`](tokio_util::codec::Encoder) turning a
//!   response head and its body chunks into bytes, under a
//!   [`Framing`](crate::protocol::Framing) chosen when the head is written
//!
//! # Example
//!
//! ```
//! use h1_pipeline::codec::RequestDecoder;
//! use h1_pipeline::protocol::Message;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//! let message = decoder.decode(&mut buffer).unwrap();
//! assert!(matches!(message, Some(Message::Header(_))));
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
