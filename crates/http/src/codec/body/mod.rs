//! Body framing for request and response payloads
//!
//! ## Decoders
//! - [`PayloadDecoder`]: request bodies, by Content-Length or chunked
//!
//! ## Encoders
//! - [`PayloadEncoder`]: response bodies, by Content-Length, chunked,
//!   connection close or no body at all

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
