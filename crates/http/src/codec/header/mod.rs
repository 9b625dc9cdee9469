//! HTTP header processing module for encoding and decoding heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes a request head from raw bytes
//!   - Folds repeated header lines and keeps the raw lines
//!   - Enforces header count and size limits
//!   - Decides how the request body is delimited
//!
//! - [`HeaderEncoder`]: Encodes a response head to bytes
//!   - Writes the status line with the custom or canonical reason phrase
//!   - Writes the framing headers implied by the response [`Framing`](crate::protocol::Framing)

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
pub(crate) use header_encoder::FastWrite;
