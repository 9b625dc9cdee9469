//! Core HTTP protocol abstractions.
//!
//! This module provides the building blocks shared by the codec, the parser
//! adapter and the connection pipeline.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): Core message types and payload processing
//!   - [`Message`]: Represents either a head or a payload item
//!   - [`PayloadItem`]: Individual payload chunks and EOF
//!   - [`PayloadSize`]: How a request body is delimited
//!   - [`Framing`]: How a response body is delimited
//!
//! - **Request Processing** ([`request`], [`header`]): Request head handling
//!   - [`RequestHead`]: Folded headers, raw header lines, keep-alive and upgrade flags
//!   - [`is_combinable`]: Which repeated headers are joined instead of replaced
//!
//! - **Response Processing** ([`response`]): Status line and header block
//!   - [`ResponseHead`]
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Fatal per-connection error
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors
//!   - [`ResponseError`]: Misuse of an outgoing message
//!   - [`BodyError`]: Request body aborted

mod message;
pub use message::Framing;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod header;
pub(crate) use header::fold_header;
pub use header::RawHeader;
pub use header::is_combinable;

mod request;
pub use request::RequestHead;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::BodyError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::ResponseError;
pub use error::SendError;
