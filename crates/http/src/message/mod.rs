//! The two halves of an exchange as the application sees them.
//!
//! - [`IncomingMessage`]: a received request head with a streaming
//!   [`RequestBody`]
//! - [`OutgoingMessage`]: the paired response, written without ever touching
//!   the transport directly
//!
//! Both are created by the connection when a request head completes, and
//! handed together to [`Handler::call`](crate::handler::Handler::call).

mod incoming;
mod outgoing;

pub use incoming::BodySender;
pub use incoming::IncomingMessage;
pub use incoming::RequestBody;
pub use outgoing::OutgoingMessage;

pub(crate) use outgoing::{FrameKind, ResponseFrame, WriteState};
