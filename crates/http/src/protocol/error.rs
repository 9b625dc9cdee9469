use std::io;
use thiserror::Error;

/// Fatal, per-connection error returned by
/// [`HttpConnection::process`](crate::connection::HttpConnection::process).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

impl HttpError {
    /// Returns true if the error came from malformed request bytes rather
    /// than from the transport.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, HttpError::RequestError { source } if !matches!(source, ParseError::Io { .. }))
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http uri")]
    InvalidUri,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("stream ended in the middle of a message, {buffered} bytes left unparsed")]
    Incomplete { buffered: usize },

    #[error("parser already failed")]
    Failed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Misuse of an [`OutgoingMessage`](crate::message::OutgoingMessage).
///
/// These are returned to the caller and leave every other response on the
/// connection untouched.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("headers already sent")]
    HeadersSent,

    #[error("response already finished")]
    Finished,

    #[error("body exceeds the announced content-length {limit}")]
    ContentLengthExceeded { limit: u64 },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("response body error: {reason}")]
    Body { reason: String },
}

impl ResponseError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn body<S: ToString>(str: S) -> Self {
        Self::Body { reason: str.to_string() }
    }
}

/// Error observed by a request body consumer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// The connection went away before the body was complete.
    #[error("request body aborted before completion")]
    Aborted,
}
