//! HTTP response head handling implementation.
//!
//! A response head is what a response carries before its first body byte:
//! status code, an optional custom reason phrase and the header block.

use std::borrow::Cow;

use http::response::Parts;
use http::{HeaderMap, StatusCode};

use crate::ensure;
use crate::protocol::ResponseError;

/// The status line and header block of a response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    status: StatusCode,
    reason: Option<Cow<'static, str>>,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self { status, reason: None, headers: HeaderMap::new() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Overrides the canonical reason phrase of the status line.
    ///
    /// A reason holding control characters (CR and LF included) is rejected,
    /// it would end the status line early.
    pub fn set_reason<R: Into<Cow<'static, str>>>(&mut self, reason: R) -> Result<(), ResponseError> {
        let reason = reason.into();
        ensure!(
            reason.bytes().all(is_reason_byte),
            ResponseError::invalid_header(format!("reason phrase {reason:?} contains control characters"))
        );
        self.reason = Some(reason);
        Ok(())
    }

    /// Reason phrase written in the status line: the custom one, else the
    /// canonical one, else `Unknown`.
    pub fn reason(&self) -> &str {
        match &self.reason {
            Some(reason) => reason.as_ref(),
            None => self.status.canonical_reason().unwrap_or("Unknown"),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns true if a response with this status never carries a body.
    pub fn forbids_body(&self) -> bool {
        self.status.is_informational() || self.status == StatusCode::NO_CONTENT || self.status == StatusCode::NOT_MODIFIED
    }
}

// reason-phrase = 1*( HTAB / SP / VCHAR / obs-text )
fn is_reason_byte(b: u8) -> bool {
    b == b'\t' || b == b' ' || (0x21..=0x7e).contains(&b) || b >= 0x80
}

impl From<Parts> for ResponseHead {
    fn from(parts: Parts) -> Self {
        Self { status: parts.status, reason: None, headers: parts.headers }
    }
}
