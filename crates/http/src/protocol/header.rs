//! Header folding rules for received requests.
//!
//! A request may repeat a header line. The folded [`HeaderMap`] keeps one value
//! per name: the last one wins, except for the list-valued headers below whose
//! values are joined in arrival order. A repeated `Content-Length` must repeat
//! the same value, differing lengths make the request unframeable.

use bytes::{BufMut, Bytes, BytesMut};
use http::header::{self, HeaderName, HeaderValue};
use http::HeaderMap;

use crate::protocol::ParseError;

/// Headers whose repeated lines are combined into one value.
const COMBINABLE: &[&str] = &[
    "accept",
    "accept-charset",
    "accept-encoding",
    "accept-language",
    "cache-control",
    "connection",
    "cookie",
    "expect",
    "if-match",
    "if-none-match",
    "pragma",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "via",
    "warning",
    "x-forwarded-for",
];

/// A header line exactly as it was received, name case preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    pub name: Bytes,
    pub value: HeaderValue,
}

/// Returns true if repeated lines of this header are joined instead of replaced.
pub fn is_combinable(name: &HeaderName) -> bool {
    COMBINABLE.contains(&name.as_str())
}

fn separator(name: &HeaderName) -> &'static [u8] {
    if *name == header::COOKIE { b"; " } else { b", " }
}

/// Inserts one received header line into the folded map.
pub(crate) fn fold_header(map: &mut HeaderMap, name: HeaderName, value: HeaderValue) -> Result<(), ParseError> {
    if name == header::CONTENT_LENGTH
        && let Some(existing) = map.get(&name)
        && *existing != value
    {
        return Err(ParseError::invalid_content_length(format!("conflicting values {existing:?} and {value:?}")));
    }

    if !is_combinable(&name) {
        map.insert(name, value);
        return Ok(());
    }

    let joined = match map.get(&name) {
        Some(existing) => {
            let sep = separator(&name);
            let mut buf = BytesMut::with_capacity(existing.len() + sep.len() + value.len());
            buf.put_slice(existing.as_bytes());
            buf.put_slice(sep);
            buf.put_slice(value.as_bytes());
            HeaderValue::from_maybe_shared(buf.freeze()).map_err(ParseError::invalid_header)?
        }
        None => value,
    };

    map.insert(name, joined);
    Ok(())
}
