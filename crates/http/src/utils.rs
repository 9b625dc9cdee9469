//! Crate internal helpers.

/// Returns `Err($error)` unless `$predicate` holds.
///
/// ```ignore
/// ensure!(!self.headers_sent, ResponseError::HeadersSent);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
