//! Status code classification.
//!
//! The dispatcher treats a response as successful only when its status falls in the
//! 2xx class. Everything else, including informational and redirection codes and
//! codes that belong to no class at all, takes the error path.
//!
//! | Status | Class | Error? |
//! |--------|-------|--------|
//! | 100-199 | [`StatusClass::Informational`] | yes |
//! | 200-299 | [`StatusClass::Successful`] | no |
//! | 300-399 | [`StatusClass::Redirection`] | yes |
//! | 400-499 | [`StatusClass::ClientError`] | yes |
//! | 500-599 | [`StatusClass::ServerError`] | yes |
//! | anything else | none | yes |

/// The class of an HTTP status code, taken from its first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 1xx
    Informational,
    /// 2xx
    Successful,
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
}

impl StatusClass {
    /// Classify `status`, or `None` for codes outside 100-599.
    ///
    /// # Examples
    ///
    /// ```
    /// use microservice_restclient::protocol::StatusClass;
    ///
    /// assert_eq!(StatusClass::resolve(204), Some(StatusClass::Successful));
    /// assert_eq!(StatusClass::resolve(999), None);
    /// ```
    pub fn resolve(status: u16) -> Option<StatusClass> {
        match status / 100 {
            1 => Some(StatusClass::Informational),
            2 => Some(StatusClass::Successful),
            3 => Some(StatusClass::Redirection),
            4 => Some(StatusClass::ClientError),
            5 => Some(StatusClass::ServerError),
            _ => None,
        }
    }
}

/// Whether a response with `status` must be reported as an error.
pub fn is_error_status(status: u16) -> bool {
    StatusClass::resolve(status) != Some(StatusClass::Successful)
}

/// Reason phrase for `status`, if it is a registered code.
pub fn reason_phrase(status: u16) -> Option<&'static str> {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
}
