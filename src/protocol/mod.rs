//! Protocol-level building blocks shared by requests, responses and errors.
//!
//! # Module Structure
//!
//! - **headers** - [`HeaderMultiMap`], the case-insensitive multi-valued header map
//! - **charset** - [`Charset`] and `Content-Type` based charset resolution
//! - **status** - [`StatusClass`] and the error classification policy
//! - **constants** - well-known header names and media types

mod charset;
mod headers;
mod status;

pub use charset::{resolve_charset, resolve_charset_or, Charset};
pub use headers::{HeaderConversionError, HeaderMultiMap};
pub use status::{is_error_status, reason_phrase, StatusClass};

/// Well-known names used by the client.
pub mod constants {
    /// Header names
    pub mod headers {
        /// `Content-Type`
        pub const CONTENT_TYPE: &str = "Content-Type";
    }

    /// Media types
    pub mod media_types {
        /// `application/json`, the default request content type
        pub const APPLICATION_JSON: &str = "application/json";
    }
}
