//! Best-effort charset resolution for response bodies.
//!
//! Response errors keep the raw bytes they received. When a caller asks for the body
//! as text, the charset is taken from the `Content-Type` header:
//!
//! ```text
//! Content-Type: text/plain; charset=UTF-8
//!                           ^^^^^^^^^^^^^
//! ```
//!
//! Resolution never fails. A missing header, an empty value or an unknown charset
//! name all resolve to [`Charset::DEFAULT`] (ISO-8859-1), which maps every byte to
//! exactly one character and therefore never loses data.

use std::fmt;

use encoding_rs::Encoding;

use super::headers::HeaderMultiMap;

/// Text encoding used to decode response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// ISO-8859-1, one byte per character
    Latin1,
    /// Any encoding known to `encoding_rs`; malformed input decodes to U+FFFD
    Encoding(&'static Encoding),
}

/// Labels that mean true ISO-8859-1. `encoding_rs` maps them to windows-1252.
const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso88591",
    "iso_8859-1",
    "iso_8859_1",
    "iso_8859-1:1987",
    "iso-ir-100",
    "latin1",
    "latin-1",
    "l1",
    "cp819",
    "ibm819",
    "csisolatin1",
];

impl Charset {
    /// Charset used whenever nothing better is known
    pub const DEFAULT: Charset = Charset::Latin1;

    /// UTF-8
    pub fn utf8() -> Charset {
        Charset::Encoding(encoding_rs::UTF_8)
    }

    /// Look up a charset by its IANA name or a common alias, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use microservice_restclient::protocol::Charset;
    ///
    /// assert_eq!(Charset::for_name("utf-8"), Some(Charset::utf8()));
    /// assert_eq!(Charset::for_name("Latin1"), Some(Charset::Latin1));
    /// assert_eq!(Charset::for_name("Shift_JIS").unwrap().name(), "Shift_JIS");
    /// assert_eq!(Charset::for_name("xyz"), None);
    /// ```
    pub fn for_name(name: &str) -> Option<Charset> {
        let name = name.trim();
        if LATIN1_LABELS
            .iter()
            .any(|label| label.eq_ignore_ascii_case(name))
        {
            return Some(Charset::Latin1);
        }
        Encoding::for_label_no_replacement(name.as_bytes()).map(Charset::Encoding)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Latin1 => "ISO-8859-1",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }

    /// Decode `bytes` into text. Never fails.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Charset::Encoding(encoding) => encoding
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
        }
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::DEFAULT
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the charset declared by the `Content-Type` header.
///
/// Falls back to [`Charset::DEFAULT`] when the header is missing, empty, has no
/// `charset` parameter, or names a charset this crate does not know.
pub fn resolve_charset(headers: &HeaderMultiMap) -> Charset {
    resolve_charset_or(headers, Charset::DEFAULT)
}

/// Like [`resolve_charset`], with a caller-chosen fallback.
pub fn resolve_charset_or(headers: &HeaderMultiMap, fallback: Charset) -> Charset {
    let Some(media_type) = headers.content_type().filter(|value| !value.is_empty()) else {
        return fallback;
    };

    let mut resolved = fallback;
    for parameter in media_type.split(';').filter(|p| !p.is_empty()) {
        let Some((key, value)) = parameter.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("charset") {
            continue;
        }
        let name = value.trim().trim_matches('"');
        match Charset::for_name(name) {
            Some(charset) => resolved = charset,
            None => {
                tracing::debug!(charset = name, "Could not get charset from response, using {}", fallback);
                return fallback;
            }
        }
    }
    resolved
}
