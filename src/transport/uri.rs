//! URI template expansion.
//!
//! Templates use `{name}` placeholders. Values are percent-encoded before they are
//! substituted, so they can never change the structure of the URL:
//!
//! ```
//! use microservice_restclient::transport::{expand_template, UriParams};
//!
//! let mut params = UriParams::new();
//! params.insert("param1".to_string(), "val 1/2".to_string());
//!
//! let url = expand_template("http://localhost/test-path?param1={param1}", &params).unwrap();
//! assert_eq!(url.as_str(), "http://localhost/test-path?param1=val%201%2F2");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

use super::TransportError;

/// Values for URI template placeholders, keyed by placeholder name.
pub type UriParams = HashMap<String, String>;

/// `{name}` or `{name:pattern}`
static PLACEHOLDER: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"\{([^{}:]+)(?::[^{}]*)?\}"));

/// Substitute every `{name}` in `template` and parse the result.
///
/// # Errors
///
/// Fails when a placeholder has no value in `params` or the expanded text is not a
/// valid absolute URL.
pub fn expand_template(template: &str, params: &UriParams) -> Result<Url, TransportError> {
    let placeholder = PLACEHOLDER
        .as_ref()
        .map_err(|e| TransportError::with_source("Invalid URI placeholder pattern", e.clone()))?;

    let mut missing = None;
    let expanded: Cow<'_, str> = placeholder.replace_all(template, |caps: &Captures<'_>| {
        let name = caps[1].trim();
        match params.get(name) {
            Some(value) => urlencoding::encode(value).into_owned(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(name) = missing {
        return Err(TransportError::new(format!(
            "Not enough variable values available to expand '{}'",
            name
        )));
    }

    Url::parse(&expanded)
        .map_err(|e| TransportError::with_source(format!("Invalid URI '{}'", expanded), e))
}
