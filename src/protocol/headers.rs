//! Case-insensitive, multi-valued header map.
//!
//! [`HeaderMultiMap`] is the single header representation used on both sides of a
//! call: the dispatcher builds one for every outgoing request, and every response
//! entity or response error carries one describing what the server sent back.
//!
//! # Semantics
//!
//! | Property | Behavior |
//! |----------|----------|
//! | Key comparison | ASCII case-insensitive |
//! | Key casing | First-seen casing is kept for iteration and display |
//! | Values | Ordered, one key may hold many (`Set-Cookie`) |
//! | Equality | Order-independent across keys, ordered within a key |
//!
//! # Examples
//!
//! ```
//! use microservice_restclient::protocol::HeaderMultiMap;
//!
//! let mut headers = HeaderMultiMap::new();
//! headers.add("Set-Cookie", "a=1");
//! headers.add("set-cookie", "b=2");
//!
//! assert_eq!(headers.get("SET-COOKIE").unwrap(), ["a=1", "b=2"]);
//! assert_eq!(headers.iter().next().unwrap().0, "Set-Cookie");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use http::header::{HeaderName, HeaderValue};
use thiserror::Error;

use super::constants::headers::CONTENT_TYPE;

/// Error raised when a [`HeaderMultiMap`] cannot be turned into an [`http::HeaderMap`].
#[derive(Debug, Error)]
pub enum HeaderConversionError {
    /// The header name is not a valid HTTP token
    #[error("Invalid header name '{0}'")]
    InvalidName(String),
    /// The header value contains characters HTTP does not allow
    #[error("Invalid value for header '{0}'")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Default)]
struct Entry {
    name: String,
    values: Vec<String>,
}

/// Ordered header multimap with case-insensitive keys.
#[derive(Clone, Default)]
pub struct HeaderMultiMap {
    entries: Vec<Entry>,
}

impl HeaderMultiMap {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(key))
    }

    /// Replace all values of `key`.
    ///
    /// An existing entry keeps its original casing and position.
    pub fn set<K, I, V>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.position(&key) {
            Some(idx) => self.entries[idx].values = values,
            None => self.entries.push(Entry { name: key, values }),
        }
    }

    /// Append a single value to `key`, creating the entry when missing.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].values.push(value.into()),
            None => self.entries.push(Entry {
                name: key,
                values: vec![value.into()],
            }),
        }
    }

    /// Append every value of `other` to this map.
    pub fn add_all(&mut self, other: &HeaderMultiMap) {
        for (name, values) in other.iter() {
            match self.position(name) {
                Some(idx) => self.entries[idx].values.extend_from_slice(values),
                None => self.entries.push(Entry {
                    name: name.to_string(),
                    values: values.to_vec(),
                }),
            }
        }
    }

    /// All values stored under `key`, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.position(key)
            .map(|idx| self.entries[idx].values.as_slice())
    }

    /// First value stored under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Whether `key` is present (even with an empty value list)
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Remove `key` and return its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.position(key)
            .map(|idx| self.entries.remove(idx).values)
    }

    /// The first `Content-Type` value, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.first(CONTENT_TYPE)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// Build an [`http::HeaderMap`] carrying every value of this map.
    ///
    /// # Errors
    ///
    /// Fails on the first name or value that is not valid HTTP.
    pub fn to_http(&self) -> Result<http::HeaderMap, HeaderConversionError> {
        let mut map = http::HeaderMap::with_capacity(self.entries.len());
        for (name, values) in self.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HeaderConversionError::InvalidName(name.to_string()))?;
            for value in values {
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| HeaderConversionError::InvalidValue(name.to_string()))?;
                map.append(header_name.clone(), header_value);
            }
        }
        Ok(map)
    }
}

impl fmt::Debug for HeaderMultiMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for HeaderMultiMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, values)| other.get(name) == Some(values))
    }
}

impl Eq for HeaderMultiMap {}

impl Hash for HeaderMultiMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with the order-independent, case-insensitive `PartialEq`.
        let mut keyed: Vec<(String, &[String])> = self
            .iter()
            .map(|(name, values)| (name.to_ascii_lowercase(), values))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.hash(state);
    }
}

impl From<&http::HeaderMap> for HeaderMultiMap {
    fn from(headers: &http::HeaderMap) -> Self {
        let mut map = HeaderMultiMap::new();
        for (name, value) in headers {
            map.add(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        map
    }
}

impl From<HashMap<String, Vec<String>>> for HeaderMultiMap {
    fn from(headers: HashMap<String, Vec<String>>) -> Self {
        let mut map = HeaderMultiMap::new();
        for (name, values) in headers {
            for value in values {
                map.add(name.clone(), value);
            }
            if !map.contains_key(&name) {
                map.set(name, Vec::<String>::new());
            }
        }
        map
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMultiMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = HeaderMultiMap::new();
        for (name, value) in iter {
            map.add(name, value);
        }
        map
    }
}
