//! Request and response envelopes.
//!
//! An envelope is the transportable form of an HTTP-shaped exchange. Both
//! sides of the boundary agree on these types; the [`codec`](crate::codec)
//! module decides how they are laid out on the wire.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// HTTP method carried by a request envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order-preserving string-to-string header map.
///
/// Insertion order survives the boundary, lookups are case-insensitive, and
/// inserting an existing key replaces the value in place. There are no
/// repeated keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// An HTTP-shaped request crossing the boundary.
///
/// `path` is always relative; whether a URL is eligible for the sandbox at
/// all is decided strictly before an envelope exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub method: Method,
    pub path: String,
    pub headers: Headers,
    pub query_string: String,
    /// Raw body bytes. Carried outside the serialized header on the wire.
    #[serde(skip)]
    pub body: Option<Bytes>,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            query_string: String::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn query(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// An HTTP-shaped response crossing the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Headers,
    /// Always present, possibly empty. Carried outside the serialized
    /// header on the wire.
    #[serde(skip)]
    pub body: Bytes,
}

impl ResponseEnvelope {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = RequestEnvelope::new(Method::Get, "/app/data/img.png")
            .header("Accept", "image/png")
            .query("w=64");

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/app/data/img.png");
        assert_eq!(request.headers.get("accept"), Some("image/png"));
        assert_eq!(request.query_string, "w=64");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_headers_replace_in_place() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("X-Token", "a");
        headers.insert("content-type", "image/png");

        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Content-Type", "X-Token"]);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("image/png"));
    }

    #[test]
    fn test_headers_preserve_insertion_order() {
        let headers: Headers = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_response_status_checks() {
        let response = ResponseEnvelope::new(200).body(Bytes::from_static(b"ok"));
        assert!(response.is_success());
        assert!(!response.is_client_error());
        assert!(!response.is_server_error());

        assert!(ResponseEnvelope::new(404).is_client_error());
        assert!(ResponseEnvelope::new(502).is_server_error());
    }

    #[test]
    fn test_content_type_lookup() {
        let response = ResponseEnvelope::new(200).header("content-type", "image/png");
        assert_eq!(response.content_type(), Some("image/png"));
        assert_eq!(ResponseEnvelope::new(200).content_type(), None);
    }
}
