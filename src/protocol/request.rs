//! Request record definitions
//!
//! In-memory representations of the requests carried over the XDN wire.
//! Each record exclusively owns its header sequence and body buffer; every
//! decode allocates fresh objects.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use super::packet::PacketType;
use super::service::resolve_service_name;
use super::traits::ReplicaRequest;

/// Wall-clock milliseconds, used for locally generated request ids
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Ordered sequence of HTTP header entries
///
/// Duplicate names are legal and insertion order is preserved exactly.
/// Lookup by name is ASCII-case-insensitive and returns the first
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping any earlier occurrences of the same name
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value registered under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A client HTTP request bound for a replicated service
///
/// The request id is generated locally from the wall clock and never
/// carried on the wire, so replicas do not agree on ids for this kind
/// (unlike [`StatediffApplyRequest`], whose id is wire-carried). The id
/// and any attached response are excluded from equality.
#[derive(Debug, Clone)]
pub struct HttpRequestRecord {
    protocol_version: String,
    method: String,
    uri: String,
    headers: Headers,
    body: Option<Bytes>,
    response: Option<HttpResponseRecord>,
    request_id: u64,
}

impl HttpRequestRecord {
    pub fn new(
        protocol_version: impl Into<String>,
        method: impl Into<String>,
        uri: impl Into<String>,
        headers: Headers,
    ) -> Self {
        Self {
            protocol_version: protocol_version.into(),
            method: method.into(),
            uri: uri.into(),
            headers,
            body: None,
            response: None,
            request_id: now_millis(),
        }
    }

    /// Attach a body at construction time
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Body bytes, empty when no body is attached
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or(&[])
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
    }

    /// Service name derived from the request headers, never stored
    pub fn service_name(&self) -> Option<String> {
        resolve_service_name(&self.headers)
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Attach the response produced by a downstream step
    pub fn set_response(&mut self, response: HttpResponseRecord) {
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&HttpResponseRecord> {
        self.response.as_ref()
    }
}

impl PartialEq for HttpRequestRecord {
    // Wire-relevant fields only; the attached response and the local
    // request id are not part of the canonical form. An absent body equals
    // an empty one.
    fn eq(&self, other: &Self) -> bool {
        self.protocol_version == other.protocol_version
            && self.method == other.method
            && self.uri == other.uri
            && self.headers == other.headers
            && self.body_bytes() == other.body_bytes()
    }
}

impl Eq for HttpRequestRecord {}

impl ReplicaRequest for HttpRequestRecord {
    fn packet_type(&self) -> PacketType {
        PacketType::ServiceHttpRequest
    }

    fn service_name(&self) -> Option<String> {
        resolve_service_name(&self.headers)
    }

    fn request_id(&self) -> u64 {
        self.request_id
    }

    // Client HTTP requests execute where they land; only statediffs are
    // ordered across replicas.
    fn needs_coordination(&self) -> bool {
        false
    }
}

/// Response attached to an [`HttpRequestRecord`] once downstream
/// processing completes. Never serialized by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseRecord {
    pub protocol_version: String,
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

/// An opaque statediff to be applied by a replica
///
/// The request id is wire-carried: every replica must associate the same
/// id with a given state transition. A freshly constructed request takes a
/// wall-clock id; decode restores the id from the wire instead of
/// generating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatediffApplyRequest {
    service_name: String,
    statediff: Bytes,
    request_id: u64,
}

impl StatediffApplyRequest {
    pub fn new(service_name: impl Into<String>, statediff: impl Into<Bytes>) -> Self {
        Self {
            service_name: service_name.into(),
            statediff: statediff.into(),
            request_id: now_millis(),
        }
    }

    /// Override the generated id, e.g. with one restored from the wire
    pub fn with_request_id(mut self, request_id: u64) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn statediff(&self) -> &Bytes {
        &self.statediff
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn set_request_id(&mut self, request_id: u64) {
        self.request_id = request_id;
    }
}

impl ReplicaRequest for StatediffApplyRequest {
    fn packet_type(&self) -> PacketType {
        PacketType::StatediffApply
    }

    fn service_name(&self) -> Option<String> {
        Some(self.service_name.clone())
    }

    fn request_id(&self) -> u64 {
        self.request_id
    }

    fn needs_coordination(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(entries: &[(&str, &str)]) -> Headers {
        entries
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let h = headers(&[("Host", "svc.xdn.io")]);
        assert_eq!(h.get("host"), Some("svc.xdn.io"));
        assert_eq!(h.get("HOST"), Some("svc.xdn.io"));
        assert_eq!(h.get("Host"), Some("svc.xdn.io"));
    }

    #[test]
    fn test_header_lookup_returns_first_occurrence() {
        let h = headers(&[("h1", "a"), ("h1", "b"), ("h1", "c")]);
        assert_eq!(h.get("h1"), Some("a"));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_header_order_preserved() {
        let h = headers(&[("h1", "a"), ("h2", "x"), ("h1", "b")]);
        let collected: Vec<_> = h.iter().collect();
        assert_eq!(collected, vec![("h1", "a"), ("h2", "x"), ("h1", "b")]);
    }

    #[test]
    fn test_equality_ignores_response_and_request_id() {
        let h = headers(&[("Host", "svc.xdn.io")]);
        let a = HttpRequestRecord::new("HTTP/1.1", "GET", "/", h.clone());
        let mut b = HttpRequestRecord::new("HTTP/1.1", "GET", "/", h);
        b.set_response(HttpResponseRecord {
            protocol_version: "HTTP/1.1".to_string(),
            status: 200,
            headers: Headers::new(),
            body: Bytes::from_static(b"ok"),
        });
        // ids are wall-clock generated and may already differ; equality
        // must hold regardless
        assert_eq!(a, b);
    }

    #[test]
    fn test_absent_body_equals_empty_body() {
        let h = headers(&[("Host", "svc.xdn.io")]);
        let absent = HttpRequestRecord::new("HTTP/1.1", "GET", "/", h.clone());
        let empty = HttpRequestRecord::new("HTTP/1.1", "GET", "/", h).with_body("");
        assert_eq!(absent, empty);
    }

    #[test]
    fn test_statediff_coordination_flags() {
        let sd = StatediffApplyRequest::new("svc", "diff");
        assert!(sd.needs_coordination());
        let http =
            HttpRequestRecord::new("HTTP/1.1", "GET", "/", headers(&[("Host", "svc.io")]));
        assert!(!http.needs_coordination());
    }
}
