//! Service name resolution
//!
//! The target service of an HTTP-kind request is embedded in its headers.
//! For example, the service name is `hello` for these cases:
//! - a request with `XDN: hello` in the header.
//! - a request with `Host: hello.abc.xdn.io` in the header.

use super::request::Headers;

/// Header carrying an explicit service name
pub const XDN_HEADER: &str = "XDN";
/// Fallback header; the first dot-separated segment names the service
pub const HOST_HEADER: &str = "Host";

/// Derive the logical service name from request headers.
///
/// The `XDN` header wins over `Host`. Pure function; callers re-derive on
/// every decode because the HTTP wire form does not persist the service
/// name.
pub fn resolve_service_name(headers: &Headers) -> Option<String> {
    if let Some(xdn) = headers.get(XDN_HEADER) {
        if !xdn.is_empty() {
            return Some(xdn.to_string());
        }
    }

    let host = headers.get(HOST_HEADER)?;
    match host.split('.').next() {
        Some(segment) if !segment.is_empty() => Some(segment.to_string()),
        _ => None,
    }
}
