//! Wire codec for XDN requests
//!
//! Handles serialization of each request kind to and from the single-string
//! wire form, and prefix-based dispatch over incoming strings.
//!
//! Decoding has a three-way outcome: `Ok(Some(_))` for a successful decode,
//! `Ok(None)` when the input is not this kind (normal dispatch non-match),
//! and `Err(_)` when a recognized prefix carries an unparseable payload.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::packet::{PacketRegistry, PacketType};
use super::request::{Headers, HttpRequestRecord, StatediffApplyRequest};
use super::traits::ReplicaRequest;
use super::SERIALIZED_PREFIX;

/// Codec errors. A wrong or unknown prefix is not an error; it decodes to
/// `None` so dispatch can pass the string on.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("header entry {0:?} is missing the ':' separator")]
    MalformedHeaderEntry(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// JSON payload of the HTTP-request kind. Field names are wire contract.
#[derive(Debug, Serialize, Deserialize)]
struct HttpWirePayload {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    method: String,
    uri: String,
    /// One `"name:value"` entry per header occurrence, original order
    headers: Vec<String>,
    content: String,
}

/// JSON payload of the statediff-apply kind. Field names are wire contract.
#[derive(Debug, Serialize, Deserialize)]
struct StatediffWirePayload {
    sn: String,
    sd: String,
    id: u64,
}

/// `xdn:<code>:` prefix for a kind
fn kind_prefix(kind: PacketType) -> String {
    format!("{}{}:", SERIALIZED_PREFIX, kind.code())
}

/// Serialize an HTTP-kind request.
///
/// The body travels as UTF-8 text in the `content` field; a non-UTF-8 body
/// is converted lossily and will not round-trip.
pub fn encode_http(record: &HttpRequestRecord) -> CodecResult<String> {
    let payload = HttpWirePayload {
        protocol_version: record.protocol_version().to_string(),
        method: record.method().to_string(),
        uri: record.uri().to_string(),
        headers: record
            .headers()
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect(),
        content: String::from_utf8_lossy(record.body_bytes()).into_owned(),
    };
    Ok(format!(
        "{}{}",
        kind_prefix(PacketType::ServiceHttpRequest),
        serde_json::to_string(&payload)?
    ))
}

/// Decode an HTTP-kind request.
///
/// The service name is re-derived from the reconstructed headers on every
/// access; nothing out-of-band is trusted.
pub fn decode_http(encoded: &str) -> CodecResult<Option<HttpRequestRecord>> {
    let Some(payload) = encoded.strip_prefix(&kind_prefix(PacketType::ServiceHttpRequest))
    else {
        return Ok(None);
    };
    let payload: HttpWirePayload = serde_json::from_str(payload).map_err(|e| {
        warn!(error = %e, "malformed http-request payload");
        CodecError::from(e)
    })?;

    let mut headers = Headers::new();
    for entry in &payload.headers {
        // Split on the first ':' only; header values may contain more
        let Some((name, value)) = entry.split_once(':') else {
            warn!(entry = %entry, "header entry is missing the ':' separator");
            return Err(CodecError::MalformedHeaderEntry(entry.clone()));
        };
        headers.add(name, value);
    }

    let record = HttpRequestRecord::new(
        payload.protocol_version,
        payload.method,
        payload.uri,
        headers,
    )
    .with_body(Bytes::from(payload.content.into_bytes()));
    Ok(Some(record))
}

/// Serialize a statediff-apply request. The id is part of the wire form.
pub fn encode_statediff(request: &StatediffApplyRequest) -> CodecResult<String> {
    let payload = StatediffWirePayload {
        sn: request.service_name().to_string(),
        sd: String::from_utf8_lossy(request.statediff()).into_owned(),
        id: request.request_id(),
    };
    Ok(format!(
        "{}{}",
        kind_prefix(PacketType::StatediffApply),
        serde_json::to_string(&payload)?
    ))
}

/// Decode a statediff-apply request.
///
/// A payload without an `id` field is malformed; substituting a fresh id
/// would break replica agreement on the transition.
pub fn decode_statediff(encoded: &str) -> CodecResult<Option<StatediffApplyRequest>> {
    let Some(payload) = encoded.strip_prefix(&kind_prefix(PacketType::StatediffApply)) else {
        return Ok(None);
    };
    let payload: StatediffWirePayload = serde_json::from_str(payload).map_err(|e| {
        warn!(error = %e, "malformed statediff-apply payload");
        CodecError::from(e)
    })?;

    Ok(Some(
        StatediffApplyRequest::new(payload.sn, Bytes::from(payload.sd.into_bytes()))
            .with_request_id(payload.id),
    ))
}

/// Tagged union over every request kind this crate can put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireRequest {
    Http(HttpRequestRecord),
    StatediffApply(StatediffApplyRequest),
}

impl WireRequest {
    /// Serialize to the single-string wire form
    pub fn encode(&self) -> CodecResult<String> {
        match self {
            WireRequest::Http(record) => encode_http(record),
            WireRequest::StatediffApply(request) => encode_statediff(request),
        }
    }

    /// Decode any `xdn:` family string.
    ///
    /// `Ok(None)` means the input is not one of ours: no `xdn:` prefix, an
    /// unrecognized or non-numeric code, or a registered kind with no codec
    /// here. A recognized kind with an unparseable payload is an error,
    /// never silently `None`.
    pub fn decode(encoded: &str) -> CodecResult<Option<WireRequest>> {
        let Some(rest) = encoded.strip_prefix(SERIALIZED_PREFIX) else {
            return Ok(None);
        };
        let Some((code, _)) = rest.split_once(':') else {
            return Ok(None);
        };
        let Ok(code) = code.parse::<u32>() else {
            return Ok(None);
        };

        match PacketRegistry::global().lookup(code) {
            Some(PacketType::ServiceHttpRequest) => {
                Ok(decode_http(encoded)?.map(WireRequest::Http))
            }
            Some(PacketType::StatediffApply) => {
                Ok(decode_statediff(encoded)?.map(WireRequest::StatediffApply))
            }
            Some(other) => {
                debug!(kind = other.label(), "no codec for packet type");
                Ok(None)
            }
            None => {
                debug!(code, "unknown packet code");
                Ok(None)
            }
        }
    }
}

impl ReplicaRequest for WireRequest {
    fn packet_type(&self) -> PacketType {
        match self {
            WireRequest::Http(record) => record.packet_type(),
            WireRequest::StatediffApply(request) => request.packet_type(),
        }
    }

    fn service_name(&self) -> Option<String> {
        match self {
            WireRequest::Http(record) => ReplicaRequest::service_name(record),
            WireRequest::StatediffApply(request) => ReplicaRequest::service_name(request),
        }
    }

    fn request_id(&self) -> u64 {
        match self {
            WireRequest::Http(record) => record.request_id(),
            WireRequest::StatediffApply(request) => request.request_id(),
        }
    }

    fn needs_coordination(&self) -> bool {
        match self {
            WireRequest::Http(record) => ReplicaRequest::needs_coordination(record),
            WireRequest::StatediffApply(request) => {
                ReplicaRequest::needs_coordination(request)
            }
        }
    }
}
