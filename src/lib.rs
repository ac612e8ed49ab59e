//! XDN Wire - Request model and wire codec for XDN replicated services
//!
//! Carries client-facing HTTP requests and internal statediff-apply
//! requests through the replica coordination pipeline as single
//! self-describing strings of the form `xdn:<code>:<payload>`.

pub mod protocol;

pub use protocol::{
    resolve_service_name, CodecError, CodecResult, Headers, HttpRequestRecord,
    HttpResponseRecord, PacketRegistry, PacketType, RegistryError, ReplicaRequest,
    StatediffApplyRequest, WireRequest,
};
