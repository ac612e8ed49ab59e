//! Replica request trait
//!
//! Defines the boundary consumed by the replica coordination framework:
//! every request kind reports its packet type, target service, identifier,
//! and whether replicas must coordinate before executing it.

use super::packet::PacketType;

/// Common surface of every request the coordinator can carry
pub trait ReplicaRequest {
    /// Packet type tag used for wire routing
    fn packet_type(&self) -> PacketType;

    /// Logical service this request targets, when one can be derived
    fn service_name(&self) -> Option<String>;

    /// Request identifier; whether replicas agree on it depends on the
    /// kind (see the kind's own docs)
    fn request_id(&self) -> u64;

    /// Whether execution must be ordered through the coordinator
    fn needs_coordination(&self) -> bool;
}
