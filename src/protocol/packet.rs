//! Packet type registry
//!
//! Enumerates every request kind handled by XDN services and the replica
//! coordinator, keyed by a unique integer code.

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate packet code {code}: {existing} and {duplicate}")]
    DuplicateCode {
        code: u32,
        existing: &'static str,
        duplicate: &'static str,
    },
}

/// Request kinds carried over the XDN wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Client HTTP request targeting a replicated service
    ServiceHttpRequest,
    /// HTTP request forwarded between replicas; owned by the coordinator,
    /// no codec in this crate
    ForwardHttpRequest,
    /// Statediff to be applied by a replica
    StatediffApply,
}

impl PacketType {
    /// Every defined kind, in registration order
    pub const ALL: [PacketType; 3] = [
        PacketType::ServiceHttpRequest,
        PacketType::ForwardHttpRequest,
        PacketType::StatediffApply,
    ];

    /// Wire code for this kind
    pub fn code(&self) -> u32 {
        match self {
            PacketType::ServiceHttpRequest => 31300,
            PacketType::ForwardHttpRequest => 31301,
            PacketType::StatediffApply => 31302,
        }
    }

    /// Stable label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            PacketType::ServiceHttpRequest => "service-http-request",
            PacketType::ForwardHttpRequest => "forward-http-request",
            PacketType::StatediffApply => "statediff-apply",
        }
    }

    /// Look a kind up by wire code in the global registry
    pub fn from_code(code: u32) -> Option<PacketType> {
        PacketRegistry::global().lookup(code)
    }
}

/// Immutable code-to-kind mapping, built once before any request is served
#[derive(Debug)]
pub struct PacketRegistry {
    by_code: HashMap<u32, PacketType>,
}

static REGISTRY: OnceLock<PacketRegistry> = OnceLock::new();

impl PacketRegistry {
    /// Build the registry from the fixed kind set, rejecting duplicate codes.
    /// The check runs in every build profile.
    pub fn build() -> Result<Self, RegistryError> {
        Self::from_kinds(&PacketType::ALL)
    }

    fn from_kinds(kinds: &[PacketType]) -> Result<Self, RegistryError> {
        let mut by_code: HashMap<u32, PacketType> = HashMap::with_capacity(kinds.len());
        for kind in kinds {
            let code = kind.code();
            if let Some(existing) = by_code.get(&code) {
                return Err(RegistryError::DuplicateCode {
                    code,
                    existing: existing.label(),
                    duplicate: kind.label(),
                });
            }
            by_code.insert(code, *kind);
        }
        Ok(Self { by_code })
    }

    /// Process-wide registry. A duplicate code is a build-time defect, so a
    /// failed build aborts here instead of serving with ambiguous routing.
    pub fn global() -> &'static PacketRegistry {
        REGISTRY.get_or_init(|| match Self::build() {
            Ok(registry) => registry,
            Err(e) => panic!("packet registry initialization failed: {e}"),
        })
    }

    /// Kind registered under `code`, if any
    pub fn lookup(&self, code: u32) -> Option<PacketType> {
        self.by_code.get(&code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_lookup_able() {
        let registry = PacketRegistry::build().unwrap();
        for kind in PacketType::ALL {
            assert_eq!(registry.lookup(kind.code()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_code_is_absent() {
        let registry = PacketRegistry::build().unwrap();
        assert_eq!(registry.lookup(99999), None);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let result = PacketRegistry::from_kinds(&[
            PacketType::StatediffApply,
            PacketType::StatediffApply,
        ]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicateCode {
                code: 31302,
                existing: "statediff-apply",
                duplicate: "statediff-apply",
            }
        );
    }

    #[test]
    fn test_from_code_uses_global_registry() {
        assert_eq!(PacketType::from_code(31300), Some(PacketType::ServiceHttpRequest));
        assert_eq!(PacketType::from_code(31301), Some(PacketType::ForwardHttpRequest));
        assert_eq!(PacketType::from_code(31302), Some(PacketType::StatediffApply));
        assert_eq!(PacketType::from_code(0), None);
    }
}
