//! Protocol module - Defines the XDN request kinds and wire format
//!
//! Every request travels as a single UTF-8 string:
//! - `xdn:` family prefix
//! - decimal packet code followed by `:`
//! - JSON payload object for that kind

mod codec;
mod packet;
mod request;
mod service;
mod traits;

pub use codec::*;
pub use packet::*;
pub use request::*;
pub use service::*;
pub use traits::*;

/// Prefix of every serialized XDN request, so the surrounding framework
/// never mistakes one for a bare JSON packet.
pub const SERIALIZED_PREFIX: &str = "xdn:";
