// DyadTrust — boot-time pairing handshake between two coupled secure
// processors: session key agreement followed by virtual-HUK derivation.
//
// Crate root: module declarations and public re-exports.

pub mod crypto;
pub mod device;
pub mod error;
pub mod handshake;
pub mod vault;
pub mod wire;

// Re-export key types at crate root for convenience.
pub use error::{DyadTrustError, Result};
pub use handshake::protocol::{run_handshake, Handshake};
pub use handshake::role::Role;
pub use vault::{KeySlot, KeyVault, SoftVault};
