//! Device collaborator boundaries: role identity and entropy.
//!
//! On hardware these sit over one-time-programmable storage and the
//! platform TRNG. Both are modeled as fallible traits so a read failure
//! aborts the handshake instead of panicking.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::{DyadTrustError, Result};

/// Source of the device's own role index.
pub trait IdentitySource {
    /// Read this device's role index. Called once per handshake.
    fn role_index(&mut self) -> Result<u32>;
}

/// Role index fixed at construction (strap pins, devicetree, tests).
pub struct StaticIdentity(pub u32);

impl IdentitySource for StaticIdentity {
    fn role_index(&mut self) -> Result<u32> {
        Ok(self.0)
    }
}

/// Source of cryptographically secure random bytes.
pub trait EntropySource {
    /// Fill `buf` completely with fresh random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Entropy from the operating system CSPRNG.
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| DyadTrustError::Entropy(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_identity_returns_fixed_index() {
        let mut id = StaticIdentity(1);
        assert_eq!(id.role_index().unwrap(), 1);
        assert_eq!(id.role_index().unwrap(), 1);
    }

    #[test]
    fn os_entropy_fills_whole_buffer() {
        let mut entropy = OsEntropy;
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        entropy.fill(&mut a).unwrap();
        entropy.fill(&mut b).unwrap();
        // 32 zero bytes from a CSPRNG is a 2^-256 event; treat as failure.
        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }
}
