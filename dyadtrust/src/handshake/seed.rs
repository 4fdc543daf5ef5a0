//! Combined derivation seeds.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::handshake::role::Role;
use crate::vault::SEED_LEN;
use crate::wire::BODY_LEN;

/// Role-ordered concatenation of the two participants' contributions.
///
/// Role 0's contribution always occupies bytes 0..32 and role 1's bytes
/// 32..64, no matter which participant assembles the buffer. Both sides of
/// a handshake therefore feed byte-identical input to key derivation even
/// though they executed mirrored send/receive sequences.
///
/// Lives only for the duration of one handshake and is wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CombinedSeed([u8; SEED_LEN]);

impl CombinedSeed {
    /// Assemble from the local contribution and the peer's, placing each in
    /// the half its *role* owns.
    pub fn assemble(
        local_role: Role,
        local: &[u8; BODY_LEN],
        peer: &[u8; BODY_LEN],
    ) -> Self {
        let mut seed = [0u8; SEED_LEN];
        let local_off = local_role.seed_offset();
        let peer_off = local_role.peer().seed_offset();
        seed[local_off..local_off + BODY_LEN].copy_from_slice(local);
        seed[peer_off..peer_off + BODY_LEN].copy_from_slice(peer);
        Self(seed)
    }

    pub fn bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_zero_contribution_always_first() {
        let from_zero = [0xA0u8; BODY_LEN];
        let from_one = [0xB1u8; BODY_LEN];

        // Assembled on the role-0 device: local is the role-0 contribution.
        let on_zero = CombinedSeed::assemble(Role::First, &from_zero, &from_one);
        // Assembled on the role-1 device: local is the role-1 contribution.
        let on_one = CombinedSeed::assemble(Role::Second, &from_one, &from_zero);

        assert_eq!(on_zero.bytes(), on_one.bytes());
        assert_eq!(&on_zero.bytes()[..32], &from_zero);
        assert_eq!(&on_zero.bytes()[32..], &from_one);
    }
}
