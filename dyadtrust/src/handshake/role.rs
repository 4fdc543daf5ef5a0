//! Static participant role.
//!
//! The role fixes everything asymmetric about the protocol: who sends first
//! in each phase, and which half of a combined seed the local contribution
//! occupies.

use crate::error::{DyadTrustError, Result};
use crate::wire::BODY_LEN;

/// Handshake participant role, read once per handshake from the device's
/// own identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Role index 0 — sends before receiving in every phase.
    First,
    /// Role index 1 — receives before sending in every phase.
    Second,
}

impl Role {
    /// Resolve from the device role index. Anything other than 0 or 1 is a
    /// fatal configuration error.
    pub fn from_index(index: u32) -> Result<Self> {
        match index {
            0 => Ok(Role::First),
            1 => Ok(Role::Second),
            other => Err(DyadTrustError::InvalidRole(other)),
        }
    }

    /// The wire role index.
    pub fn index(self) -> u32 {
        match self {
            Role::First => 0,
            Role::Second => 1,
        }
    }

    /// The opposite participant's role.
    pub fn peer(self) -> Self {
        match self {
            Role::First => Role::Second,
            Role::Second => Role::First,
        }
    }

    /// Byte offset of this role's contribution inside a combined seed:
    /// role 0 always owns the first half, role 1 the second.
    pub fn seed_offset(self) -> usize {
        self.index() as usize * BODY_LEN
    }
}
