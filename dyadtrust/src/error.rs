// DyadTrust error types

use thiserror::Error;

use crate::vault::KeySlot;
use crate::wire::MessageKind;

/// Top-level error type for the DyadTrust crate.
///
/// Every variant is fatal to the handshake attempt that raised it: errors
/// are propagated to the caller as-is, never retried and never downgraded.
#[derive(Debug, Error)]
pub enum DyadTrustError {
    // ── Device collaborator errors ──────────────────────────────────────
    #[error("failed to read device role index: {0}")]
    RoleRead(String),

    #[error("invalid device role index: {0}")]
    InvalidRole(u32),

    #[error("entropy source failure: {0}")]
    Entropy(String),

    // ── Link errors ─────────────────────────────────────────────────────
    #[error("link error: {0}")]
    Link(#[from] dyadlink::DyadLinkError),

    // ── Wire codec errors ───────────────────────────────────────────────
    #[error("unknown message kind: 0x{0:08x}")]
    UnknownMessageKind(u32),

    #[error("truncated handshake message: expected {expected} bytes, got {actual}")]
    TruncatedMessage { expected: usize, actual: usize },

    // ── Protocol errors ─────────────────────────────────────────────────
    #[error("unexpected {got:?} message while waiting for {expected:?}")]
    UnexpectedMessage {
        expected: MessageKind,
        got: MessageKind,
    },

    #[error("peer message carries role index {got}, expected {expected}")]
    PeerRoleMismatch { expected: u32, got: u32 },

    // ── Crypto errors ───────────────────────────────────────────────────
    #[error("AEAD encryption failed: {0}")]
    Encryption(String),

    /// Kept distinct from transport failures so callers can tell a
    /// corrupted or attacked channel apart from an unavailable one.
    #[error("message authentication failed")]
    Authentication,

    #[error("key slot {0:?} holds no key")]
    EmptySlot(KeySlot),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, DyadTrustError>;
