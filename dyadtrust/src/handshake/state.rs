// Handshake phase tracking.

/// The current phase of a pairing handshake.
///
/// The run is strictly linear, so this is diagnostic state: it names where
/// the state machine is for trace output and for callers inspecting a
/// handshake, it does not drive control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// Collaborators bound, nothing on the wire yet.
    Init,
    /// Exchanging plaintext session-key contributions.
    SessionExchange,
    /// Session key deposited in its slot.
    SessionKeyDerived,
    /// Exchanging sealed vHUK contributions.
    VhukExchange,
    /// vHUK deposited in its slot — terminal success.
    VhukDerived,
    /// Terminal failure; the attempt cannot be resumed.
    Failed,
}

impl HandshakePhase {
    /// Human-readable label for the current phase (used in trace output).
    pub fn label(&self) -> &'static str {
        match self {
            HandshakePhase::Init => "Init",
            HandshakePhase::SessionExchange => "SessionExchange",
            HandshakePhase::SessionKeyDerived => "SessionKeyDerived",
            HandshakePhase::VhukExchange => "VhukExchange",
            HandshakePhase::VhukDerived => "VhukDerived",
            HandshakePhase::Failed => "Failed",
        }
    }
}
