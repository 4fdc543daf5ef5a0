// Pairing handshake orchestrator: two-phase exchange over the inter-chip
// link.
//
//   Role 0                              Role 1
//     |--- SESSION_KEY (plaintext) --->|
//     |<-- SESSION_KEY (plaintext) ----|
//     |   both derive the session key into the session slot
//     |--- VHUK (sealed) ------------->|
//     |<-- VHUK (sealed) --------------|
//     |   both derive the vHUK into the vHUK slot
//
// Role 0 always sends before receiving and role 1 always receives before
// sending, in both phases. That asymmetry is the only synchronization in
// the protocol: with both endpoints on an effectively half-duplex link
// pair, any other ordering can leave both participants blocked on receive.

use dyadlink::{DyadLinkError, LinkPair};

use crate::crypto::aead;
use crate::device::{EntropySource, IdentitySource};
use crate::error::{DyadTrustError, Result};
use crate::handshake::role::Role;
use crate::handshake::seed::CombinedSeed;
use crate::handshake::state::HandshakePhase;
use crate::vault::{KeySlot, KeyVault};
use crate::wire::{HandshakeMessage, MessageKind, MESSAGE_LEN};

/// One pairing handshake attempt.
///
/// Holds no state across attempts: all buffers live for a single [`run`]
/// and the only lasting effect of a successful run is the two keys
/// deposited in the vault's session and vHUK slots.
///
/// [`run`]: Handshake::run
pub struct Handshake<'a, V: KeyVault, E: EntropySource> {
    role: Role,
    links: &'a mut LinkPair,
    vault: &'a mut V,
    entropy: &'a mut E,
    phase: HandshakePhase,
}

impl<'a, V: KeyVault, E: EntropySource> Handshake<'a, V, E> {
    /// Resolve the local role and bind the collaborators.
    ///
    /// The role index is read exactly once, here, before any message is
    /// built and before any link traffic; an index other than 0 or 1 is
    /// rejected on the spot.
    pub fn new(
        identity: &mut dyn IdentitySource,
        links: &'a mut LinkPair,
        vault: &'a mut V,
        entropy: &'a mut E,
    ) -> Result<Self> {
        let role = Role::from_index(identity.role_index()?)?;
        Ok(Self {
            role,
            links,
            vault,
            entropy,
            phase: HandshakePhase::Init,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    /// Execute the full handshake. Consumes the attempt: a failure is
    /// terminal and a retry means building a new `Handshake`.
    pub fn run(mut self) -> Result<()> {
        match self.execute() {
            Ok(()) => Ok(()),
            Err(err) => {
                self.phase = HandshakePhase::Failed;
                tracing::debug!(role = self.role.index(), %err, "handshake failed");
                Err(err)
            }
        }
    }

    fn execute(&mut self) -> Result<()> {
        // Both outbound messages are built up front so a collaborator
        // failure aborts before anything reaches the wire.
        let session_local = HandshakeMessage::session(self.role, self.entropy)?;
        let vhuk_local = HandshakeMessage::vhuk(self.role, self.vault, self.entropy)?;

        self.enter(HandshakePhase::SessionExchange);
        let session_peer = self.exchange(&session_local, None)?;
        let session_seed =
            CombinedSeed::assemble(self.role, &session_local.body, &session_peer.body);
        self.vault
            .derive_session_key(session_seed.bytes(), KeySlot::Session)?;
        self.enter(HandshakePhase::SessionKeyDerived);

        self.enter(HandshakePhase::VhukExchange);
        let vhuk_peer = self.exchange(&vhuk_local, Some(KeySlot::Session))?;
        let vhuk_seed = CombinedSeed::assemble(self.role, &vhuk_local.body, &vhuk_peer.body);
        self.vault.derive_vhuk(vhuk_seed.bytes(), KeySlot::Vhuk)?;
        self.enter(HandshakePhase::VhukDerived);

        tracing::info!(role = self.role.index(), "vHUK derived and deposited");
        Ok(())
    }

    /// One mirrored exchange round. Role 0 sends then receives; role 1
    /// receives then sends. `sealed` names the slot the bodies are
    /// protected under, or `None` during the plaintext bootstrap round.
    fn exchange(
        &mut self,
        local: &HandshakeMessage,
        sealed: Option<KeySlot>,
    ) -> Result<HandshakeMessage> {
        match self.role {
            Role::First => {
                self.send(local, sealed)?;
                self.receive(local.header.kind, sealed)
            }
            Role::Second => {
                let peer = self.receive(local.header.kind, sealed)?;
                self.send(local, sealed)?;
                Ok(peer)
            }
        }
    }

    fn send(&mut self, msg: &HandshakeMessage, sealed: Option<KeySlot>) -> Result<()> {
        init_link(self.links.sender.init())?;
        let mut out = msg.clone();
        if let Some(slot) = sealed {
            aead::encrypt_body(&mut out, &*self.vault, slot)?;
        }
        self.links.sender.send(&out.encode())?;
        Ok(())
    }

    fn receive(
        &mut self,
        expected: MessageKind,
        sealed: Option<KeySlot>,
    ) -> Result<HandshakeMessage> {
        init_link(self.links.receiver.init())?;
        self.links.receiver.wait()?;

        let mut buf = [0u8; MESSAGE_LEN];
        let n = self.links.receiver.receive(&mut buf)?;
        let mut msg = HandshakeMessage::decode(&buf[..n])?;

        if let Some(slot) = sealed {
            aead::decrypt_body(&mut msg, &*self.vault, slot)?;
        }
        if msg.header.kind != expected {
            return Err(DyadTrustError::UnexpectedMessage {
                expected,
                got: msg.header.kind,
            });
        }
        let peer_index = self.role.peer().index();
        if msg.header.sender != peer_index {
            return Err(DyadTrustError::PeerRoleMismatch {
                expected: peer_index,
                got: msg.header.sender,
            });
        }
        Ok(msg)
    }

    fn enter(&mut self, phase: HandshakePhase) {
        self.phase = phase;
        tracing::debug!(
            role = self.role.index(),
            phase = phase.label(),
            "handshake phase"
        );
    }
}

/// A link an earlier boot stage already initialized is usable as-is; every
/// other init failure is fatal.
fn init_link(result: dyadlink::Result<()>) -> Result<()> {
    match result {
        Ok(()) | Err(DyadLinkError::AlreadyInitialized) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Run one complete pairing handshake against the given collaborators.
///
/// On success exactly two keys have been deposited into the vault — the
/// shared session key in the session slot, the device-pair vHUK in the
/// vHUK slot — and nothing else is observable: no key material is ever
/// returned to the caller.
pub fn run_handshake<V: KeyVault, E: EntropySource>(
    identity: &mut dyn IdentitySource,
    links: &mut LinkPair,
    vault: &mut V,
    entropy: &mut E,
) -> Result<()> {
    Handshake::new(identity, links, vault, entropy)?.run()
}
