//! Fixed-layout handshake message codec.
//!
//! Binary layout (all integer fields big-endian, no padding):
//!
//! ```text
//! offset  size  field
//! 0       4     message kind        (0 = SESSION_KEY, 1 = VHUK)
//! 4       4     sender role index
//! 8       12    nonce (doubles as the AEAD nonce)
//! 20      32    body — one contribution, plaintext or ciphertext
//! 52      16    authentication tag (zero until the body is sealed)
//! total   68
//! ```
//!
//! The header (first 20 bytes) always travels in the clear and is the
//! associated data whenever the body is sealed. The record is a cross-chip
//! wire format, so it is encoded field by field — never by reinterpreting
//! the in-memory struct.

use bytes::{Buf, BufMut};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::device::EntropySource;
use crate::error::{DyadTrustError, Result};
use crate::handshake::role::Role;
use crate::vault::KeyVault;

/// Nonce length in bytes (AEAD nonce / IV).
pub const NONCE_LEN: usize = 12;
/// Body length in bytes: exactly one contribution.
pub const BODY_LEN: usize = 32;
/// Trailer authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Header length in bytes: kind + sender role + nonce.
pub const HEADER_LEN: usize = 4 + 4 + NONCE_LEN;
/// Total encoded message length in bytes.
pub const MESSAGE_LEN: usize = HEADER_LEN + BODY_LEN + TAG_LEN;

/// Handshake message kind (wire value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Session-key contribution — body is fresh randomness, sent in the clear.
    SessionKey,
    /// vHUK contribution — body is device-derived seed material, sent sealed.
    Vhuk,
}

impl MessageKind {
    /// Wire tag for this kind.
    pub fn wire_id(self) -> u32 {
        match self {
            MessageKind::SessionKey => 0,
            MessageKind::Vhuk => 1,
        }
    }
}

impl TryFrom<u32> for MessageKind {
    type Error = DyadTrustError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(MessageKind::SessionKey),
            1 => Ok(MessageKind::Vhuk),
            other => Err(DyadTrustError::UnknownMessageKind(other)),
        }
    }
}

/// Clear-text message header: kind, sender role index, per-message nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: MessageKind,
    pub sender: u32,
    pub nonce: [u8; NONCE_LEN],
}

impl Header {
    /// Encode the header. The result is also the AEAD associated data.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let mut buf = &mut out[..];
        buf.put_u32(self.kind.wire_id());
        buf.put_u32(self.sender);
        buf.put_slice(&self.nonce);
        out
    }
}

/// One complete handshake message: header, body, trailer.
///
/// The body may hold secret material (a vHUK contribution before sealing),
/// so body and tag are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HandshakeMessage {
    #[zeroize(skip)]
    pub header: Header,
    pub body: [u8; BODY_LEN],
    pub tag: [u8; TAG_LEN],
}

impl HandshakeMessage {
    /// Fresh message of the given kind: sender role filled in, a
    /// newly-sampled nonce, zero body and trailer.
    fn fresh<E: EntropySource + ?Sized>(
        kind: MessageKind,
        role: Role,
        entropy: &mut E,
    ) -> Result<Self> {
        let mut nonce = [0u8; NONCE_LEN];
        entropy.fill(&mut nonce)?;
        Ok(Self {
            header: Header {
                kind,
                sender: role.index(),
                nonce,
            },
            body: [0u8; BODY_LEN],
            tag: [0u8; TAG_LEN],
        })
    }

    /// Build the local SESSION_KEY message: random 32-byte contribution.
    pub fn session<E: EntropySource + ?Sized>(role: Role, entropy: &mut E) -> Result<Self> {
        let mut msg = Self::fresh(MessageKind::SessionKey, role, entropy)?;
        entropy.fill(&mut msg.body)?;
        Ok(msg)
    }

    /// Build the local VHUK message: device-derived 32-byte contribution.
    pub fn vhuk<V: KeyVault + ?Sized, E: EntropySource + ?Sized>(
        role: Role,
        vault: &mut V,
        entropy: &mut E,
    ) -> Result<Self> {
        let mut msg = Self::fresh(MessageKind::Vhuk, role, entropy)?;
        vault.vhuk_contribution(&mut msg.body)?;
        Ok(msg)
    }

    /// Encode into the fixed 68-byte wire record.
    pub fn encode(&self) -> [u8; MESSAGE_LEN] {
        let mut out = [0u8; MESSAGE_LEN];
        let mut buf = &mut out[..];
        buf.put_slice(&self.header.encode());
        buf.put_slice(&self.body);
        buf.put_slice(&self.tag);
        out
    }

    /// Decode a complete wire record. The record is fixed-size, so anything
    /// other than exactly [`MESSAGE_LEN`] bytes is rejected.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() != MESSAGE_LEN {
            return Err(DyadTrustError::TruncatedMessage {
                expected: MESSAGE_LEN,
                actual: data.len(),
            });
        }

        let kind = MessageKind::try_from(data.get_u32())?;
        let sender = data.get_u32();
        let mut nonce = [0u8; NONCE_LEN];
        data.copy_to_slice(&mut nonce);
        let mut body = [0u8; BODY_LEN];
        data.copy_to_slice(&mut body);
        let mut tag = [0u8; TAG_LEN];
        data.copy_to_slice(&mut tag);

        Ok(Self {
            header: Header {
                kind,
                sender,
                nonce,
            },
            body,
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::SoftVault;

    /// Deterministic entropy: fills every buffer with an incrementing byte
    /// stream so consecutive samples are distinct and predictable.
    struct CountingEntropy(u8);

    impl EntropySource for CountingEntropy {
        fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
            for b in buf.iter_mut() {
                *b = self.0;
                self.0 = self.0.wrapping_add(1);
            }
            Ok(())
        }
    }

    #[test]
    fn layout_offsets() {
        let msg = HandshakeMessage {
            header: Header {
                kind: MessageKind::Vhuk,
                sender: 1,
                nonce: [0xAA; NONCE_LEN],
            },
            body: [0xBB; BODY_LEN],
            tag: [0xCC; TAG_LEN],
        };
        let bytes = msg.encode();
        assert_eq!(bytes.len(), 68);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]); // kind, big-endian
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]); // sender role
        assert_eq!(&bytes[8..20], &[0xAA; 12]);
        assert_eq!(&bytes[20..52], &[0xBB; 32]);
        assert_eq!(&bytes[52..68], &[0xCC; 16]);
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut entropy = CountingEntropy(0);
        let msg = HandshakeMessage::session(Role::Second, &mut entropy).unwrap();
        let decoded = HandshakeMessage::decode(&msg.encode()).unwrap();
        assert_eq!(decoded.header, msg.header);
        assert_eq!(decoded.body, msg.body);
        assert_eq!(decoded.tag, msg.tag);
    }

    #[test]
    fn unknown_kind_rejected() {
        let mut entropy = CountingEntropy(0);
        let msg = HandshakeMessage::session(Role::First, &mut entropy).unwrap();
        let mut bytes = msg.encode();
        bytes[3] = 9;
        assert!(matches!(
            HandshakeMessage::decode(&bytes),
            Err(DyadTrustError::UnknownMessageKind(9))
        ));
    }

    #[test]
    fn wrong_length_rejected() {
        for len in [0, 1, HEADER_LEN, MESSAGE_LEN - 1, MESSAGE_LEN + 1] {
            let data = vec![0u8; len];
            assert!(matches!(
                HandshakeMessage::decode(&data),
                Err(DyadTrustError::TruncatedMessage { actual, .. }) if actual == len
            ));
        }
    }

    #[test]
    fn session_builder_fills_header_and_body() {
        let mut entropy = CountingEntropy(0);
        let msg = HandshakeMessage::session(Role::First, &mut entropy).unwrap();
        assert_eq!(msg.header.kind, MessageKind::SessionKey);
        assert_eq!(msg.header.sender, 0);
        // Counting entropy: nonce gets bytes 0..12, body gets 12..44.
        assert_eq!(msg.header.nonce[0], 0);
        assert_eq!(msg.body[0], 12);
        assert_eq!(msg.tag, [0u8; TAG_LEN]);
    }

    #[test]
    fn vhuk_builder_uses_vault_contribution() {
        let mut entropy = CountingEntropy(0);
        let mut vault = SoftVault::new([0x44; 32]);
        let msg = HandshakeMessage::vhuk(Role::Second, &mut vault, &mut entropy).unwrap();
        assert_eq!(msg.header.kind, MessageKind::Vhuk);
        assert_eq!(msg.header.sender, 1);

        let mut expected = [0u8; BODY_LEN];
        vault.vhuk_contribution(&mut expected).unwrap();
        assert_eq!(msg.body, expected);
    }

    #[test]
    fn nonces_are_fresh_per_message() {
        let mut entropy = CountingEntropy(0);
        let a = HandshakeMessage::session(Role::First, &mut entropy).unwrap();
        let b = HandshakeMessage::session(Role::First, &mut entropy).unwrap();
        assert_ne!(a.header.nonce, b.header.nonce);
    }

    #[test]
    fn header_encode_matches_message_prefix() {
        let mut entropy = CountingEntropy(7);
        let msg = HandshakeMessage::session(Role::First, &mut entropy).unwrap();
        assert_eq!(msg.encode()[..HEADER_LEN], msg.header.encode());
    }
}
