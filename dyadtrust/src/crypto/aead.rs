// AEAD body transform for handshake messages.
//
// The message's own header supplies both the AEAD nonce and, in encoded
// form, the associated data; the 32-byte body is transformed in place and
// the 16-byte trailer carries the tag. Tampering with any of the three
// regions makes decryption fail.

use crate::error::Result;
use crate::vault::{KeySlot, KeyVault};
use crate::wire::HandshakeMessage;

/// Seal the message body under the key in `slot`. The trailer is
/// overwritten with the fresh tag.
pub fn encrypt_body<V: KeyVault + ?Sized>(
    msg: &mut HandshakeMessage,
    vault: &V,
    slot: KeySlot,
) -> Result<()> {
    let aad = msg.header.encode();
    msg.tag = vault.seal(slot, &msg.header.nonce, &aad, &mut msg.body)?;
    Ok(())
}

/// Open the message body under the key in `slot`, verifying the trailer
/// tag against header and body. On failure the body is untrustworthy and
/// the handshake must abort.
pub fn decrypt_body<V: KeyVault + ?Sized>(
    msg: &mut HandshakeMessage,
    vault: &V,
    slot: KeySlot,
) -> Result<()> {
    let aad = msg.header.encode();
    vault.open(slot, &msg.header.nonce, &aad, &mut msg.body, &msg.tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DyadTrustError;
    use crate::vault::{KeySlot, SoftVault, SEED_LEN};
    use crate::wire::{Header, MessageKind, BODY_LEN, NONCE_LEN, TAG_LEN};

    fn sealed_vault() -> SoftVault {
        let mut vault = SoftVault::new([7; 32]);
        vault
            .derive_session_key(&[0x99; SEED_LEN], KeySlot::Session)
            .unwrap();
        vault
    }

    fn message(nonce_fill: u8) -> HandshakeMessage {
        HandshakeMessage {
            header: Header {
                kind: MessageKind::Vhuk,
                sender: 0,
                nonce: [nonce_fill; NONCE_LEN],
            },
            body: [0x21; BODY_LEN],
            tag: [0u8; TAG_LEN],
        }
    }

    #[test]
    fn round_trip() {
        let vault = sealed_vault();
        let mut msg = message(1);

        encrypt_body(&mut msg, &vault, KeySlot::Session).unwrap();
        assert_ne!(msg.body, [0x21; BODY_LEN]);
        assert_ne!(msg.tag, [0u8; TAG_LEN]);

        decrypt_body(&mut msg, &vault, KeySlot::Session).unwrap();
        assert_eq!(msg.body, [0x21; BODY_LEN]);
    }

    #[test]
    fn tampered_header_rejected() {
        let vault = sealed_vault();
        let mut msg = message(2);
        encrypt_body(&mut msg, &vault, KeySlot::Session).unwrap();

        // The header is associated data even though it travels in the clear.
        msg.header.sender = 1;
        assert!(matches!(
            decrypt_body(&mut msg, &vault, KeySlot::Session),
            Err(DyadTrustError::Authentication)
        ));
    }

    #[test]
    fn tampered_nonce_rejected() {
        let vault = sealed_vault();
        let mut msg = message(3);
        encrypt_body(&mut msg, &vault, KeySlot::Session).unwrap();

        msg.header.nonce[0] ^= 0x01;
        assert!(decrypt_body(&mut msg, &vault, KeySlot::Session).is_err());
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let vault = sealed_vault();
        let mut msg = message(4);
        encrypt_body(&mut msg, &vault, KeySlot::Session).unwrap();

        msg.body[17] ^= 0xFF;
        assert!(matches!(
            decrypt_body(&mut msg, &vault, KeySlot::Session),
            Err(DyadTrustError::Authentication)
        ));
    }

    #[test]
    fn tampered_tag_rejected() {
        let vault = sealed_vault();
        let mut msg = message(5);
        encrypt_body(&mut msg, &vault, KeySlot::Session).unwrap();

        msg.tag[15] ^= 0x80;
        assert!(matches!(
            decrypt_body(&mut msg, &vault, KeySlot::Session),
            Err(DyadTrustError::Authentication)
        ));
    }

    #[test]
    fn every_single_byte_flip_is_caught() {
        let vault = sealed_vault();
        let mut reference = message(6);
        encrypt_body(&mut reference, &vault, KeySlot::Session).unwrap();
        let wire = reference.encode();

        for i in 0..wire.len() {
            let mut corrupted = wire;
            corrupted[i] ^= 0x01;
            let mut msg = match HandshakeMessage::decode(&corrupted) {
                Ok(msg) => msg,
                // Flipping a kind byte can make the record undecodable;
                // that rejection is just as final.
                Err(_) => continue,
            };
            assert!(
                decrypt_body(&mut msg, &vault, KeySlot::Session).is_err(),
                "flip at byte {i} went undetected"
            );
        }
    }
}
