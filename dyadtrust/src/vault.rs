//! Protected key storage boundary.
//!
//! [`KeyVault`] is the seam in front of the platform key-management unit:
//! derivation calls sink a seed into a named slot, and the seal/open calls
//! run the AEAD engine against a slot-held key. Key bytes never cross this
//! boundary in either direction — callers only ever name slots.
//!
//! [`SoftVault`] is the software implementation used on hosts and in tests:
//! HKDF-SHA256 for derivation, AES-256-GCM with a detached 16-byte tag for
//! the engine. Everything it holds is wiped on drop.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{DyadTrustError, Result};
use crate::wire::{BODY_LEN, NONCE_LEN, TAG_LEN};

/// Combined seed length: two 32-byte contributions in role order.
pub const SEED_LEN: usize = 2 * BODY_LEN;

/// Destination slots in protected key storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    /// The shared symmetric session key agreed during the handshake.
    Session,
    /// The virtual hardware-unique key, pair-specific and long-lived.
    Vhuk,
}

impl KeySlot {
    fn index(self) -> usize {
        match self {
            KeySlot::Session => 0,
            KeySlot::Vhuk => 1,
        }
    }
}

/// Key derivation sink plus slot-keyed AEAD engine.
pub trait KeyVault {
    /// Derive the session key from the combined session seed into `slot`.
    fn derive_session_key(&mut self, seed: &[u8; SEED_LEN], slot: KeySlot) -> Result<()>;

    /// Derive the vHUK from the combined vHUK seed into `slot`.
    fn derive_vhuk(&mut self, seed: &[u8; SEED_LEN], slot: KeySlot) -> Result<()>;

    /// Produce this device's 32-byte vHUK contribution.
    fn vhuk_contribution(&mut self, out: &mut [u8; BODY_LEN]) -> Result<()>;

    /// Encrypt `body` in place under the key in `slot`, authenticating
    /// `aad`, and return the tag.
    fn seal(
        &self,
        slot: KeySlot,
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        body: &mut [u8; BODY_LEN],
    ) -> Result<[u8; TAG_LEN]>;

    /// Decrypt `body` in place under the key in `slot`, verifying `aad` and
    /// `tag`. Fails with [`DyadTrustError::Authentication`] on any mismatch;
    /// the body contents are untrustworthy after a failure.
    fn open(
        &self,
        slot: KeySlot,
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        body: &mut [u8; BODY_LEN],
        tag: &[u8; TAG_LEN],
    ) -> Result<()>;
}

/// Software vault: per-device root secret plus two volatile key slots.
pub struct SoftVault {
    root: [u8; 32],
    slots: [Option<[u8; 32]>; 2],
}

impl SoftVault {
    /// Create a vault seeded with this device's root secret (the HUK
    /// stand-in). Both key slots start empty.
    pub fn new(root: [u8; 32]) -> Self {
        Self {
            root,
            slots: [None, None],
        }
    }

    fn expand(ikm: &[u8], label: &[u8], out: &mut [u8]) -> Result<()> {
        let hk = Hkdf::<Sha256>::new(None, ikm);
        hk.expand(label, out)
            .map_err(|e| DyadTrustError::Derivation(format!("HKDF expand error: {e}")))
    }

    fn derive_into_slot(&mut self, seed: &[u8; SEED_LEN], label: &[u8], slot: KeySlot) -> Result<()> {
        let mut key = [0u8; 32];
        Self::expand(seed, label, &mut key)?;
        self.slots[slot.index()] = Some(key);
        key.zeroize();
        Ok(())
    }

    fn cipher(&self, slot: KeySlot) -> Result<Aes256Gcm> {
        let key = self.slots[slot.index()]
            .as_ref()
            .ok_or(DyadTrustError::EmptySlot(slot))?;
        Aes256Gcm::new_from_slice(key)
            .map_err(|e| DyadTrustError::Encryption(format!("aes-gcm init: {e}")))
    }
}

impl KeyVault for SoftVault {
    fn derive_session_key(&mut self, seed: &[u8; SEED_LEN], slot: KeySlot) -> Result<()> {
        self.derive_into_slot(seed, b"dyad session key", slot)
    }

    fn derive_vhuk(&mut self, seed: &[u8; SEED_LEN], slot: KeySlot) -> Result<()> {
        self.derive_into_slot(seed, b"dyad vhuk", slot)
    }

    fn vhuk_contribution(&mut self, out: &mut [u8; BODY_LEN]) -> Result<()> {
        Self::expand(&self.root, b"dyad vhuk contribution", out)
    }

    fn seal(
        &self,
        slot: KeySlot,
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        body: &mut [u8; BODY_LEN],
    ) -> Result<[u8; TAG_LEN]> {
        let cipher = self.cipher(slot)?;
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(nonce), aad, body)
            .map_err(|e| DyadTrustError::Encryption(format!("{e}")))?;
        Ok(tag.into())
    }

    fn open(
        &self,
        slot: KeySlot,
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        body: &mut [u8; BODY_LEN],
        tag: &[u8; TAG_LEN],
    ) -> Result<()> {
        let cipher = self.cipher(slot)?;
        cipher
            .decrypt_in_place_detached(Nonce::from_slice(nonce), aad, body, Tag::from_slice(tag))
            .map_err(|_| DyadTrustError::Authentication)
    }
}

impl Drop for SoftVault {
    fn drop(&mut self) {
        self.root.zeroize();
        for slot in self.slots.iter_mut() {
            if let Some(key) = slot {
                key.zeroize();
            }
        }
    }
}
