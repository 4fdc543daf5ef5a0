//! Cryptographic framing for handshake messages.

pub mod aead;
