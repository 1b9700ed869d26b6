//! Cryptographic Primitives
//!
//! - **hash**: HMAC-SHA512, HASH160 and base58check
//! - **key**: raw EC key material wrappers
//! - **hd**: the BIP-32 key node and derivation
//! - **extended**: `xprv` / `xpub` serialization
//! - **mnemonic**: BIP-39 seed phrases

pub mod extended;
pub mod hash;
pub mod hd;
pub mod key;
pub mod mnemonic;
