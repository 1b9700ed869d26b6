//! Hash and Codec Helpers
//!
//! Thin wrappers around the hash primitives used by BIP-32:
//!
//! - **HMAC-SHA512**: derivation of `IL || IR` from a chain code
//! - **HASH160**: `RIPEMD160(SHA256(x))`, the short digest behind fingerprints
//! - **double SHA256**: the 4-byte checksum of base58check payloads
//!
//! The base58check codec lives here too. Decoding is split from checksum
//! verification so callers can tell a corrupted string apart from text that
//! is not base-58 at all.

use bitcoin::base58;
use bitcoin::hashes::{hash160, sha256d, Hash};
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::{HdError, Result};

/// Length of the base58check checksum suffix.
pub const CHECKSUM_LEN: usize = 4;

/// HMAC-SHA512(key, data), returned as a 64-byte array.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut hmac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
    hmac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hmac.finalize().into_bytes());
    out
}

/// Splits a 64-byte HMAC output into `(IL, IR)`.
pub fn split_hmac(output: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&output[..32]);
    ir.copy_from_slice(&output[32..]);
    (il, ir)
}

/// RIPEMD160(SHA256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

/// First four bytes of SHA256(SHA256(data)).
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256d::Hash::hash(data).to_byte_array();
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Appends the checksum to `payload` and base-58 encodes the result.
pub fn encode_check(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    base58::encode(&data)
}

/// Base-58 decodes `text` and verifies and strips the trailing checksum.
///
/// # Errors
/// - `InvalidEncoding` if `text` contains non base-58 characters or is too
///   short to carry a checksum
/// - `ChecksumMismatch` if the checksum does not match the payload
pub fn decode_check(text: &str) -> Result<Vec<u8>> {
    let mut data = base58::decode(text).map_err(|e| HdError::InvalidEncoding(e.to_string()))?;
    if data.len() < CHECKSUM_LEN {
        return Err(HdError::InvalidEncoding(format!(
            "{} bytes is too short for a checksum",
            data.len()
        )));
    }

    let split = data.len() - CHECKSUM_LEN;
    if checksum(&data[..split])[..] != data[split..] {
        return Err(HdError::ChecksumMismatch);
    }
    data.truncate(split);
    Ok(data)
}
