//! Raw EC key material accepted by [`HierarchicalKey::new`].
//!
//! These wrappers only check encodings. Curve validation happens when a
//! hierarchical key is built, through the node's curve backend.
//!
//! [`HierarchicalKey::new`]: crate::HierarchicalKey::new

use std::fmt;

use zeroize::Zeroizing;

use crate::{HdError, Result};

/// A secp256k1 private key, flagged with the point encoding it pairs with.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: Zeroizing<[u8; 32]>,
    compressed: bool,
}

impl PrivateKey {
    /// A private key whose public key is used in compressed form.
    pub fn new(secret: [u8; 32]) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            compressed: true,
        }
    }

    /// A private key whose public key is used in uncompressed form.
    ///
    /// Such keys exist for legacy wallets but can never become a
    /// hierarchical key.
    pub fn new_uncompressed(secret: [u8; 32]) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            compressed: false,
        }
    }

    /// Parses a 32-byte big-endian secret (compressed).
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HdError::InvalidScalarOrPoint("private key must be 32 bytes"))?;
        Ok(Self::new(secret))
    }

    /// The raw secret scalar.
    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Whether the key pairs with a compressed public key.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("secret", &"[redacted]")
            .field("compressed", &self.compressed)
            .finish()
    }
}

/// A SEC1-encoded secp256k1 public key, compressed or uncompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    encoded: Vec<u8>,
}

impl PublicKey {
    /// Accepts 33-byte compressed (`02`/`03`) or 65-byte uncompressed (`04`)
    /// encodings. Whether the point lies on the curve is not checked here.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match (bytes.len(), bytes.first()) {
            (33, Some(0x02 | 0x03)) | (65, Some(0x04)) => Ok(Self {
                encoded: bytes.to_vec(),
            }),
            _ => Err(HdError::InvalidScalarOrPoint("malformed public key encoding")),
        }
    }

    /// Whether this is a 33-byte compressed encoding.
    pub fn is_compressed(&self) -> bool {
        self.encoded.len() == 33
    }

    /// The SEC1 encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }
}

/// Key material a hierarchical key is built around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// A private scalar; the public point is computed from it.
    Private(PrivateKey),
    /// A public point only.
    Public(PublicKey),
}

impl From<PrivateKey> for KeyMaterial {
    fn from(key: PrivateKey) -> Self {
        KeyMaterial::Private(key)
    }
}

impl From<PublicKey> for KeyMaterial {
    fn from(key: PublicKey) -> Self {
        KeyMaterial::Public(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_encodings() {
        assert!(PublicKey::from_slice(&[0x02; 33]).unwrap().is_compressed());
        assert!(!PublicKey::from_slice(&[0x04; 65]).unwrap().is_compressed());

        assert!(PublicKey::from_slice(&[0x04; 33]).is_err());
        assert!(PublicKey::from_slice(&[0x02; 65]).is_err());
        assert!(PublicKey::from_slice(&[]).is_err());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKey::new([0xab; 32]);
        let debug = format!("{key:?}");
        assert!(!debug.contains("171")); // 0xab
        assert!(!debug.contains("ab, "));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_private_key_from_slice_length() {
        assert!(PrivateKey::from_slice(&[1u8; 32]).is_ok());
        assert!(PrivateKey::from_slice(&[1u8; 31]).is_err());
    }
}
