//! Extended Key Serialization
//!
//! The 78-byte payload behind `xprv…` / `xpub…` strings:
//!
//! ```text
//! offset  size  field
//!      0     4  version (network + private/public)
//!      4     1  depth
//!      5     4  parent fingerprint (big-endian)
//!      9     4  child index (big-endian)
//!     13    32  chain code
//!     45    33  0x00 || private scalar, or compressed public point
//! ```
//!
//! The payload is base58check encoded: a 4-byte double-SHA256 checksum is
//! appended before base-58 encoding.

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::hash::{decode_check, encode_check};
use crate::crypto::hd::HierarchicalKey;
use crate::crypto::key::{KeyMaterial, PrivateKey, PublicKey};
use crate::curve::CurveAdapter;
use crate::network::NetworkPrefixes;
use crate::{HdError, Result};

/// Length of an extended key payload, checksum excluded.
pub const EXTENDED_KEY_LEN: usize = 78;

const VERSION: std::ops::Range<usize> = 0..4;
const DEPTH: usize = 4;
const PARENT_FINGERPRINT: std::ops::Range<usize> = 5..9;
const CHILD_INDEX: std::ops::Range<usize> = 9..13;
const CHAIN_CODE: std::ops::Range<usize> = 13..45;
const KEY_DATA: std::ops::Range<usize> = 45..78;

impl<C: CurveAdapter> HierarchicalKey<C> {
    /// Serializes this node in its natural form: private if it holds a
    /// private scalar, public otherwise.
    pub fn serialize(&self, network: &NetworkPrefixes) -> String {
        self.encode(network, self.is_private())
    }

    /// Serializes the private form.
    ///
    /// # Errors
    /// `MissingPrivateMaterial` on public-only nodes.
    pub fn serialize_private(&self, network: &NetworkPrefixes) -> Result<String> {
        if !self.is_private() {
            return Err(HdError::MissingPrivateMaterial);
        }
        Ok(self.encode(network, true))
    }

    /// Serializes the public form. Always available, private nodes included.
    pub fn serialize_public(&self, network: &NetworkPrefixes) -> String {
        self.encode(network, false)
    }

    fn encode(&self, network: &NetworkPrefixes, private: bool) -> String {
        let mut payload = Zeroizing::new([0u8; EXTENDED_KEY_LEN]);
        payload[VERSION].copy_from_slice(&network.version(private));
        payload[DEPTH] = self.depth();
        payload[PARENT_FINGERPRINT].copy_from_slice(&self.parent_fingerprint().to_be_bytes());
        payload[CHILD_INDEX].copy_from_slice(&self.child_index().to_be_bytes());
        payload[CHAIN_CODE].copy_from_slice(self.chain_code());

        match self.private_scalar() {
            Ok(secret) if private => {
                payload[KEY_DATA.start] = 0x00;
                payload[KEY_DATA.start + 1..KEY_DATA.end].copy_from_slice(secret);
            }
            _ => payload[KEY_DATA].copy_from_slice(&self.public_point()),
        }

        encode_check(&payload[..])
    }

    /// Decodes an extended key string for `network`.
    ///
    /// # Errors
    /// - `InvalidEncoding` if `text` is not base-58
    /// - `ChecksumMismatch` if the checksum is wrong
    /// - `InvalidSerializedLength` if the payload is not 78 bytes
    /// - `NetworkMagicMismatch` if the version matches neither of the
    ///   network's prefixes
    /// - `InvalidRootKey` for a depth-0 key with a parent fingerprint or
    ///   child index
    /// - `InvalidScalarOrPoint` if the key data is out of range, off the
    ///   curve, or disagrees with the version (private data under a public
    ///   version or the reverse)
    pub fn from_extended(text: &str, network: &NetworkPrefixes, curve: C) -> Result<Self> {
        let payload = Zeroizing::new(decode_check(text)?);
        if payload.len() != EXTENDED_KEY_LEN {
            return Err(HdError::InvalidSerializedLength(payload.len()));
        }

        let version = read_array::<4>(&payload, VERSION);
        let private_version = network
            .classify(version)
            .ok_or(HdError::NetworkMagicMismatch(version))?;

        let depth = payload[DEPTH];
        let parent_fingerprint = u32::from_be_bytes(read_array(&payload, PARENT_FINGERPRINT));
        let child_index = u32::from_be_bytes(read_array(&payload, CHILD_INDEX));
        let chain_code = read_array::<32>(&payload, CHAIN_CODE);

        if depth == 0 && (parent_fingerprint != 0 || child_index != 0) {
            return Err(HdError::InvalidRootKey);
        }

        let key_data = &payload[KEY_DATA];
        let key = match (key_data[0], private_version) {
            (0x00, true) => KeyMaterial::Private(PrivateKey::from_slice(&key_data[1..])?),
            (0x02 | 0x03, false) => KeyMaterial::Public(PublicKey::from_slice(key_data)?),
            _ => {
                return Err(HdError::InvalidScalarOrPoint(
                    "key data does not match version bytes",
                ))
            }
        };

        let node = Self::new(curve, depth, parent_fingerprint, child_index, chain_code, key)?;
        debug!(
            depth,
            child_index,
            private = node.is_private(),
            "decoded extended key"
        );
        Ok(node)
    }
}

fn read_array<const N: usize>(payload: &[u8], range: std::ops::Range<usize>) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&payload[range]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::checksum;
    use crate::curve::{LibSecp256k1, Secp256kFun};
    use crate::network::Network;

    const XPRV_M: &str = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    const XPUB_M: &str = "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8";
    const XPUB_DEPTH_2: &str = "xpub6AV8iVdKGa79ExyueSBjnCNKkmwLQsTvaN2N8iWCT5PNX6Xrh3gPgz3gVrxtLiYyCdC9FjwsuTTXmJiuWkxpLoqo8gj7rPWdkDsUCWfQHJB";
    const XPRV_HARDENED: &str = "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7";

    fn bitcoin() -> NetworkPrefixes {
        Network::Bitcoin.prefixes()
    }

    /// Re-encodes a modified 78-byte payload with a valid checksum.
    fn reencode(text: &str, edit: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut payload = decode_check(text).unwrap();
        edit(&mut payload);
        encode_check(&payload)
    }

    #[test]
    fn test_private_roundtrip() {
        let key = HierarchicalKey::from_extended(XPRV_M, &bitcoin(), Secp256kFun).unwrap();
        assert!(key.is_private());
        assert_eq!(key.serialize(&bitcoin()), XPRV_M);
        assert_eq!(key.serialize_private(&bitcoin()).unwrap(), XPRV_M);
        assert_eq!(key.serialize_public(&bitcoin()), XPUB_M);
    }

    #[test]
    fn test_public_roundtrip() {
        let key = HierarchicalKey::from_extended(XPUB_M, &bitcoin(), Secp256kFun).unwrap();
        assert!(!key.is_private());
        assert_eq!(key.serialize(&bitcoin()), XPUB_M);
        assert_eq!(key.serialize_public(&bitcoin()), XPUB_M);
        assert_eq!(
            key.serialize_private(&bitcoin()),
            Err(HdError::MissingPrivateMaterial)
        );
    }

    #[test]
    fn test_decoded_fields() {
        let key = HierarchicalKey::from_extended(XPUB_DEPTH_2, &bitcoin(), Secp256kFun).unwrap();
        assert_eq!(key.depth(), 2);
        assert!(!key.is_hardened());
        assert_eq!(key.parent_fingerprint(), 0x615914f3);
        assert_eq!(key.fingerprint(), 0xa282920f);
        assert_eq!(
            hex::encode(key.public_point()),
            "02e399a713db445b33340034ee5f71cd782bd9bc78f6f3352ca640109fe24ca23a"
        );
        assert_eq!(key.private_scalar(), Err(HdError::MissingPrivateMaterial));

        let key = HierarchicalKey::from_extended(XPRV_HARDENED, &bitcoin(), Secp256kFun).unwrap();
        assert!(key.is_hardened());
        assert_eq!(
            hex::encode(key.private_scalar().unwrap()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
    }

    #[test]
    fn test_roundtrip_equality_both_backends() {
        let seed = [7u8; 32];
        let key = HierarchicalKey::from_seed(&seed, LibSecp256k1::new())
            .unwrap()
            .derive_path("m/1'/2/3'")
            .unwrap();

        for text in [key.serialize(&bitcoin()), key.serialize_public(&bitcoin())] {
            let decoded =
                HierarchicalKey::from_extended(&text, &bitcoin(), LibSecp256k1::new()).unwrap();
            if decoded.is_private() {
                assert_eq!(decoded, key);
            } else {
                assert_eq!(decoded, key.neuter());
            }
        }
    }

    #[test]
    fn test_network_mismatch() {
        let other = NetworkPrefixes::builder()
            .hd_private_version([0xff; 4])
            .hd_public_version([0xff; 4])
            .build()
            .unwrap();

        let err = HierarchicalKey::from_extended(XPUB_M, &other, Secp256kFun).unwrap_err();
        assert_eq!(err, HdError::NetworkMagicMismatch([0x04, 0x88, 0xb2, 0x1e]));

        let err =
            HierarchicalKey::from_extended(XPRV_M, &Network::Testnet.prefixes(), Secp256kFun)
                .unwrap_err();
        assert!(matches!(err, HdError::NetworkMagicMismatch(_)));
    }

    #[test]
    fn test_testnet_prefixes() {
        let key = HierarchicalKey::from_extended(XPRV_M, &bitcoin(), Secp256kFun).unwrap();
        let testnet = Network::Testnet.prefixes();

        let tprv = key.serialize(&testnet);
        let tpub = key.serialize_public(&testnet);
        assert!(tprv.starts_with("tprv"));
        assert!(tpub.starts_with("tpub"));

        assert_eq!(
            HierarchicalKey::from_extended(&tprv, &testnet, Secp256kFun).unwrap(),
            key
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut chars: Vec<char> = XPUB_M.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '9' { '8' } else { '9' };
        let corrupted: String = chars.into_iter().collect();

        let err = HierarchicalKey::from_extended(&corrupted, &bitcoin(), Secp256kFun).unwrap_err();
        assert_eq!(err, HdError::ChecksumMismatch);
    }

    #[test]
    fn test_invalid_length() {
        // a WIF private key: valid base58check, 34-byte payload
        let wif = "KyQZJyRyxqNBc31iWzZjUf1vDMXpbcUzwND6AANq44M3v38smDkA";
        let err = HierarchicalKey::from_extended(wif, &bitcoin(), Secp256kFun).unwrap_err();
        assert_eq!(err, HdError::InvalidSerializedLength(34));

        let long = reencode(XPUB_M, |p| p.push(0));
        let err = HierarchicalKey::from_extended(&long, &bitcoin(), Secp256kFun).unwrap_err();
        assert_eq!(err, HdError::InvalidSerializedLength(79));
    }

    #[test]
    fn test_invalid_base58() {
        let err = HierarchicalKey::from_extended("xpub0OIl", &bitcoin(), Secp256kFun).unwrap_err();
        assert!(matches!(err, HdError::InvalidEncoding(_)));
    }

    #[test]
    fn test_out_of_range_private_scalar() {
        let zero = reencode(XPRV_M, |p| p[46..78].fill(0));
        let err = HierarchicalKey::from_extended(&zero, &bitcoin(), Secp256kFun).unwrap_err();
        assert!(matches!(err, HdError::InvalidScalarOrPoint(_)));

        let too_big = reencode(XPRV_M, |p| p[46..78].fill(0xff));
        let err = HierarchicalKey::from_extended(&too_big, &bitcoin(), Secp256kFun).unwrap_err();
        assert!(matches!(err, HdError::InvalidScalarOrPoint(_)));
    }

    #[test]
    fn test_off_curve_public_point() {
        // x = 5 has no point on secp256k1
        let off_curve = reencode(XPUB_M, |p| {
            p[46..78].fill(0);
            p[77] = 5;
        });
        let err = HierarchicalKey::from_extended(&off_curve, &bitcoin(), Secp256kFun).unwrap_err();
        assert!(matches!(err, HdError::InvalidScalarOrPoint(_)));
    }

    #[test]
    fn test_key_data_must_match_version() {
        // public key data under the private version
        let mixed = reencode(XPUB_M, |p| p[0..4].copy_from_slice(&[0x04, 0x88, 0xad, 0xe4]));
        let err = HierarchicalKey::from_extended(&mixed, &bitcoin(), Secp256kFun).unwrap_err();
        assert!(matches!(err, HdError::InvalidScalarOrPoint(_)));

        // private key data under the public version
        let mixed = reencode(XPRV_M, |p| p[0..4].copy_from_slice(&[0x04, 0x88, 0xb2, 0x1e]));
        let err = HierarchicalKey::from_extended(&mixed, &bitcoin(), Secp256kFun).unwrap_err();
        assert!(matches!(err, HdError::InvalidScalarOrPoint(_)));
    }

    #[test]
    fn test_root_with_parent_rejected() {
        let bad = reencode(XPUB_M, |p| p[5..9].copy_from_slice(&[0, 0, 0, 1]));
        let err = HierarchicalKey::from_extended(&bad, &bitcoin(), Secp256kFun).unwrap_err();
        assert_eq!(err, HdError::InvalidRootKey);

        let bad = reencode(XPUB_M, |p| p[9..13].copy_from_slice(&[0, 0, 0, 1]));
        let err = HierarchicalKey::from_extended(&bad, &bitcoin(), Secp256kFun).unwrap_err();
        assert_eq!(err, HdError::InvalidRootKey);
    }

    #[test]
    fn test_payload_layout() {
        let key = HierarchicalKey::from_extended(XPUB_DEPTH_2, &bitcoin(), Secp256kFun).unwrap();
        let text = key.serialize(&bitcoin());
        let raw = bitcoin::base58::decode(&text).unwrap();

        assert_eq!(raw.len(), EXTENDED_KEY_LEN + 4);
        assert_eq!(&raw[0..4], &[0x04, 0x88, 0xb2, 0x1e]);
        assert_eq!(raw[4], 2);
        assert_eq!(&raw[5..9], &[0x61, 0x59, 0x14, 0xf3]);
        assert_eq!(&raw[9..13], &[0, 0, 0, 0]);
        assert_eq!(&raw[45..78], &key.public_point());
        assert_eq!(raw[78..], checksum(&raw[..78]));
    }
}
