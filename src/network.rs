//! Network Serialization Prefixes
//!
//! Extended keys start with four version bytes that select both the network
//! and whether the payload carries a private or public key. This module is
//! the registry of those prefixes.
//!
//! Every serialization API takes a [`NetworkPrefixes`] explicitly. For
//! binaries that want a process-wide default, [`set_default`] may be called
//! once during start-up; [`default_network`] falls back to Bitcoin mainnet
//! when it never was.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::{HdError, Result};

/// HD version bytes for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkPrefixes {
    /// Version bytes of extended private keys (`xprv` on mainnet).
    #[serde(with = "hex_version")]
    hd_private_version: [u8; 4],
    /// Version bytes of extended public keys (`xpub` on mainnet).
    #[serde(with = "hex_version")]
    hd_public_version: [u8; 4],
}

impl NetworkPrefixes {
    /// Bitcoin mainnet: `xprv` / `xpub`.
    pub const BITCOIN: Self = Self {
        hd_private_version: [0x04, 0x88, 0xad, 0xe4],
        hd_public_version: [0x04, 0x88, 0xb2, 0x1e],
    };

    /// Bitcoin testnet, signet and regtest: `tprv` / `tpub`.
    pub const TESTNET: Self = Self {
        hd_private_version: [0x04, 0x35, 0x83, 0x94],
        hd_public_version: [0x04, 0x35, 0x87, 0xcf],
    };

    /// Starts building a custom network.
    pub fn builder() -> NetworkPrefixesBuilder {
        NetworkPrefixesBuilder::default()
    }

    /// Version bytes for private extended keys.
    pub const fn hd_private_version(&self) -> [u8; 4] {
        self.hd_private_version
    }

    /// Version bytes for public extended keys.
    pub const fn hd_public_version(&self) -> [u8; 4] {
        self.hd_public_version
    }

    /// Version bytes for the requested key kind.
    pub const fn version(&self, private: bool) -> [u8; 4] {
        if private {
            self.hd_private_version
        } else {
            self.hd_public_version
        }
    }

    /// Classifies version bytes read from a serialized key.
    ///
    /// Returns `Some(true)` for the private version, `Some(false)` for the
    /// public one and `None` if they belong to neither.
    pub fn classify(&self, version: [u8; 4]) -> Option<bool> {
        if version == self.hd_private_version {
            Some(true)
        } else if version == self.hd_public_version {
            Some(false)
        } else {
            None
        }
    }
}

impl Default for NetworkPrefixes {
    fn default() -> Self {
        Self::BITCOIN
    }
}

/// Builder for [`NetworkPrefixes`]. Both versions are mandatory.
#[derive(Debug, Clone, Default)]
pub struct NetworkPrefixesBuilder {
    hd_private_version: Option<[u8; 4]>,
    hd_public_version: Option<[u8; 4]>,
}

impl NetworkPrefixesBuilder {
    /// Sets the private key version bytes.
    pub fn hd_private_version(mut self, version: [u8; 4]) -> Self {
        self.hd_private_version = Some(version);
        self
    }

    /// Sets the public key version bytes.
    pub fn hd_public_version(mut self, version: [u8; 4]) -> Self {
        self.hd_public_version = Some(version);
        self
    }

    /// Finishes the network.
    ///
    /// # Errors
    /// `IncompleteNetwork` if either version was never set.
    pub fn build(self) -> Result<NetworkPrefixes> {
        Ok(NetworkPrefixes {
            hd_private_version: self
                .hd_private_version
                .ok_or(HdError::IncompleteNetwork("private"))?,
            hd_public_version: self
                .hd_public_version
                .ok_or(HdError::IncompleteNetwork("public"))?,
        })
    }
}

/// Networks with built-in prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Bitcoin mainnet.
    Bitcoin,
    /// Bitcoin testnet (also used for signet and regtest).
    Testnet,
}

impl Network {
    /// The HD prefixes of this network.
    pub const fn prefixes(&self) -> NetworkPrefixes {
        match self {
            Network::Bitcoin => NetworkPrefixes::BITCOIN,
            Network::Testnet => NetworkPrefixes::TESTNET,
        }
    }
}

impl From<Network> for NetworkPrefixes {
    fn from(network: Network) -> Self {
        network.prefixes()
    }
}

impl FromStr for Network {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" | "main" => Ok(Network::Bitcoin),
            "testnet" | "test" | "signet" | "regtest" => Ok(Network::Testnet),
            _ => Err(HdError::UnknownNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Bitcoin => f.write_str("bitcoin"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

static DEFAULT_NETWORK: OnceLock<NetworkPrefixes> = OnceLock::new();

/// Sets the process-wide default network. May only succeed once.
///
/// # Errors
/// `DefaultNetworkAlreadySet` on any call after the first.
pub fn set_default(prefixes: NetworkPrefixes) -> Result<()> {
    DEFAULT_NETWORK
        .set(prefixes)
        .map_err(|_| HdError::DefaultNetworkAlreadySet)
}

/// The process-wide default network, or Bitcoin mainnet if none was set.
pub fn default_network() -> NetworkPrefixes {
    DEFAULT_NETWORK.get().copied().unwrap_or_default()
}

mod hex_version {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 4], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 4 bytes"))
    }
}
