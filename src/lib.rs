//! # hdkeytree
//!
//! BIP-32 hierarchical deterministic keys: build a master node from a seed
//! or mnemonic, derive an unbounded tree of child keys from it, and move
//! nodes in and out of the base58check `xprv` / `xpub` text form.
//!
//! ```ignore
//! use hdkeytree::{HierarchicalKey, NetworkPrefixes, Secp256kFun};
//!
//! let master = HierarchicalKey::from_seed(&seed, Secp256kFun)?;
//! let leaf = master.derive_path("m/44'/0'/0'/0/0")?;
//! println!("{}", leaf.serialize_public(&NetworkPrefixes::BITCOIN));
//! ```
//!
//! The elliptic-curve arithmetic is supplied by a [`CurveAdapter`]. Two
//! backends ship with the crate: [`Secp256kFun`] (default) and
//! [`LibSecp256k1`]. Both yield identical trees.

pub mod crypto;
pub mod curve;
pub mod error;
pub mod logging;
pub mod network;
pub mod path;

pub use crypto::hd::HierarchicalKey;
pub use crypto::key::{KeyMaterial, PrivateKey, PublicKey};
pub use curve::{CurveAdapter, LibSecp256k1, Secp256kFun};
pub use error::{HdError, Result};
pub use network::{Network, NetworkPrefixes};
pub use path::DerivationPath;
