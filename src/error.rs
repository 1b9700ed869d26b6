//! Error type shared by every fallible operation in the crate.

/// Errors produced while parsing paths, building, deriving or (de)serializing
/// hierarchical keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HdError {
    /// The derivation path string does not follow the `m/0'/1/2'` grammar.
    #[error("invalid derivation path: {0}")]
    InvalidPathSyntax(String),

    /// Hardening an index that already has the hardened bit set.
    #[error("index {0} is already hardened and cannot be hardened again")]
    IndexOverflow(u32),

    /// A hierarchical key must always be built from compressed EC keys.
    #[error("a hierarchical key must always be compressed")]
    UnsupportedUncompressedKey,

    /// Hardened children can only be derived from private nodes.
    #[error("hardened derivation at index {0} requires a private key")]
    HardenedDerivationRequiresPrivateKey(u32),

    /// The node only holds public key material.
    #[error("key holds no private material")]
    MissingPrivateMaterial,

    /// The version bytes of a serialized key belong to another network.
    #[error("HD key magic bytes {} do not match network magic bytes", hex::encode(.0))]
    NetworkMagicMismatch([u8; 4]),

    /// The decoded extended key payload is not 78 bytes long.
    #[error("invalid extended key length: expected 78 bytes, got {0}")]
    InvalidSerializedLength(usize),

    /// The base-58 checksum does not match the payload.
    #[error("extended key checksum mismatch")]
    ChecksumMismatch,

    /// A scalar was outside `(0, n)` or a point was invalid or at infinity.
    #[error("invalid scalar or point: {0}")]
    InvalidScalarOrPoint(&'static str),

    /// The text is not valid base-58.
    #[error("invalid base58 encoding: {0}")]
    InvalidEncoding(String),

    /// The mnemonic phrase failed BIP-39 validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// A network configuration is missing one of its HD version prefixes.
    #[error("network is missing its {0} HD version bytes")]
    IncompleteNetwork(&'static str),

    /// No registered network has this name.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// A node at depth 255 has no room for further children.
    #[error("maximum derivation depth reached")]
    DepthOverflow,

    /// A depth-0 key carried a parent fingerprint or child index.
    #[error("root key must have zero parent fingerprint and child index")]
    InvalidRootKey,

    /// The process-wide default network was already initialized.
    #[error("default network has already been set")]
    DefaultNetworkAlreadySet,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = HdError> = std::result::Result<T, E>;
