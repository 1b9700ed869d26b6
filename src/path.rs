//! Derivation Path Grammar
//!
//! Paths are `/`-separated lists of child indices, optionally rooted at `m`:
//!
//! ```text
//! m/44'/0'/0'/0/5
//! 0'/1'/444/42382'
//! ```
//!
//! Each segment is a decimal integer below `2^31`. A trailing `'` (or `h` /
//! `H`) marks the index as hardened, which sets the high bit.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{HdError, Result};

/// Offset added to an index to make it hardened (`2^31`).
pub const HARDENED_OFFSET: u32 = 1 << 31;

/// Returns `true` if the index has its hardened bit set.
pub const fn is_hardened(index: u32) -> bool {
    index >= HARDENED_OFFSET
}

/// Returns the hardened form of `index`.
///
/// # Errors
/// `IndexOverflow` if `index` is already hardened; hardening twice would
/// overflow the 32-bit index space.
pub fn harden(index: u32) -> Result<u32> {
    if is_hardened(index) {
        return Err(HdError::IndexOverflow(index));
    }
    Ok(index + HARDENED_OFFSET)
}

/// Decodes a path string into its ordered list of indices.
///
/// # Errors
/// `InvalidPathSyntax` for an empty string, an empty or non-numeric segment,
/// or an index of `2^31` or more before hardening.
pub fn decode(path: &str) -> Result<Vec<u32>> {
    if path.is_empty() {
        return Err(HdError::InvalidPathSyntax("empty path".to_string()));
    }

    let mut segments = path.split('/').peekable();
    if segments.peek() == Some(&"m") {
        segments.next();
    }

    segments.map(decode_segment).collect()
}

fn decode_segment(segment: &str) -> Result<u32> {
    let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
        Some(digits) => (digits, true),
        None => (segment, false),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HdError::InvalidPathSyntax(format!(
            "segment {segment:?} is not a number"
        )));
    }

    let index: u32 = digits
        .parse()
        .ok()
        .filter(|index| !is_hardened(*index))
        .ok_or_else(|| {
            HdError::InvalidPathSyntax(format!("segment {segment:?} is out of range"))
        })?;

    if hardened {
        harden(index)
    } else {
        Ok(index)
    }
}

/// Renders indices as an `m/`-rooted path using `'` for hardened segments.
pub fn render(indices: &[u32]) -> String {
    let mut out = String::from("m");
    for &index in indices {
        if is_hardened(index) {
            out.push_str(&format!("/{}'", index - HARDENED_OFFSET));
        } else {
            out.push_str(&format!("/{index}"));
        }
    }
    out
}

/// An ordered sequence of child indices from a node down to a descendant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// The empty path, pointing at the node itself.
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path with `index` appended.
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Raw indices, hardened bit included.
    pub fn indices(&self) -> &[u32] {
        &self.0
    }
}

impl Deref for DerivationPath {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(indices: Vec<u32>) -> Self {
        Self(indices)
    }
}

impl FromStr for DerivationPath {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s).map(Self)
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = HdError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hardening_arithmetic() {
        assert_eq!(
            decode("0'/1'/444/42382'").unwrap(),
            vec![2147483648, 2147483649, 444, 2147526030]
        );
    }

    #[test]
    fn test_decode_with_root_prefix() {
        assert_eq!(
            decode("m/44'/0'/0'/0/0").unwrap(),
            vec![
                44 + HARDENED_OFFSET,
                HARDENED_OFFSET,
                HARDENED_OFFSET,
                0,
                0
            ]
        );
        assert_eq!(decode("m").unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_decode_alternate_hardened_markers() {
        assert_eq!(decode("1h/2H").unwrap(), decode("1'/2'").unwrap());
    }

    #[test]
    fn test_decode_failures() {
        for bad in [
            "",
            "m/",
            "0//1",
            "a",
            "m/x'",
            "'",
            "-1",
            "+1",
            " 1",
            "1''",
            "2147483648",
            "2147483648'",
            "99999999999",
            "0/m",
        ] {
            let err = decode(bad).unwrap_err();
            assert!(
                matches!(err, HdError::InvalidPathSyntax(_)),
                "{bad:?} should fail with InvalidPathSyntax, got {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_max_index() {
        assert_eq!(decode("2147483647").unwrap(), vec![HARDENED_OFFSET - 1]);
        assert_eq!(decode("2147483647'").unwrap(), vec![u32::MAX]);
    }

    #[test]
    fn test_double_hardening_fails() {
        let once = harden(0).unwrap();
        assert_eq!(once, HARDENED_OFFSET);
        assert_eq!(harden(once), Err(HdError::IndexOverflow(HARDENED_OFFSET)));
    }

    #[test]
    fn test_render_roundtrip() {
        let text = "m/44'/0'/0'/1/7";
        let path: DerivationPath = text.parse().unwrap();
        assert_eq!(path.to_string(), text);
        assert_eq!(render(&[]), "m");
    }

    #[test]
    fn test_child_appends() {
        let path = DerivationPath::root().child(harden(44).unwrap()).child(3);
        assert_eq!(path.to_string(), "m/44'/3");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_path_serde_as_string() {
        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"m/0'/1\"");

        let parsed: DerivationPath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
        assert!(serde_json::from_str::<DerivationPath>("\"m/x\"").is_err());
    }
}
