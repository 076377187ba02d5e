//! # Object Hashes
//!
//! Typed identifier for stored objects: a 40-character lowercase hex SHA-1
//! digest. The two-character prefix names the fan-out directory under
//! `objects/`, the remaining 38 characters name the file.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A lowercase hexadecimal SHA-1 digest (40 characters)
///
/// Equality is string equality. Uppercase input is normalized to lowercase
/// on the way in; the stored form is always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash(String);

impl Hash {
    /// Parse from a 40-char hex string
    ///
    /// Fails with [`Error::InvalidHash`] when the length is not 40 or any
    /// character is not a hex digit.
    pub fn from_hex(value: &str) -> Result<Self> {
        let v = value.trim().to_ascii_lowercase();
        if v.len() != 40 || !v.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(Error::InvalidHash(value.to_string()));
        }
        Ok(Self(v))
    }

    /// Build from a raw digest by hex-encoding it
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// The full 40-char hex form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First two hex chars (the object fan-out directory)
    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }

    /// Remaining 38 hex chars (the object file name)
    pub fn suffix(&self) -> &str {
        &self.0[2..]
    }

    /// Short form of at most `n` leading chars
    pub fn short(&self, n: usize) -> &str {
        if n == 0 || n >= self.0.len() {
            return &self.0;
        }
        &self.0[..n]
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Hash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Hash::from_hex(&value)
    }
}

impl From<Hash> for String {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "d670460b4b4aece5915caf5c68d12f560a9fe3e4";

    #[test]
    fn test_parse_valid() {
        let hash = Hash::from_hex(SAMPLE).unwrap();
        assert_eq!(hash.as_str(), SAMPLE);
        assert_eq!(hash.prefix(), "d6");
        assert_eq!(hash.suffix(), &SAMPLE[2..]);
    }

    #[test]
    fn test_uppercase_is_normalized() {
        let hash = Hash::from_hex(&SAMPLE.to_uppercase()).unwrap();
        assert_eq!(hash.as_str(), SAMPLE);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(Hash::from_hex(""), Err(Error::InvalidHash(_))));
        assert!(matches!(Hash::from_hex("abc"), Err(Error::InvalidHash(_))));
        // right length, non-hex character
        let bad = format!("g{}", &SAMPLE[1..]);
        assert!(matches!(Hash::from_hex(&bad), Err(Error::InvalidHash(_))));
    }

    #[test]
    fn test_short_form() {
        let hash = Hash::from_hex(SAMPLE).unwrap();
        assert_eq!(hash.short(7), "d670460");
        assert_eq!(hash.short(0), SAMPLE);
        assert_eq!(hash.short(80), SAMPLE);
    }

    #[test]
    fn test_equality_is_string_equality() {
        let a = Hash::from_hex(SAMPLE).unwrap();
        let b = Hash::from_hex(&SAMPLE.to_uppercase()).unwrap();
        assert_eq!(a, b);
    }
}
