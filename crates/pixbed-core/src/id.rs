//! Asset identifiers
//!
//! An `AssetId` is the unique, URL-safe token naming an asset; it doubles as
//! the public URL segment and as the storage file stem. 21 characters over a
//! 64-symbol alphabet gives 126 bits of entropy, enough that collisions
//! across millions of assets are negligible. Generation draws from the
//! OS-seeded thread RNG; an unavailable entropy source panics at first use,
//! which is a fatal startup condition rather than a per-request error.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

/// Length of every asset identifier.
pub const ASSET_ID_LEN: usize = 21;

/// URL-safe alphabet (64 symbols, so each character carries 6 bits).
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz-";

/// Unique, URL-safe identifier of a stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token: String = (0..ASSET_ID_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        AssetId(token)
    }

    /// Parse an identifier received from the outside (path parameter).
    /// Rejects anything that is not exactly [`ASSET_ID_LEN`] characters from
    /// the identifier alphabet, so a parsed id can never escape the upload
    /// root when used as a file stem.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        if s.len() != ASSET_ID_LEN || !s.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(AppError::InvalidInput(format!(
                "Invalid asset identifier: {}",
                s
            )));
        }
        Ok(AssetId(s.to_string()))
    }

    /// Wrap an identifier read back from the metadata store.
    /// The store only ever contains values produced by [`AssetId::generate`].
    pub fn from_storage(s: String) -> Self {
        AssetId(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_id_shape() {
        let id = AssetId::generate();
        assert_eq!(id.as_str().len(), ASSET_ID_LEN);
        assert!(id.as_str().bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = AssetId::generate();
        let parsed = AssetId::parse(id.as_str()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(AssetId::parse("").is_err());
        assert!(AssetId::parse("short").is_err());
        assert!(AssetId::parse("../../../../etc/passwd").is_err());
        assert!(AssetId::parse("abcdefghijklmnopqrst/").is_err());
        assert!(AssetId::parse("abcdefghijklmnopqrst.").is_err());
        // 22 chars, one too many
        assert!(AssetId::parse("0123456789abcdefghijkl").is_err());
    }

    #[test]
    fn test_no_collisions_over_a_million_ids() {
        // Collision probability over 10^6 draws from a 2^126 space is
        // statistically indistinguishable from zero; any collision here is a
        // generator bug.
        let mut seen: HashSet<[u8; ASSET_ID_LEN]> = HashSet::with_capacity(1_000_000);
        for _ in 0..1_000_000 {
            let id = AssetId::generate();
            let mut key = [0u8; ASSET_ID_LEN];
            key.copy_from_slice(id.as_str().as_bytes());
            assert!(seen.insert(key), "identifier collision: {}", id);
        }
    }
}
