//! Object identifiers.
//!
//! §3 of the design calls the engine "parametric in the hash size (either 20
//! or 32 bytes)" - it must not assume SHA-1. We model that with a fixed
//! 32-byte backing array plus a length discriminator rather than generic
//! code over a const, which would infect every public signature in the
//! crate for no real benefit: nothing downstream cares about the hash size
//! except equality/display/the null-id check.

use crate::error::OrtGenericError;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Which hash function produced an [`Oid`]. Exposed to callers via
/// [`HashAlgo::raw_size`] / [`HashAlgo::empty_tree_oid`], mirroring the
/// `hash_algo()` object-store operation from §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgo {
    Sha1,
    Sha256,
}

impl HashAlgo {
    pub fn raw_size(self) -> usize {
        match self {
            HashAlgo::Sha1 => 20,
            HashAlgo::Sha256 => 32,
        }
    }

    /// The oid of the canonical empty tree under this algorithm (an empty
    /// tree object, not the null id - it's a real, hashable, empty byte
    /// sequence).
    pub fn empty_tree_oid(self) -> Oid {
        match self {
            HashAlgo::Sha1 => Oid::from_hex_unchecked(
                HashAlgo::Sha1,
                "4b825dc642cb6eb9a060e54bf8d69288fbee4904",
            ),
            HashAlgo::Sha256 => Oid::from_hex_unchecked(
                HashAlgo::Sha256,
                "6ef19b41225c5369f1c104d45d8d85efa9b057b53b14b4b9b939dd74decc5321",
            ),
        }
    }

    pub fn hash(self, bytes: impl AsRef<[u8]>) -> Oid {
        match self {
            HashAlgo::Sha1 => {
                use sha1::{Digest, Sha1};
                let mut hasher = Sha1::new();
                hasher.update(bytes);
                Oid::new(HashAlgo::Sha1, &hasher.finalize())
            }
            HashAlgo::Sha256 => {
                use sha2::{Digest, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                Oid::new(HashAlgo::Sha256, &hasher.finalize())
            }
        }
    }
}

/// A fixed-width object id. The "null id" (all-zero bytes) is the sentinel
/// used throughout the merge engine for "no entry on this side".
#[derive(Clone, Copy)]
pub struct Oid {
    algo: HashAlgo,
    bytes: [u8; 32],
}

impl Oid {
    pub fn new(algo: HashAlgo, raw: &[u8]) -> Self {
        debug_assert_eq!(raw.len(), algo.raw_size());
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        Self { algo, bytes }
    }

    /// The all-zero sentinel: "no entry on this side".
    pub fn null(algo: HashAlgo) -> Self {
        Self { algo, bytes: [0; 32] }
    }

    pub fn is_null(self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }

    pub fn algo(self) -> HashAlgo {
        self.algo
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.algo.raw_size()]
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.as_bytes())
    }

    pub fn short(self) -> String {
        self.to_hex()[..7.min(self.algo.raw_size() * 2)].to_owned()
    }

    fn from_hex_unchecked(algo: HashAlgo, s: &str) -> Self {
        let raw = hex::decode(s).expect("literal hex oid");
        Self::new(algo, &raw)
    }

    pub fn from_hex(algo: HashAlgo, s: &str) -> Result<Self, OrtGenericError> {
        let raw = hex::decode(s)?;
        ensure!(
            raw.len() == algo.raw_size(),
            "oid `{}` has {} bytes, expected {} for {:?}",
            s,
            raw.len(),
            algo.raw_size(),
            algo
        );
        Ok(Self::new(algo, &raw))
    }
}

impl PartialEq for Oid {
    fn eq(&self, other: &Self) -> bool {
        self.algo == other.algo && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Oid {
}

impl Hash for Oid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state)
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() { write!(f, "{}", self.short()) } else { write!(f, "{}", self.to_hex()) }
    }
}

/// Convenience for tests: parse as SHA-1, the default algorithm for fixtures.
#[cfg(test)]
impl FromStr for Oid {
    type Err = OrtGenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(HashAlgo::Sha1, s)
    }
}

/// Always generates a SHA-1-sized id, same as teacher's `SHA1Hash` arbitrary
/// impl - the property tests that use this only care about distinctness and
/// null-ness, not hash-size parametrism.
#[cfg(test)]
impl quickcheck::Arbitrary for Oid {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let bytes: Vec<u8> = (0..HashAlgo::Sha1.raw_size()).map(|_| u8::arbitrary(g)).collect();
        Oid::new(HashAlgo::Sha1, &bytes)
    }
}
