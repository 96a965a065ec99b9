//! The object store handle from §6. This crate only ever reads trees
//! through [`ObjectStore::parse_tree`] and writes new ones through
//! [`ObjectStore::write_tree`] - the concrete storage (loose + packed files
//! on disk, a database, whatever) is entirely the caller's concern, matching
//! §1's "out of scope: the object store".

use crate::error::OrtResult;
use crate::hash::{HashAlgo, Oid};
use crate::obj::{ObjectKind, StoreObject, Tree};
use ort_derive::StoreObject;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// Required operations, per §6: parse an existing tree, write a new one, and
/// report which hash algorithm is in play (so the engine can produce the
/// right null id and empty-tree id without hardcoding SHA-1).
pub trait ObjectStore {
    fn hash_algo(&self) -> HashAlgo;

    fn parse_tree(&self, oid: Oid) -> OrtResult<Tree>;

    fn write_tree(&self, tree: &Tree) -> OrtResult<Oid>;
}

/// Wraps whatever [`ObjectStore::write_tree`] just produced, purely so C8
/// logging/debugging code has one type to match on instead of threading
/// `(Oid, ObjectKind)` pairs everywhere.
#[derive(Debug, Clone, StoreObject)]
pub enum Written {
    Tree(WrittenTree),
}

#[derive(Debug, Clone)]
pub struct WrittenTree {
    pub oid: Oid,
    pub tree: Tree,
}

impl StoreObject for WrittenTree {
    fn oid(&self) -> Oid {
        self.oid
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Tree
    }
}

/// A trivial in-process object store, used by this crate's own tests and
/// suitable as a reference implementation for callers that don't yet have a
/// real one wired up. Serializes every tree through the same `%o %s\0oid`
/// format real stores use (§6) so the hashing behaves identically.
pub struct MemoryStore {
    algo: HashAlgo,
    trees: RefCell<FxHashMap<Oid, Tree>>,
}

impl MemoryStore {
    pub fn new(algo: HashAlgo) -> Self {
        let mut trees = FxHashMap::default();
        trees.insert(algo.empty_tree_oid(), Tree::empty());
        Self { algo, trees: RefCell::new(trees) }
    }

    pub fn object_count(&self) -> usize {
        self.trees.borrow().len()
    }
}

impl ObjectStore for MemoryStore {
    fn hash_algo(&self) -> HashAlgo {
        self.algo
    }

    fn parse_tree(&self, oid: Oid) -> OrtResult<Tree> {
        self.trees
            .borrow()
            .get(&oid)
            .cloned()
            .ok_or_else(|| anyhow!("no such tree object: {}", oid))
    }

    fn write_tree(&self, tree: &Tree) -> OrtResult<Oid> {
        if tree.is_empty() {
            return Ok(self.algo.empty_tree_oid());
        }

        use crate::serialize::Serialize;
        let mut bytes = vec![];
        tree.serialize(&mut bytes)?;
        let oid = self.algo.hash(&bytes);
        self.trees.borrow_mut().insert(oid, tree.clone());
        Ok(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_then_parsing_round_trips() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let oid = store.write_tree(&Tree::empty())?;
        assert_eq!(oid, HashAlgo::Sha1.empty_tree_oid());
        assert_eq!(store.parse_tree(oid)?, Tree::empty());
        Ok(())
    }

    #[test]
    fn parsing_unknown_oid_errors() {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let bogus = HashAlgo::Sha1.hash(b"not a real tree");
        assert!(store.parse_tree(bogus).is_err());
    }
}
