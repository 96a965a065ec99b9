//! A minimal disk-backed [`ObjectStore`]. §1 puts the real object store
//! (loose + packed objects, zlib, the rest of `.git/objects`) out of the
//! merge core's scope - this is just enough of one to give the CLI
//! something to read trees from and write them to: one file per object,
//! named by hex oid, holding the exact `%o %s\0oid` bytes §6 specifies.
//! There is no compression and no packfiles; a real driver would swap this
//! out for its repository's actual odb without libort knowing the
//! difference.

use anyhow::Context;
use libort::error::OrtResult;
use libort::hash::{HashAlgo, Oid};
use libort::obj::Tree;
use libort::serialize::Serialize;
use libort::store::ObjectStore;
use std::fs;
use std::path::PathBuf;

pub struct DirObjectStore {
    root: PathBuf,
    algo: HashAlgo,
}

impl DirObjectStore {
    pub fn open(root: impl Into<PathBuf>, algo: HashAlgo) -> OrtResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).with_context(|| format!("failed to create object directory `{}`", root.display()))?;
        Ok(Self { root, algo })
    }

    fn object_path(&self, oid: Oid) -> PathBuf {
        self.root.join(oid.to_hex())
    }
}

impl ObjectStore for DirObjectStore {
    fn hash_algo(&self) -> HashAlgo {
        self.algo
    }

    fn parse_tree(&self, oid: Oid) -> OrtResult<Tree> {
        if oid == self.algo.empty_tree_oid() {
            return Ok(Tree::empty());
        }
        let path = self.object_path(oid);
        let bytes = fs::read(&path).with_context(|| format!("failed to read tree object `{}`", path.display()))?;
        Tree::deserialize(&mut bytes.as_slice(), self.algo)
    }

    fn write_tree(&self, tree: &Tree) -> OrtResult<Oid> {
        if tree.is_empty() {
            return Ok(self.algo.empty_tree_oid());
        }

        let mut bytes = vec![];
        tree.serialize(&mut bytes)?;
        let oid = self.algo.hash(&bytes);
        let path = self.object_path(oid);
        if !path.exists() {
            fs::write(&path, &bytes).with_context(|| format!("failed to write tree object `{}`", path.display()))?;
        }
        Ok(oid)
    }
}

pub fn parse_oid(algo: HashAlgo, s: &str) -> OrtResult<Oid> {
    Oid::from_hex(algo, s).with_context(|| format!("`{s}` is not a valid object id"))
}
