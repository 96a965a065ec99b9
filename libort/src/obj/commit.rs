use super::{ObjectKind, StoreObject};
use crate::hash::Oid;
use crate::signature::Signature;
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// A commit, used in this crate only for the virtual ancestors C7 fabricates
/// when there's more than one merge base (§4.7). Real commits belong to the
/// caller's object store; this type never claims to round-trip through one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Oid,
    pub parents: SmallVec<[Oid; 2]>,
    pub author: Signature,
    pub message: String,
}

impl Commit {
    pub fn virtual_merge_base(tree: Oid, parents: impl IntoIterator<Item = Oid>) -> Self {
        Self {
            tree,
            parents: parents.into_iter().collect(),
            author: Signature::virtual_merge_base(),
            message: "virtual merge base".to_owned(),
        }
    }

    /// The driver's starting point when there is no merge base at all (§4.7
    /// step 2): an empty tree with no parents.
    pub fn empty_tree(algo: crate::hash::HashAlgo) -> Self {
        Self {
            tree: algo.empty_tree_oid(),
            parents: SmallVec::new(),
            author: Signature::virtual_merge_base(),
            message: "empty tree".to_owned(),
        }
    }
}

impl StoreObject for Commit {
    /// Virtual commits are never hashed or written - this is the tree oid,
    /// standing in as a stable identity for logging/debugging only.
    fn oid(&self) -> Oid {
        self.tree
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Commit
    }
}

impl Display for Commit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "tree {}", self.tree)?;
        for parent in &self.parents {
            writeln!(f, "parent {}", parent)?;
        }
        writeln!(f, "author {}", self.author)?;
        writeln!(f)?;
        write!(f, "{}", self.message)
    }
}
