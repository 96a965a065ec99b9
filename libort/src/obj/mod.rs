//! Object model: file modes, tree objects, and the small amount of commit
//! machinery the recursive driver (C7) needs to fabricate virtual ancestors.
//!
//! Blob content itself is opaque to this crate - §1 puts the object store and
//! the textual three-way blob merge out of scope, so we only ever carry a
//! [`hash::Oid`] for file content, never bytes.

mod commit;
mod tree;

pub use commit::Commit;
pub use tree::{Tree, TreeEntry};

use crate::hash::Oid;
use num_enum::TryFromPrimitive;
use std::convert::TryFrom;
use std::fmt::{self, Debug, Display, Formatter};

/// The type tag `parse_tree`/`write_object` (§6) attaches to raw object
/// bytes. Only `Tree` is ever produced by this crate; `Commit` exists for the
/// virtual ancestors C7 fabricates in memory and need not round-trip through
/// the store at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Tree,
    Commit,
    Blob,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Tree => write!(f, "tree"),
            ObjectKind::Commit => write!(f, "commit"),
            ObjectKind::Blob => write!(f, "blob"),
        }
    }
}

/// Forwards `oid`/`kind` across an enum of object wrappers - see
/// `ort_derive::StoreObject`.
pub trait StoreObject {
    fn oid(&self) -> Oid;
    fn kind(&self) -> ObjectKind;
}

/// A tree entry or a thin wrapper around one after it's been written: the
/// object id and the type/permission bits, §3's `Version`.
///
/// The ordering of variants matters: `#[derive(Ord)]` compares in
/// declaration order, and C5's bottom-up writer relies on `TREE` sorting
/// after every "file" variant so the D/F-aware path comparator is the only
/// place directory-vs-file ordering gets decided.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, TryFromPrimitive)]
#[repr(u32)]
pub enum FileMode {
    Reg = 0o100644,
    Exec = 0o100755,
    Link = 0o120000,
    Tree = 0o040000,
    Gitlink = 0o160000,
}

impl FileMode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn new(mode: u32) -> Self {
        Self::try_from(mode).unwrap_or_else(|_| panic!("invalid file mode `{:06o}`", mode))
    }

    pub fn is_tree(self) -> bool {
        matches!(self, FileMode::Tree)
    }

    pub fn is_file(self) -> bool {
        matches!(self, FileMode::Reg | FileMode::Exec)
    }

    pub fn is_link(self) -> bool {
        matches!(self, FileMode::Link)
    }

    /// `S_IFMT`-equivalent coarse type, used by C4's type-change detection
    /// (`filemask >= 6 && S_IFMT(side1) != S_IFMT(side2)`).
    pub fn type_tag(self) -> u8 {
        match self {
            FileMode::Reg | FileMode::Exec => 0,
            FileMode::Link => 1,
            FileMode::Tree => 2,
            FileMode::Gitlink => 3,
        }
    }

    pub fn kind(self) -> ObjectKind {
        if self.is_tree() { ObjectKind::Tree } else { ObjectKind::Blob }
    }
}

impl Display for FileMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let n = self.as_u32();
        if f.alternate() { write!(f, "{:o}", n) } else { write!(f, "{:06o}", n) }
    }
}

impl Debug for FileMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// `{ oid, mode }` from §3. The null oid combined with any mode means "no
/// entry on this side" - callers check `is_null()` on the oid, not the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub oid: Oid,
    pub mode: FileMode,
}

impl Version {
    pub fn new(oid: Oid, mode: FileMode) -> Self {
        Self { oid, mode }
    }

    pub fn null(algo: crate::hash::HashAlgo) -> Self {
        Self { oid: Oid::null(algo), mode: FileMode::Reg }
    }

    pub fn is_null(self) -> bool {
        self.oid.is_null()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.oid)
    }
}
