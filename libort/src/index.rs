//! Index reconciliation, C6: after the caller has checked out the merged
//! tree, rewrite the index so conflicted paths carry their stage 1/2/3
//! entries instead of (or alongside) a stage-0 entry.
//!
//! The real index format (`DIRC`, extensions, the rest of
//! Documentation/technical/index-format.txt) is the caller's concern - §1
//! puts "the index/working-copy updater" out of scope. What's specified here
//! is just the reconciliation step itself, so [`Index`] is the minimum
//! surface C6 needs: an ordered map keyed by `(path, stage)`.

use crate::merge::path_table::ConflictedSet;
use crate::obj::Version;
use crate::path::OrtPath;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Stage number for an index entry - 0 means resolved/clean, 1/2/3 mean
/// base/ours/theirs, per the glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MergeStage {
    None = 0,
    Stage1 = 1,
    Stage2 = 2,
    Stage3 = 3,
}

impl MergeStage {
    pub fn is_merging(self) -> bool {
        self != MergeStage::None
    }

    /// `filemask` bit `i` (0 = base, 1 = side1, 2 = side2) maps onto stage
    /// `i + 1`.
    pub fn from_side(side: usize) -> Self {
        match side {
            0 => MergeStage::Stage1,
            1 => MergeStage::Stage2,
            2 => MergeStage::Stage3,
            _ => unreachable!("side index out of range: {side}"),
        }
    }
}

impl Default for MergeStage {
    fn default() -> Self {
        MergeStage::None
    }
}

impl Display for MergeStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: OrtPath,
    pub stage: MergeStage,
    pub version: Version,
}

/// Ordered by `(path, stage)`, matching the cache-name comparator the real
/// index sorts by (§4.6 step 3).
#[derive(Debug, Default, Clone)]
pub struct Index {
    entries: BTreeMap<(OrtPath, MergeStage), IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: IndexEntry) {
        self.entries.insert((entry.path, entry.stage), entry);
    }

    pub fn find(&self, path: OrtPath, stage: MergeStage) -> Option<&IndexEntry> {
        self.entries.get(&(path, stage))
    }

    pub fn remove(&mut self, path: OrtPath, stage: MergeStage) -> Option<IndexEntry> {
        self.entries.remove(&(path, stage))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries.keys().any(|(_, stage)| stage.is_merging())
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// C6: re-insert stage 1/2/3 entries for every path still in the
    /// conflicted set, after the caller's checkout has landed the merged
    /// tree. `original_len` bounds the binary search in step 1 to the
    /// entries that existed before this call started appending unsorted
    /// stage entries (§4.6: "restricted to the original index length").
    pub fn reconcile(&mut self, conflicted: &ConflictedSet) {
        let original_len = self.entries.len();
        let stage0_keys: Vec<_> =
            self.entries.keys().take(original_len).filter(|(_, s)| *s == MergeStage::None).cloned().collect();

        let mut to_remove = Vec::new();
        for path in conflicted.paths() {
            let entry = conflicted.entry(path).expect("conflicted set entry vanished");

            if let Some(key) = stage0_keys.iter().find(|(p, _)| *p == path) {
                to_remove.push(*key);
            } else {
                debug_assert_eq!(
                    entry.filemask, 1,
                    "path missing from original index without being deleted on both sides"
                );
            }

            for side in 0..3 {
                if entry.filemask & (1 << side) != 0 {
                    self.insert(IndexEntry {
                        path,
                        stage: MergeStage::from_side(side),
                        version: entry.stages[side],
                    });
                }
            }
        }

        for key in to_remove {
            self.entries.remove(&key);
        }
        // BTreeMap is already kept sorted by `(path, stage)` on every insert,
        // so there's nothing left to do for step 3 - unlike a flat vector,
        // there's no unsorted tail to re-sort.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgo;
    use crate::merge::path_table::{Conflicted, ConflictedSet};
    use crate::obj::FileMode;

    fn version(byte: u8) -> Version {
        Version::new(HashAlgo::Sha1.hash([byte]), FileMode::Reg)
    }

    #[test]
    fn reconcile_replaces_stage0_with_stage_entries() {
        let mut index = Index::new();
        let path = OrtPath::intern("a");
        index.insert(IndexEntry { path, stage: MergeStage::None, version: version(0) });

        let mut conflicted = ConflictedSet::default();
        conflicted.insert(path, Conflicted::new(path, [version(0), version(1), version(2)], 0b011, 0, 0));

        index.reconcile(&conflicted);

        assert!(index.find(path, MergeStage::None).is_none());
        assert_eq!(index.find(path, MergeStage::Stage1).unwrap().version, version(0));
        assert_eq!(index.find(path, MergeStage::Stage2).unwrap().version, version(1));
        assert!(index.find(path, MergeStage::Stage3).is_none());
    }
}
