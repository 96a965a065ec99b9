//! C1: the path table and its entries (§3, §4.1).
//!
//! A path entry starts life as [`Conflicted`] and may be "downgraded" to a
//! pure [`Merged`] view once resolution decides it's clean. Per §9's design
//! note ("prefer an explicit sum type with a converting constructor"), that
//! downgrade is modeled as replacing the [`PathEntry`] in the table outright
//! rather than flipping a `clean` bit and leaving the conflict fields
//! dangling - there is no way to read stale conflict data after the
//! transition because the variant holding it is simply gone.

use crate::obj::Version;
use crate::path::OrtPath;
use rustc_hash::FxHashMap;

/// The clean half of a path entry: what ends up in the result tree.
/// `is_null` means "omit this path from the result tree" (it was deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merged {
    pub result: Version,
    pub is_null: bool,
}

impl Merged {
    pub fn new(result: Version) -> Self {
        Self { is_null: result.is_null(), result }
    }

    pub fn deleted(algo: crate::hash::HashAlgo) -> Self {
        Self { result: Version::null(algo), is_null: true }
    }
}

/// The conflict half (§3 invariants 1-5 below are upheld by construction in
/// [`Conflicted::new`], never patched in after the fact):
///
/// 1. `filemask & dirmask == 0`
/// 2. `1 <= filemask | dirmask <= 7`
/// 3. `match_mask` is 0 or has >= 2 bits set
/// 4. `df_conflict` implies both masks are nonzero
/// 5. every `pathnames[i]` is an interned path (guaranteed by `OrtPath` itself)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflicted {
    /// The entry's current best-effort result - side1's content in the
    /// degraded (no content-merge hook) case, or whatever the decision
    /// table in §4.4 last wrote.
    pub merged: Merged,
    pub stages: [Version; 3],
    pub pathnames: [OrtPath; 3],
    pub df_conflict: bool,
    pub path_conflict: bool,
    pub filemask: u8,
    pub dirmask: u8,
    pub match_mask: u8,
}

impl Conflicted {
    pub fn new(
        path: OrtPath,
        stages: [Version; 3],
        filemask: u8,
        dirmask: u8,
        match_mask: u8,
    ) -> Self {
        debug_assert_eq!(filemask & dirmask, 0, "a side cannot be both a file and a directory");
        debug_assert!(filemask | dirmask != 0, "at least one side must have an entry");
        debug_assert!(filemask | dirmask <= 0b111);
        debug_assert!(match_mask == 0 || match_mask.count_ones() >= 2);
        let df_conflict = filemask != 0 && dirmask != 0;
        debug_assert!(!df_conflict || (filemask != 0 && dirmask != 0));

        // Until C4 resolves this entry, the provisional result is side1's
        // content (or the base's, if side1 is absent) - the degraded-mode
        // default from §4.4's last row.
        let fallback = stages[1].is_null().then(|| stages[0]).unwrap_or(stages[1]);

        Self {
            merged: Merged::new(fallback),
            stages,
            pathnames: [path; 3],
            df_conflict,
            path_conflict: false,
            filemask,
            dirmask,
            match_mask,
        }
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEntry {
    Merged(Merged),
    Conflicted(Conflicted),
}

impl PathEntry {
    pub fn clean(self) -> bool {
        matches!(self, PathEntry::Merged(..))
    }

    pub fn is_conflicted(self) -> bool {
        !self.clean()
    }

    pub fn result(self) -> Version {
        match self {
            PathEntry::Merged(m) => m.result,
            PathEntry::Conflicted(c) => c.merged.result,
        }
    }

    pub fn is_null(self) -> bool {
        match self {
            PathEntry::Merged(m) => m.is_null,
            PathEntry::Conflicted(c) => c.merged.is_null,
        }
    }

    /// Accesses the conflict-only fields. Debug-asserts per §4.1: "once
    /// `clean` transitions `false -> true`, code must not subsequently read
    /// the conflict-only fields".
    pub fn as_conflicted(self) -> Option<Conflicted> {
        match self {
            PathEntry::Merged(..) => None,
            PathEntry::Conflicted(c) => Some(c),
        }
    }

    pub fn unwrap_conflicted(self) -> Conflicted {
        self.as_conflicted().unwrap_or_else(|| bug!("read conflict fields of a merged path entry"))
    }
}

impl From<Merged> for PathEntry {
    fn from(m: Merged) -> Self {
        PathEntry::Merged(m)
    }
}

impl From<Conflicted> for PathEntry {
    fn from(c: Conflicted) -> Self {
        PathEntry::Conflicted(c)
    }
}

/// C1's public contract (§4.1): intern on insert, look up, iterate, and
/// classify an entry without the caller needing to know the tag check.
#[derive(Debug, Default)]
pub struct PathTable {
    entries: FxHashMap<OrtPath, PathEntry>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: OrtPath, entry: impl Into<PathEntry>) {
        self.entries.insert(path, entry.into());
    }

    pub fn get(&self, path: OrtPath) -> Option<PathEntry> {
        self.entries.get(&path).copied()
    }

    pub fn get_mut(&mut self, path: OrtPath) -> Option<&mut PathEntry> {
        self.entries.get_mut(&path)
    }

    pub fn is_conflicted(&self, entry: PathEntry) -> bool {
        entry.is_conflicted()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_each(&self, mut f: impl FnMut(OrtPath, PathEntry)) {
        for (&path, &entry) in &self.entries {
            f(path, entry);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrtPath, PathEntry)> + '_ {
        self.entries.iter().map(|(&p, &e)| (p, e))
    }

    /// Clears the table between recursive merges (§4.7 step 3: "clear the
    /// path table and conflicted set but keep the log").
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// §3's "conflicted set": exactly the keys still conflicted at the end of
/// C4, kept as its own map so C6 doesn't re-scan the whole table.
#[derive(Debug, Default, Clone)]
pub struct ConflictedSet {
    entries: FxHashMap<OrtPath, Conflicted>,
}

impl ConflictedSet {
    pub fn insert(&mut self, path: OrtPath, entry: Conflicted) {
        self.entries.insert(path, entry);
    }

    pub fn remove(&mut self, path: OrtPath) {
        self.entries.remove(&path);
    }

    pub fn contains(&self, path: OrtPath) -> bool {
        self.entries.contains_key(&path)
    }

    pub fn entry(&self, path: OrtPath) -> Option<&Conflicted> {
        self.entries.get(&path)
    }

    pub fn paths(&self) -> impl Iterator<Item = OrtPath> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgo;
    use crate::obj::FileMode;

    fn v(b: u8) -> Version {
        Version::new(HashAlgo::Sha1.hash([b]), FileMode::Reg)
    }

    #[test]
    fn conflicted_entry_upholds_invariants() {
        let path = OrtPath::intern("a");
        let entry = Conflicted::new(path, [v(0), v(1), Version::null(HashAlgo::Sha1)], 0b011, 0, 0);
        assert_eq!(entry.filemask & entry.dirmask, 0);
        assert!(entry.filemask | entry.dirmask >= 1);
    }

    #[test]
    fn downgrading_replaces_the_variant() {
        let mut table = PathTable::new();
        let path = OrtPath::intern("downgrade-me");
        table.insert(path, Conflicted::new(path, [v(0), v(1), v(1)], 0b011, 0, 0));
        assert!(table.get(path).unwrap().is_conflicted());

        table.insert(path, Merged::new(v(1)));
        let entry = table.get(path).unwrap();
        assert!(entry.clean());
        assert!(entry.as_conflicted().is_none());
    }

    #[test]
    fn conflicted_set_tracks_only_unresolved_paths() {
        let mut set = ConflictedSet::default();
        let path = OrtPath::intern("b");
        set.insert(path, Conflicted::new(path, [v(0), v(1), v(2)], 0b110, 0, 0));
        assert!(set.contains(path));
        set.remove(path);
        assert!(!set.contains(path));
    }
}
