//! C2: the tree co-traversal collector (§4.2). Walks three [`Tree`]s in
//! lockstep by basename and populates the path table.
//!
//! The three-way merge-join here is the specialized, N=3 relative of the
//! teacher's generic `WalkIterators<const N: usize>` - real trees never
//! have more than three sides to a merge, so there's no reason to pay for
//! the general machinery. Each `Tree`'s `BTreeSet<TreeEntry>` is already
//! sorted by `base_name_compare`; joining on plain basename string (rather
//! than the D/F-aware order) is what lets a file and a directory that share
//! a name line up in the same step, which is exactly the D/F-conflict case
//! this collector has to detect.

use crate::error::OrtResult;
use crate::hash::HashAlgo;
use crate::merge::path_table::{Conflicted, Merged};
use crate::merge::{MergeContext, MergeOptions};
use crate::obj::{Tree, TreeEntry, Version};
use crate::path::OrtPath;
use crate::store::ObjectStore;

/// One side's entry at the current step, if it has one.
type SideEntries = [Option<TreeEntry>; 3];

pub fn collect(
    ctx: &mut MergeContext<'_>,
    opts: &MergeOptions,
    prefix: OrtPath,
    trees: [&Tree; 3],
) -> OrtResult<()> {
    let algo = ctx.store.hash_algo();
    let sorted: [Vec<TreeEntry>; 3] = [
        sorted_by_name(trees[0]),
        sorted_by_name(trees[1]),
        sorted_by_name(trees[2]),
    ];
    let mut cursors = [0usize, 0, 0];

    loop {
        let heads: [Option<&TreeEntry>; 3] = [
            sorted[0].get(cursors[0]),
            sorted[1].get(cursors[1]),
            sorted[2].get(cursors[2]),
        ];
        let Some(name) = heads.iter().flatten().map(|e| e.path.as_str()).min() else { break };
        let name = name.to_owned();

        let mut side_entries: SideEntries = [None, None, None];
        for i in 0..3 {
            if heads[i].is_some_and(|e| e.path.as_str() == name) {
                side_entries[i] = sorted[i].get(cursors[i]).copied();
                cursors[i] += 1;
            }
        }

        visit(ctx, opts, algo, prefix, side_entries)?;
    }

    Ok(())
}

/// Basename order (not `base_name_compare`) is what lets a file and a
/// directory sharing a name line up in the same merge-join step - see the
/// module doc comment. `itertools::sorted_by` here matches teacher's own
/// preference for an `Itertools` adaptor over a separate `sort_by` call
/// (`libbit/src/index/tests.rs`'s `.collect_vec()`).
fn sorted_by_name(tree: &Tree) -> Vec<TreeEntry> {
    use itertools::Itertools;
    tree.entries.iter().copied().sorted_by(|a, b| a.path.as_str().cmp(b.path.as_str())).collect_vec()
}

fn visit(
    ctx: &mut MergeContext<'_>,
    opts: &MergeOptions,
    algo: HashAlgo,
    prefix: OrtPath,
    side_entries: SideEntries,
) -> OrtResult<()> {
    let basename = side_entries.iter().flatten().next().unwrap().path;
    let path = prefix.join(basename.as_path());

    let mut filemask = 0u8;
    let mut dirmask = 0u8;
    let mut stages = [Version::null(algo); 3];
    for (i, entry) in side_entries.iter().enumerate() {
        if let Some(entry) = entry {
            stages[i] = Version::new(entry.oid, entry.mode);
            if entry.mode.is_tree() {
                dirmask |= 1 << i;
            } else {
                filemask |= 1 << i;
            }
        }
    }

    let side1_matches_base = stages[1] == stages[0];
    let side2_matches_base = stages[2] == stages[0];
    let sides_match = stages[1] == stages[2];
    let match_mask: u8 = if side1_matches_base && side2_matches_base {
        0b111
    } else if side1_matches_base {
        0b011
    } else if side2_matches_base {
        0b101
    } else if sides_match {
        0b110
    } else {
        0
    };

    if match_mask == 0b111 {
        // Identical on every side, directory or not - short-circuit, don't
        // recurse even if it's a subtree (§4.2 step 3, scenario 5 in §8).
        ctx.table.insert(path, Merged::new(stages[0]));
        return Ok(());
    }

    let entry = Conflicted::new(path, stages, filemask, dirmask, match_mask);
    ctx.table.insert(path, entry);

    if dirmask != 0 {
        let child_trees = [
            subtree(ctx.store, side_entries[0], algo)?,
            subtree(ctx.store, side_entries[1], algo)?,
            subtree(ctx.store, side_entries[2], algo)?,
        ];
        collect(ctx, opts, path, [&child_trees[0], &child_trees[1], &child_trees[2]])?;
    }

    Ok(())
}

fn subtree(store: &dyn ObjectStore, entry: Option<TreeEntry>, _algo: HashAlgo) -> OrtResult<Tree> {
    match entry {
        Some(e) if e.mode.is_tree() => store
            .parse_tree(e.oid)
            .map_err(|err| anyhow!("failed to read subtree while collecting merge entries: {err}")),
        _ => Ok(Tree::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgo;
    use crate::merge::content::NoContentMerge;
    use crate::merge::rename::NoRenameDetection;
    use crate::merge::RecursiveVariant;
    use crate::obj::FileMode;
    use crate::store::MemoryStore;

    fn mk_ctx(store: &MemoryStore) -> MergeContext<'_> {
        MergeContext::new(store, Box::new(NoRenameDetection), Box::new(NoContentMerge))
    }

    fn mk_opts() -> MergeOptions {
        MergeOptions::new("main", "feature")
    }

    fn entry(store: &MemoryStore, name: &str, mode: FileMode, content: &[u8]) -> TreeEntry {
        let oid = store.hash_algo().hash(content);
        TreeEntry::new(mode, OrtPath::intern(name), oid)
    }

    #[test]
    fn pure_add_on_one_side_is_clean() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut ctx = mk_ctx(&store);
        let opts = mk_opts();

        let base = Tree::empty();
        let side1 = Tree::empty();
        let mut side2 = Tree::empty();
        side2.entries.insert(entry(&store, "a", FileMode::Reg, b"a-contents"));

        collect(&mut ctx, &opts, OrtPath::EMPTY, [&base, &side1, &side2])?;

        let path = OrtPath::intern("a");
        let resolved = ctx.table.get(path).unwrap();
        assert!(resolved.is_conflicted());
        let c = resolved.unwrap_conflicted();
        assert_eq!(c.filemask, 0b100);
        assert_eq!(c.match_mask, 0);
        Ok(())
    }

    #[test]
    fn identical_subtree_short_circuits() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut ctx = mk_ctx(&store);
        let opts = mk_opts();

        let mut lib = Tree::empty();
        lib.entries.insert(entry(&store, "mod.rs", FileMode::Reg, b"mod"));
        let lib_oid = store.write_tree(&lib)?;

        let mut base = Tree::empty();
        base.entries.insert(TreeEntry::new(FileMode::Tree, OrtPath::intern("lib"), lib_oid));
        let side1 = base.clone();
        let mut side2 = base.clone();
        side2.entries.insert(entry(&store, "README", FileMode::Reg, b"hi"));

        collect(&mut ctx, &opts, OrtPath::EMPTY, [&base, &side1, &side2])?;

        let lib_path = OrtPath::intern("lib");
        assert!(ctx.table.get(lib_path).unwrap().clean());
        // nothing below `lib/` should have been visited
        assert!(ctx.table.get(OrtPath::intern("lib/mod.rs")).is_none());

        let readme = ctx.table.get(OrtPath::intern("README")).unwrap();
        assert!(readme.is_conflicted());
        Ok(())
    }
}
