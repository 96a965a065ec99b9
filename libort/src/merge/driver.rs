//! C7: the recursive driver (§4.7). Reduces a list of merge bases to a
//! single virtual ancestor - recursively merging the bases together when
//! there's more than one, criss-cross-merge style - then runs the
//! non-recursive merge (C2-C6) against the two real heads using that
//! ancestor.
//!
//! §1 puts commit-DAG walking out of scope ("the object store... not
//! specified here" covers only tree/blob bytes, but finding the merge base
//! of two commits needs parent history, which this crate never reads). §4.7
//! step 1 says as much directly: "if no merge-base list is supplied, compute
//! it externally". We model that external computation the same way as the
//! rename detector and content-merge hooks: a trait the caller implements
//! against whatever commit graph it already has, with a trivial default.

use super::{run_nonrecursive, MergeContext};
use crate::error::OrtResult;
use crate::hash::Oid;
use crate::obj::Commit;

/// Finds the merge bases (lowest common ancestors) of two commits. The
/// driver calls this both for the caller-supplied pair of heads (if the
/// caller didn't already resolve that list) and, recursively, for each pair
/// of bases it reduces in §4.7 step 3 - real git's `merge_ort_internal` asks
/// its commit graph the same question at both points.
pub trait MergeBaseFinder {
    fn merge_bases(&self, a: Oid, b: Oid) -> OrtResult<Vec<Oid>>;
}

/// No commit graph available: every pair is treated as unrelated history,
/// i.e. merged against the empty tree (§4.7 step 2). This is the only
/// choice that doesn't require this crate to read commit parents, and it's
/// the same fallback real git takes for genuinely unrelated histories.
pub struct NoCommonHistory;

impl MergeBaseFinder for NoCommonHistory {
    fn merge_bases(&self, _a: Oid, _b: Oid) -> OrtResult<Vec<Oid>> {
        Ok(Vec::new())
    }
}

/// The chosen ancestor for one non-recursive merge: its tree, and the label
/// §6's `ancestor_label` should carry (§4.7 step 4).
struct Ancestor {
    tree: Oid,
    label: String,
}

/// Runs §4.7 end to end and returns the root tree of the final (non-virtual)
/// merge. `side1_tree`/`side2_tree` are the two real heads' trees; `bases`
/// are the (tree ids of the) already-known merge bases, if any.
pub fn merge_bases_and_run(
    ctx: &mut MergeContext<'_>,
    base_finder: &dyn MergeBaseFinder,
    bases: Vec<Oid>,
    side1_tree: Oid,
    side2_tree: Oid,
) -> OrtResult<Oid> {
    let algo = ctx.store.hash_algo();
    let mut remaining = bases.into_iter();

    // Step 2: pop the first base, or invent an empty tree if there was none.
    let mut ancestor = match remaining.next() {
        Some(b0) => Ancestor { tree: b0, label: format!("{:#}", b0) },
        None => Ancestor { tree: algo.empty_tree_oid(), label: "empty tree".to_owned() },
    };

    let mut reduced_multiple = false;
    for next_base in remaining {
        reduced_multiple = true;
        ctx.call_depth += 1;

        let saved_branch1 = std::mem::replace(&mut ctx.opts.branch1_label, "Temporary merge branch 1".to_owned());
        let saved_branch2 = std::mem::replace(&mut ctx.opts.branch2_label, "Temporary merge branch 2".to_owned());

        // §4.7 step 3: "let that call find bases" - ask the same hook for
        // the merge bases of the pair being combined, then recurse through
        // this same reduction so a pathological criss-cross among the
        // original bases themselves is handled identically to the outer one.
        let sub_bases = base_finder.merge_bases(ancestor.tree, next_base)?;
        let inner_tree = merge_bases_and_run(ctx, base_finder, sub_bases, ancestor.tree, next_base)?;

        ctx.opts.branch1_label = saved_branch1;
        ctx.opts.branch2_label = saved_branch2;
        ctx.call_depth -= 1;

        // A virtual commit exists only so the fabricated ancestor has a
        // sensible identity to log/debug against - it's never written to
        // the object store.
        let virtual_commit = Commit::virtual_merge_base(inner_tree, [ancestor.tree, next_base]);
        trace!("fabricated virtual merge base: {virtual_commit}");

        // §4.7 step 3 (end): "clear the path table and conflicted set but
        // keep the log" before reusing `ctx` for the next reduction (or the
        // final merge below).
        ctx.table.clear();
        ctx.conflicted.clear();

        ancestor = Ancestor { tree: inner_tree, label: String::new() };
    }

    // §4.7 step 4: the ancestor label is the single base's abbreviated id,
    // "merged common ancestors" if multiple bases were reduced, or "empty
    // tree" if there were none at all.
    ctx.opts.ancestor_label = Some(if reduced_multiple {
        "merged common ancestors".to_owned()
    } else {
        ancestor.label
    });

    // §4.7 step 5: the non-recursive merge, using the resolved ancestor as
    // base and the two original heads' trees as sides.
    run_nonrecursive(ctx, ancestor.tree, side1_tree, side2_tree)
}

/// Top-level convenience matching §6's "possibly a pre-computed list of
/// merge bases": when the caller hasn't resolved the bases themselves, ask
/// `base_finder` for the merge bases of the two real heads before reducing.
pub fn merge_heads(
    ctx: &mut MergeContext<'_>,
    base_finder: &dyn MergeBaseFinder,
    side1_tree: Oid,
    side2_tree: Oid,
) -> OrtResult<Oid> {
    let bases = base_finder.merge_bases(side1_tree, side2_tree)?;
    merge_bases_and_run(ctx, base_finder, bases, side1_tree, side2_tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgo;
    use crate::merge::content::NoContentMerge;
    use crate::merge::rename::NoRenameDetection;
    use crate::merge::MergeOptions;
    use crate::obj::{FileMode, Tree, TreeEntry};
    use crate::path::OrtPath;
    use crate::store::{MemoryStore, ObjectStore};

    fn ctx(store: &MemoryStore) -> MergeContext<'_> {
        let mut ctx = MergeContext::new(store, Box::new(NoRenameDetection), Box::new(NoContentMerge));
        ctx.opts = MergeOptions::new("main", "feature");
        ctx
    }

    fn tree_with(store: &MemoryStore, name: &str, content: &[u8]) -> OrtResult<Oid> {
        let mut tree = Tree::empty();
        tree.entries.insert(TreeEntry::new(FileMode::Reg, OrtPath::intern(name), store.hash_algo().hash(content)));
        store.write_tree(&tree)
    }

    #[test]
    fn no_bases_invents_empty_tree_ancestor() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut c = ctx(&store);
        let side2 = tree_with(&store, "a", b"a-contents")?;

        let tree_oid = merge_bases_and_run(&mut c, &NoCommonHistory, vec![], store.hash_algo().empty_tree_oid(), side2)?;

        let written = store.parse_tree(tree_oid)?;
        assert_eq!(written.get(OrtPath::intern("a")).unwrap().oid, store.hash_algo().hash(b"a-contents"));
        assert_eq!(c.opts.ancestor_label.as_deref(), Some("empty tree"));
        Ok(())
    }

    #[test]
    fn single_base_runs_at_call_depth_zero() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut c = ctx(&store);
        let base = tree_with(&store, "a", b"base")?;
        let side1 = tree_with(&store, "a", b"side1")?;
        let side2 = store.hash_algo().empty_tree_oid();

        merge_bases_and_run(&mut c, &NoCommonHistory, vec![base], side1, side2)?;

        // modify/delete at call_depth 0 keeps the modified side's content.
        assert_eq!(c.call_depth, 0);
        let a = c.conflicted.entry(OrtPath::intern("a")).unwrap();
        assert_eq!(a.filemask, 0b011);
        Ok(())
    }

    #[test]
    fn two_bases_reduce_via_a_recursive_inner_merge() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut c = ctx(&store);
        let b1 = tree_with(&store, "a", b"from-b1")?;
        let b2 = tree_with(&store, "a", b"from-b2")?;
        let side1 = tree_with(&store, "a", b"from-b1")?;
        let side2 = tree_with(&store, "a", b"from-b2")?;

        merge_bases_and_run(&mut c, &NoCommonHistory, vec![b1, b2], side1, side2)?;

        assert_eq!(c.opts.ancestor_label.as_deref(), Some("merged common ancestors"));
        // the reduction itself must have returned to call_depth 0 by the
        // time the outer (real heads) merge runs.
        assert_eq!(c.call_depth, 0);
        Ok(())
    }
}
