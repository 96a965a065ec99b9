//! The "ort" three-way tree merge strategy (§2's C1-C8), assembled here into
//! the four entry points §6 specifies: [`merge_incore_nonrecursive`],
//! [`merge_incore_recursive`], [`merge_switch_to_result`], and
//! [`merge_finalize`].

pub mod collect;
pub mod content;
pub mod driver;
pub mod log;
pub mod path_table;
pub mod rename;
pub mod resolve;
pub mod write;

use crate::checkout::{Checkout, CheckoutOpts};
use crate::error::{MergeError, OrtResult};
use crate::hash::Oid;
use crate::index::Index;
use crate::store::ObjectStore;
use content::ContentMerge;
use driver::MergeBaseFinder;
use log::MergeLog;
use path_table::{ConflictedSet, PathTable};
use rename::RenameDetector;

/// `--ours`/`--theirs`/normal, §6's `recursive_variant`. Only meaningful to
/// the content-merge hook; the core itself treats all three identically
/// except where noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursiveVariant {
    Normal,
    Ours,
    Theirs,
}

impl Default for RecursiveVariant {
    fn default() -> Self {
        RecursiveVariant::Normal
    }
}

/// The conventional upper bound on a rename-detection similarity score
/// (percent, git's `MAX_SCORE` truncated to a round number).
pub const MAX_RENAME_SCORE: u32 = 100;

/// §6's merge options, validated on entry by every entry point.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub branch1_label: String,
    pub branch2_label: String,
    pub detect_renames: bool,
    pub rename_limit: i32,
    pub rename_score: u32,
    pub recursive_variant: RecursiveVariant,
    pub verbosity: u8,
    pub diff_algorithm: String,
    /// Set by the caller before `merge_incore_nonrecursive`, or internally
    /// by `merge_incore_recursive` (§4.7 step 4).
    pub ancestor_label: Option<String>,
}

impl MergeOptions {
    pub fn new(branch1_label: impl Into<String>, branch2_label: impl Into<String>) -> Self {
        Self {
            branch1_label: branch1_label.into(),
            branch2_label: branch2_label.into(),
            detect_renames: true,
            rename_limit: -1,
            rename_score: 50,
            recursive_variant: RecursiveVariant::default(),
            verbosity: 2,
            diff_algorithm: "histogram".to_owned(),
            ancestor_label: None,
        }
    }

    fn validate(&self) -> OrtResult<()> {
        ensure!(self.rename_limit >= -1, "rename_limit must be >= -1, got {}", self.rename_limit);
        ensure!(
            self.rename_score <= MAX_RENAME_SCORE,
            "rename_score must be <= {}, got {}",
            MAX_RENAME_SCORE,
            self.rename_score
        );
        ensure!(self.verbosity <= 5, "verbosity must be <= 5, got {}", self.verbosity);
        Ok(())
    }
}

/// The merge context, §3's "Per-merge context": owns the path table, the
/// conflicted set, the log, `call_depth`, and the object store handle used
/// to read/write trees. This is the `priv` field of [`MergeResult`] -
/// opaque to callers, consumed by [`merge_switch_to_result`] and
/// [`merge_finalize`].
pub struct MergeContext<'s> {
    pub(crate) store: &'s dyn ObjectStore,
    pub(crate) rename_detector: Box<dyn RenameDetector>,
    pub(crate) content_merge: Box<dyn ContentMerge>,
    pub(crate) table: PathTable,
    pub(crate) conflicted: ConflictedSet,
    pub(crate) log: MergeLog,
    pub(crate) call_depth: u32,
    pub(crate) opts: MergeOptions,
}

impl<'s> MergeContext<'s> {
    pub fn new(
        store: &'s dyn ObjectStore,
        rename_detector: Box<dyn RenameDetector>,
        content_merge: Box<dyn ContentMerge>,
    ) -> Self {
        Self {
            store,
            rename_detector,
            content_merge,
            table: PathTable::new(),
            conflicted: ConflictedSet::default(),
            log: MergeLog::new(),
            call_depth: 0,
            opts: MergeOptions::new("ours", "theirs"),
        }
    }
}

/// §6's merge result. `clean` follows §7's three-way split: `-1` hard
/// failure, `0` conflicts remain, `1` fully clean.
pub struct MergeResult<'s> {
    pub tree: Oid,
    pub clean: i8,
    context: Option<MergeContext<'s>>,
}

impl<'s> MergeResult<'s> {
    fn hard_failure(algo: crate::hash::HashAlgo) -> Self {
        Self { tree: Oid::null(algo), clean: -1, context: None }
    }
}

/// `merge_incore_nonrecursive` (§6): merges three already-resolved trees.
/// `opts.ancestor_label` must be set by the caller.
pub fn merge_incore_nonrecursive<'s>(
    mut opts: MergeOptions,
    store: &'s dyn ObjectStore,
    rename_detector: Box<dyn RenameDetector>,
    content_merge: Box<dyn ContentMerge>,
    base_oid: Oid,
    side1_oid: Oid,
    side2_oid: Oid,
) -> OrtResult<MergeResult<'s>> {
    opts.validate()?;
    ensure!(opts.ancestor_label.is_some(), "merge_incore_nonrecursive requires opts.ancestor_label");

    let algo = store.hash_algo();
    let mut ctx = MergeContext::new(store, rename_detector, content_merge);
    ctx.opts = opts;

    match run_nonrecursive(&mut ctx, base_oid, side1_oid, side2_oid) {
        Ok(tree) => {
            let clean = if ctx.conflicted.is_empty() { 1 } else { 0 };
            Ok(MergeResult { tree, clean, context: Some(ctx) })
        }
        Err(err) => {
            let merge_err = MergeError::new(
                base_oid,
                side1_oid,
                side2_oid,
                format!("merge_incore_nonrecursive failed: {err}"),
            );
            ctx.log.push(crate::path::OrtPath::EMPTY, merge_err.to_string());
            error!("{merge_err}");
            Ok(MergeResult { context: Some(ctx), ..MergeResult::hard_failure(algo) })
        }
    }
}

pub(crate) fn run_nonrecursive(ctx: &mut MergeContext<'_>, base_oid: Oid, side1_oid: Oid, side2_oid: Oid) -> OrtResult<Oid> {
    let base = ctx.store.parse_tree(base_oid)?;
    let side1 = ctx.store.parse_tree(side1_oid)?;
    let side2 = ctx.store.parse_tree(side2_oid)?;

    let opts = ctx.opts.clone();
    collect::collect(ctx, &opts, crate::path::OrtPath::EMPTY, [&base, &side1, &side2])?;

    let clean_renames = ctx.rename_detector.detect_renames(&mut ctx.table)?;
    if !clean_renames {
        debug!("rename detector reported an unresolved rename interaction");
    }

    let opts = ctx.opts.clone();
    write::write_tree(ctx, &opts)
}

/// `merge_incore_recursive` (§6/§4.7): reduces `bases` to a single virtual
/// ancestor (recursively merging them pairwise when there's more than one),
/// then runs the non-recursive merge against the two real heads.
pub fn merge_incore_recursive<'s>(
    mut opts: MergeOptions,
    store: &'s dyn ObjectStore,
    rename_detector: Box<dyn RenameDetector>,
    content_merge: Box<dyn ContentMerge>,
    base_finder: Box<dyn MergeBaseFinder>,
    bases: Vec<Oid>,
    side1_oid: Oid,
    side2_oid: Oid,
) -> OrtResult<MergeResult<'s>> {
    opts.validate()?;
    let algo = store.hash_algo();
    let mut ctx = MergeContext::new(store, rename_detector, content_merge);
    ctx.opts = opts;

    match driver::merge_bases_and_run(&mut ctx, base_finder.as_ref(), bases, side1_oid, side2_oid) {
        Ok(tree) => {
            let clean = if ctx.conflicted.is_empty() { 1 } else { 0 };
            Ok(MergeResult { tree, clean, context: Some(ctx) })
        }
        Err(err) => {
            let merge_err =
                MergeError::new(algo.empty_tree_oid(), side1_oid, side2_oid, format!("recursive merge failed: {err}"));
            error!("{merge_err}");
            Ok(MergeResult { context: Some(ctx), ..MergeResult::hard_failure(algo) })
        }
    }
}

/// `merge_switch_to_result` (§6): performs the caller's two-way checkout
/// from `head_tree` to `result.tree`, reconciles the index (C6), and drains
/// the log in sorted order.
pub fn merge_switch_to_result(
    checkout: &dyn Checkout,
    head_tree: Oid,
    result: &mut MergeResult<'_>,
    index: &mut Index,
    update_worktree_and_index: bool,
    display_messages: bool,
) -> OrtResult<()> {
    let Some(ctx) = result.context.as_mut() else {
        bail!("merge_switch_to_result called on a result with no context (already finalized?)");
    };

    if update_worktree_and_index {
        checkout.checkout(head_tree, result.tree, CheckoutOpts::default())?;
        index.reconcile(&ctx.conflicted);
    }

    if display_messages {
        for (path, messages) in ctx.log.drain_sorted() {
            for message in messages {
                if !message.skip_remerge_diff {
                    info!("{}", message.text);
                }
            }
            let _ = path; // message text already carries the path
        }
    }

    Ok(())
}

/// `merge_finalize` (§6): releases the context. After this, `result` no
/// longer carries diagnostic state - §5's "scoped release of the context is
/// guaranteed on all exits".
pub fn merge_finalize(mut result: MergeResult<'_>) {
    drop(result.context.take());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::NullCheckout;
    use crate::hash::HashAlgo;
    use crate::obj::{FileMode, Tree, TreeEntry, Version};
    use crate::path::OrtPath;
    use crate::store::MemoryStore;
    use content::NoContentMerge;
    use rename::NoRenameDetection;

    fn store() -> MemoryStore {
        MemoryStore::new(HashAlgo::Sha1)
    }

    fn tree_with(store: &MemoryStore, entries: &[(&str, FileMode, &[u8])]) -> Oid {
        let mut tree = Tree::empty();
        for &(name, mode, content) in entries {
            tree.entries.insert(TreeEntry::new(mode, OrtPath::intern(name), store.hash_algo().hash(content)));
        }
        store.write_tree(&tree).unwrap()
    }

    fn run(
        store: &MemoryStore,
        base: Oid,
        side1: Oid,
        side2: Oid,
    ) -> MergeResult<'_> {
        let mut opts = MergeOptions::new("main", "feature");
        opts.ancestor_label = Some("base".to_owned());
        merge_incore_nonrecursive(opts, store, Box::new(NoRenameDetection), Box::new(NoContentMerge), base, side1, side2).unwrap()
    }

    // §8 scenario 1: pure add on one side, identical base and other side.
    #[test]
    fn scenario_pure_add_on_one_side() {
        let store = store();
        let base = tree_with(&store, &[]);
        let side1 = tree_with(&store, &[]);
        let side2 = tree_with(&store, &[("a", FileMode::Reg, b"a-contents")]);

        let result = run(&store, base, side1, side2);

        assert_eq!(result.clean, 1);
        let tree = store.parse_tree(result.tree).unwrap();
        assert_eq!(tree.get(OrtPath::intern("a")).unwrap().oid, HashAlgo::Sha1.hash(b"a-contents"));
    }

    // §8 scenario 2: both sides add the same file with the same content.
    #[test]
    fn scenario_both_sides_add_same_content() {
        let store = store();
        let base = tree_with(&store, &[]);
        let side1 = tree_with(&store, &[("a", FileMode::Reg, b"a-contents")]);
        let side2 = tree_with(&store, &[("a", FileMode::Reg, b"a-contents")]);

        let result = run(&store, base, side1, side2);

        assert_eq!(result.clean, 1);
        let tree = store.parse_tree(result.tree).unwrap();
        assert_eq!(tree.get(OrtPath::intern("a")).unwrap().oid, HashAlgo::Sha1.hash(b"a-contents"));
    }

    // §8 scenario 3: modify/delete.
    #[test]
    fn scenario_modify_delete() {
        let store = store();
        let base = tree_with(&store, &[("a", FileMode::Reg, b"original")]);
        let side1 = tree_with(&store, &[("a", FileMode::Reg, b"modified")]);
        let side2 = tree_with(&store, &[]);

        let mut opts = MergeOptions::new("main", "feature");
        opts.ancestor_label = Some("base".to_owned());
        let mut result = merge_incore_nonrecursive(
            opts,
            &store,
            Box::new(NoRenameDetection),
            Box::new(NoContentMerge),
            base,
            side1,
            side2,
        )
        .unwrap();

        assert_eq!(result.clean, 0);
        let tree = store.parse_tree(result.tree).unwrap();
        // top-level call (call_depth == 0): the modified side's content wins.
        assert_eq!(tree.get(OrtPath::intern("a")).unwrap().oid, HashAlgo::Sha1.hash(b"modified"));

        let mut index = Index::new();
        index.insert(crate::index::IndexEntry {
            path: OrtPath::intern("a"),
            stage: crate::index::MergeStage::None,
            version: Version::new(HashAlgo::Sha1.hash(b"original"), FileMode::Reg),
        });

        merge_switch_to_result(&NullCheckout, base, &mut result, &mut index, true, false).unwrap();

        assert!(index.find(OrtPath::intern("a"), crate::index::MergeStage::None).is_none());
        assert_eq!(
            index.find(OrtPath::intern("a"), crate::index::MergeStage::Stage1).unwrap().version.oid,
            HashAlgo::Sha1.hash(b"original")
        );
        assert_eq!(
            index.find(OrtPath::intern("a"), crate::index::MergeStage::Stage2).unwrap().version.oid,
            HashAlgo::Sha1.hash(b"modified")
        );
        assert!(index.find(OrtPath::intern("a"), crate::index::MergeStage::Stage3).is_none());

        merge_finalize(result);
    }

    // §8 scenario 4: delete on both sides.
    #[test]
    fn scenario_delete_on_both_sides() {
        let store = store();
        let base = tree_with(&store, &[("a", FileMode::Reg, b"gone soon")]);
        let side1 = tree_with(&store, &[]);
        let side2 = tree_with(&store, &[]);

        let result = run(&store, base, side1, side2);

        assert_eq!(result.clean, 1);
        let tree = store.parse_tree(result.tree).unwrap();
        assert!(tree.get(OrtPath::intern("a")).is_none());
    }

    // §8 "idempotence of identical inputs".
    #[test]
    fn identical_inputs_are_idempotent() {
        let store = store();
        let t = tree_with(&store, &[("a", FileMode::Reg, b"stuff"), ("b", FileMode::Reg, b"other")]);

        let result = run(&store, t, t, t);

        assert_eq!(result.clean, 1);
        assert_eq!(result.tree, t);
    }

    #[test]
    fn rejects_missing_ancestor_label() {
        let store = store();
        let t = tree_with(&store, &[]);
        let opts = MergeOptions::new("main", "feature");
        let res = merge_incore_nonrecursive(opts, &store, Box::new(NoRenameDetection), Box::new(NoContentMerge), t, t, t);
        assert!(res.is_err());
    }

    // §8 "idempotence of identical inputs", generalized over randomly
    // generated trees (reusing `obj::tree`'s `Arbitrary for Tree` impl) -
    // every flat tree merges cleanly against itself and reproduces its own
    // oid, regardless of its shape.
    #[quickcheck_macros::quickcheck]
    fn random_trees_merge_idempotently(tree: crate::obj::Tree) -> bool {
        let store = store();
        let t = store.write_tree(&tree).unwrap();
        let result = run(&store, t, t, t);
        result.clean == 1 && result.tree == t
    }
}
