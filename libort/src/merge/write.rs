//! C5: the bottom-up tree writer and its directory accumulator (§4.5).
//!
//! Drives C4 (`resolve::resolve`) as it walks the path table in reverse
//! D/F-aware order, and is the only component that actually calls
//! `ObjectStore::write_tree`.

use crate::error::OrtResult;
use crate::merge::path_table::{Merged, PathEntry};
use crate::merge::{resolve, MergeContext, MergeOptions};
use crate::obj::{FileMode, Tree, TreeEntry, Version};
use crate::path::OrtPath;
use std::cmp::Ordering;
use std::os::unix::ffi::OsStrExt;

/// The `versions`/`offsets` pair from §3: `versions` holds not-yet-emitted
/// `(basename, Version)` pairs for the open directories; `offsets` stacks
/// `(directory_path, start_index_into_versions)` for the directories
/// currently open, outermost first.
#[derive(Debug, Default)]
struct DirAccumulator {
    versions: Vec<(OrtPath, Version)>,
    offsets: Vec<(OrtPath, usize)>,
}

impl DirAccumulator {
    fn last_directory(&self) -> Option<OrtPath> {
        self.offsets.last().map(|&(d, _)| d)
    }
}

/// Whether `path` is rooted under `dir` (or is `dir` itself's root, the
/// empty path, which is an ancestor of everything).
fn is_ancestor(dir: OrtPath, path: OrtPath) -> bool {
    dir.is_empty() || path.starts_with(dir)
}

/// Is this path table entry, as currently resolved, a directory? Used only
/// for sort order and the bottom-up writer's own bookkeeping, never for
/// resolution itself.
fn is_dir_like(entry: PathEntry) -> bool {
    match entry {
        PathEntry::Merged(m) => m.result.mode.is_tree(),
        PathEntry::Conflicted(c) => c.dirmask != 0,
    }
}

/// Cross-level D/F-aware comparator for *full* paths (§4.5 step 2).
///
/// This generalizes [`OrtPath::df_aware_cmp`] (which only ever compares
/// basenames within one directory level, where two distinct entries can
/// never be literal prefixes of each other) to the path table's full paths,
/// where a directory's own path *is* a literal prefix of every path beneath
/// it. git's `df_name_compare` treats that case as equal, which is exactly
/// right when matching two trees' entries at the same level, but isn't a
/// valid sort key on its own - two genuinely different paths must never
/// compare equal, or entries disappear under a stable sort. We break that
/// last tie by length, so the shorter (ancestor) path sorts first.
fn full_path_cmp(a: OrtPath, a_is_dir: bool, b: OrtPath, b_is_dir: bool) -> Ordering {
    let a = a.as_os_str().as_bytes();
    let b = b.as_os_str().as_bytes();
    let minlen = a.len().min(b.len());
    a[..minlen].cmp(&b[..minlen]).then_with(|| {
        let ca = if a.len() == minlen { if a_is_dir { b'/' } else { 0 } } else { a[minlen] };
        let cb = if b.len() == minlen { if b_is_dir { b'/' } else { 0 } } else { b[minlen] };
        ca.cmp(&cb).then_with(|| a.len().cmp(&b.len()))
    })
}

/// `base_name_compare` for entries about to be written into one `Tree`
/// object (§4.5 step 4 / §6): same rule, applied to basenames only.
fn base_name_compare(a: &(OrtPath, Version), b: &(OrtPath, Version)) -> Ordering {
    OrtPath::df_aware_cmp(a.0, a.1.mode.is_tree(), b.0, b.1.mode.is_tree())
}

/// Runs C5 end to end: resolves every path table entry and writes the
/// merged tree. Returns the root tree's oid.
pub fn write_tree(ctx: &mut MergeContext<'_>, _opts: &MergeOptions) -> OrtResult<crate::hash::Oid> {
    let mut paths: Vec<OrtPath> = ctx.table.iter().map(|(p, _)| p).collect();
    if paths.is_empty() {
        return Ok(ctx.store.hash_algo().empty_tree_oid());
    }

    paths.sort_by(|&a, &b| {
        let ea = ctx.table.get(a).unwrap();
        let eb = ctx.table.get(b).unwrap();
        full_path_cmp(a, is_dir_like(ea), b, is_dir_like(eb))
    });

    let mut accum = DirAccumulator::default();
    for &path in paths.iter().rev() {
        let parent = path.parent().unwrap_or(OrtPath::EMPTY);
        close_directory(ctx, &mut accum, parent)?;

        resolve::resolve(ctx, path);

        let resolved = ctx.table.get(path).expect("path vanished mid-write");
        if !resolved.is_null() {
            accum.versions.push((path.file_name(), resolved.result()));
        }
    }

    ensure!(
        accum.offsets.len() == 1 && accum.offsets[0].1 == 0,
        "bottom-up tree writer accounting invariant violated: offsets = {:?}",
        accum.offsets
    );

    let root_entries = std::mem::take(&mut accum.versions);
    let root_tree = build_tree(root_entries);
    ctx.store
        .write_tree(&root_tree)
        .map_err(|err| anyhow!("failed to write root tree: {err}"))
}

fn close_directory(ctx: &mut MergeContext<'_>, accum: &mut DirAccumulator, new_dir: OrtPath) -> OrtResult<()> {
    loop {
        match accum.last_directory() {
            Some(last) if last == new_dir => return Ok(()),
            None => {
                accum.offsets.push((new_dir, accum.versions.len()));
                return Ok(());
            }
            Some(last) if is_ancestor(last, new_dir) => {
                accum.offsets.push((new_dir, accum.versions.len()));
                return Ok(());
            }
            Some(last) => finish_directory(ctx, accum, last)?,
        }
    }
}

fn finish_directory(ctx: &mut MergeContext<'_>, accum: &mut DirAccumulator, dir: OrtPath) -> OrtResult<()> {
    let (_, off) = accum.offsets.pop().expect("close_directory only calls this with a non-empty stack");

    if accum.versions.len() == off {
        set_dir_result(ctx, dir, None);
        return Ok(());
    }

    let mut slice: Vec<_> = accum.versions.split_off(off);
    slice.sort_by(base_name_compare);
    let tree = build_tree(slice);
    let oid = ctx.store.write_tree(&tree).map_err(|err| anyhow!("failed to write tree for {dir}: {err}"))?;
    set_dir_result(ctx, dir, Some(Version::new(oid, FileMode::Tree)));
    Ok(())
}

/// Patches a directory's path-table entry with its written (or null, if it
/// turned out empty) result, without disturbing its conflict bookkeeping.
fn set_dir_result(ctx: &mut MergeContext<'_>, dir: OrtPath, result: Option<Version>) {
    match ctx.table.get(dir) {
        Some(PathEntry::Conflicted(mut c)) => {
            c.merged = match result {
                Some(v) => Merged::new(v),
                None => Merged { result: c.merged.result, is_null: true },
            };
            ctx.table.insert(dir, c);
        }
        Some(PathEntry::Merged(_)) => {
            // already short-circuited clean by C2 (identical subtree) -
            // nothing for C5 to patch.
        }
        None => bug!("directory {dir} closed but has no path table entry"),
    }
}

fn build_tree(entries: Vec<(OrtPath, Version)>) -> Tree {
    Tree { entries: entries.into_iter().map(|(name, v)| TreeEntry::new(v.mode, name, v.oid)).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgo;
    use crate::merge::collect::collect;
    use crate::merge::content::NoContentMerge;
    use crate::merge::rename::NoRenameDetection;
    use crate::merge::MergeOptions;
    use crate::store::MemoryStore;

    fn ctx(store: &MemoryStore) -> MergeContext<'_> {
        MergeContext::new(store, Box::new(NoRenameDetection), Box::new(NoContentMerge))
    }

    #[test]
    fn accounting_invariant_holds_after_write() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut c = ctx(&store);
        let opts = MergeOptions::new("main", "feature");

        let base = Tree::empty();
        let side1 = Tree::empty();
        let mut side2 = Tree::empty();
        side2.entries.insert(TreeEntry::new(
            FileMode::Reg,
            OrtPath::intern("a"),
            HashAlgo::Sha1.hash(b"a"),
        ));

        collect(&mut c, &opts, OrtPath::EMPTY, [&base, &side1, &side2])?;
        let tree_oid = write_tree(&mut c, &opts)?;

        let written = store.parse_tree(tree_oid)?;
        assert_eq!(written.entries.len(), 1);
        assert_eq!(written.get(OrtPath::intern("a")).unwrap().oid, HashAlgo::Sha1.hash(b"a"));
        Ok(())
    }

    #[test]
    fn nested_directories_are_written_bottom_up() -> OrtResult<()> {
        let store = MemoryStore::new(HashAlgo::Sha1);
        let mut c = ctx(&store);
        let opts = MergeOptions::new("main", "feature");

        let base = Tree::empty();
        let side1 = Tree::empty();
        // the collector only walks one level at a time; give it an actual
        // subtree object to recurse into.
        let mut src = Tree::empty();
        src.entries.insert(TreeEntry::new(FileMode::Reg, OrtPath::intern("lib.rs"), HashAlgo::Sha1.hash(b"lib")));
        let src_oid = store.write_tree(&src)?;
        let mut side2 = Tree::empty();
        side2.entries.insert(TreeEntry::new(FileMode::Tree, OrtPath::intern("src"), src_oid));

        collect(&mut c, &opts, OrtPath::EMPTY, [&base, &side1, &side2])?;
        let tree_oid = write_tree(&mut c, &opts)?;

        let root = store.parse_tree(tree_oid)?;
        let src_entry = root.get(OrtPath::intern("src")).unwrap();
        assert!(src_entry.mode.is_tree());
        let rebuilt_src = store.parse_tree(src_entry.oid)?;
        assert_eq!(rebuilt_src.get(OrtPath::intern("lib.rs")).unwrap().oid, HashAlgo::Sha1.hash(b"lib"));
        Ok(())
    }
}
