//! C4: the per-entry resolver, the decision table from §4.4.
//!
//! Driven by C5 in reverse D/F-aware order; resolution itself never fails
//! (§4.4: "no case is fatal; conflicts are data, not errors").

use crate::merge::content::{ContentMergeInput};
use crate::merge::path_table::{Conflicted, Merged, PathEntry};
use crate::merge::MergeContext;
use crate::obj::{FileMode, Version};
use crate::path::OrtPath;

/// Resolves one conflicted entry in place, logging and updating the
/// conflicted set as needed. `path` must already be in `ctx.table` as
/// `PathEntry::Conflicted`.
pub fn resolve(ctx: &mut MergeContext<'_>, path: OrtPath) {
    let entry = match ctx.table.get(path) {
        Some(PathEntry::Conflicted(c)) => c,
        Some(PathEntry::Merged(..)) => return,
        None => bug!("resolve called on a path not present in the table: {path}"),
    };

    let outcome = resolve_conflicted(ctx, path, entry);
    match outcome {
        Resolution::Clean(result) => {
            ctx.conflicted.remove(path);
            ctx.table.insert(path, Merged::new(result));
        }
        Resolution::StillConflicted(updated) => {
            ctx.conflicted.insert(path, updated);
            ctx.table.insert(path, updated);
        }
    }
}

enum Resolution {
    Clean(Version),
    StillConflicted(Conflicted),
}

fn resolve_conflicted(ctx: &mut MergeContext<'_>, path: OrtPath, entry: Conflicted) -> Resolution {
    let Conflicted { filemask, dirmask, match_mask, stages, pathnames, df_conflict, .. } = entry;

    // Directory-only (§4.4: "Record directory entry for tree; done") is not
    // a conflict. By the time C5 reaches this path it has already closed the
    // directory and patched `entry.merged` with the written subtree's
    // version via `set_dir_result`, so that's the clean result here.
    if filemask == 0 {
        return Resolution::Clean(entry.merged.result);
    }

    if filemask != 0 && dirmask != 0 {
        // D/F conflict shell (§4.4): reserved hook, leave conflicted with
        // side1's content.
        return Resolution::StillConflicted(Conflicted { df_conflict, ..entry });
    }

    if match_mask == 0b110 {
        return Resolution::Clean(stages[1]);
    }

    if match_mask == 0b011 || match_mask == 0b101 {
        let changed_side = if match_mask == 0b011 { 2 } else { 1 };
        return Resolution::Clean(stages[changed_side]);
    }

    if filemask == 0b011 || filemask == 0b101 {
        return modify_delete(ctx, path, entry, filemask);
    }

    if filemask == 0b010 || filemask == 0b100 {
        // Add on one side: clean unless shadowed by a D/F conflict, which
        // was already handled above since `dirmask` would be nonzero there.
        let side = if filemask == 0b010 { 1 } else { 2 };
        return Resolution::Clean(stages[side]);
    }

    if filemask == 0b001 {
        return Resolution::Clean(Version::null(ctx.store.hash_algo()));
    }

    if filemask >= 0b110 {
        let base_type = type_tag(stages[0].mode);
        let side1_type = type_tag(stages[1].mode);
        let side2_type = type_tag(stages[2].mode);
        let _ = base_type;
        if side1_type != side2_type {
            // Type change (file<->symlink<->submodule): reserved hook.
            ctx.log.push(
                path,
                format!(
                    "CONFLICT (file type change): {path} changed type between {} and {}",
                    ctx.opts.branch1_label, ctx.opts.branch2_label
                ),
            );
            return Resolution::StillConflicted(entry);
        }

        let output = ctx
            .content_merge
            .merge_content(
                path,
                ContentMergeInput { base: stages[0], side1: stages[1], side2: stages[2], pathnames },
            )
            .unwrap_or_else(|err| bug!("content merge hook failed: {err}"));

        return if output.clean {
            Resolution::Clean(output.result)
        } else {
            ctx.log.push(path, format!("CONFLICT (content): merge conflict in {path}"));
            Resolution::StillConflicted(Conflicted {
                merged: Merged::new(output.result),
                ..entry
            })
        };
    }

    bug!("unreachable filemask/match_mask combination resolving {path}: filemask={filemask:#05b} match_mask={match_mask:#05b}")
}

fn modify_delete(ctx: &mut MergeContext<'_>, path: OrtPath, entry: Conflicted, filemask: u8) -> Resolution {
    // filemask == 0b011: deleted on side2, modified on side1 (and vice versa
    // for 0b101).
    let (modified_side, modified_label, deleting_label) = if filemask == 0b011 {
        (1, &ctx.opts.branch1_label, &ctx.opts.branch2_label)
    } else {
        (2, &ctx.opts.branch2_label, &ctx.opts.branch1_label)
    };

    ctx.log.push(
        path,
        format!(
            "CONFLICT (modify/delete): {path} deleted in {deleting_label} and modified in {modified_label}. \
             Version {modified_label} of {path} left in tree.",
        ),
    );

    // §4.7: at top level we keep the modified side's content; recursive
    // (virtual-ancestor) merges fall back to the base instead, so an inner
    // criss-cross merge never invents content that wasn't on any real side.
    let result = if ctx.call_depth == 0 { entry.stages[modified_side] } else { entry.stages[0] };

    Resolution::StillConflicted(Conflicted { merged: Merged::new(result), ..entry })
}

fn type_tag(mode: FileMode) -> u8 {
    mode.type_tag()
}
