//! `ort merge-tree` - the non-recursive entry point (C2-C6 only, no §4.7
//! base reduction). Three already-resolved tree ids in, one merged tree id
//! out.

use crate::cli::Cmd;
use crate::store::{parse_oid, DirObjectStore};
use anyhow::Result;
use clap::Args;
use libort::merge::content::NoContentMerge;
use libort::merge::rename::NoRenameDetection;
use libort::merge::{merge_incore_nonrecursive, MergeOptions};
use libort::store::ObjectStore;

#[derive(Args, Debug)]
pub struct MergeTreeCliOpts {
    /// Hex id of the common ancestor tree.
    base: String,
    /// Hex id of "our" tree.
    side1: String,
    /// Hex id of "their" tree.
    side2: String,
    #[arg(long, default_value = "ours")]
    branch1_label: String,
    #[arg(long, default_value = "theirs")]
    branch2_label: String,
}

impl Cmd for MergeTreeCliOpts {
    fn exec(self, store: &DirObjectStore) -> Result<()> {
        let algo = store.hash_algo();
        let base = parse_oid(algo, &self.base)?;
        let side1 = parse_oid(algo, &self.side1)?;
        let side2 = parse_oid(algo, &self.side2)?;

        let mut opts = MergeOptions::new(self.branch1_label, self.branch2_label);
        opts.ancestor_label = Some("merged common ancestors".to_owned());

        let result =
            merge_incore_nonrecursive(opts, store, Box::new(NoRenameDetection), Box::new(NoContentMerge), base, side1, side2)?;

        println!("{}", result.tree.to_hex());
        if result.clean != 1 {
            eprintln!("conflicts remain");
            std::process::exit(1);
        }
        Ok(())
    }
}
