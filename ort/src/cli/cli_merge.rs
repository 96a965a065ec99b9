//! `ort merge` - the recursive entry point (§4.7): reduces however many
//! merge bases were given down to a single virtual ancestor before running
//! the same C2-C6 pipeline as `merge-tree`.

use crate::cli::Cmd;
use crate::store::{parse_oid, DirObjectStore};
use anyhow::Result;
use clap::Args;
use libort::merge::content::NoContentMerge;
use libort::merge::driver::NoCommonHistory;
use libort::merge::rename::NoRenameDetection;
use libort::merge::{merge_incore_recursive, MergeOptions};
use libort::store::ObjectStore;

#[derive(Args, Debug)]
pub struct MergeCliOpts {
    /// Hex id of "our" tree.
    side1: String,
    /// Hex id of "their" tree.
    side2: String,
    /// Hex id of a merge-base tree. May be repeated; with none, the two
    /// sides are treated as having no common history.
    #[arg(long = "base")]
    bases: Vec<String>,
    #[arg(long, default_value = "ours")]
    branch1_label: String,
    #[arg(long, default_value = "theirs")]
    branch2_label: String,
}

impl Cmd for MergeCliOpts {
    fn exec(self, store: &DirObjectStore) -> Result<()> {
        let algo = store.hash_algo();
        let side1 = parse_oid(algo, &self.side1)?;
        let side2 = parse_oid(algo, &self.side2)?;
        let bases = self.bases.iter().map(|s| parse_oid(algo, s)).collect::<Result<Vec<_>, _>>()?;

        let opts = MergeOptions::new(self.branch1_label, self.branch2_label);

        let result = merge_incore_recursive(
            opts,
            store,
            Box::new(NoRenameDetection),
            Box::new(NoContentMerge),
            Box::new(NoCommonHistory),
            bases,
            side1,
            side2,
        )?;

        println!("{}", result.tree.to_hex());
        if result.clean != 1 {
            eprintln!("conflicts remain");
            std::process::exit(1);
        }
        Ok(())
    }
}
