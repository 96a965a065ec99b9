mod cli_merge;
mod cli_merge_tree;

use crate::store::DirObjectStore;
use anyhow::Result;
use clap::Parser;
use libort::hash::HashAlgo;
use std::ffi::OsString;
use std::path::PathBuf;

pub trait Cmd {
    fn exec(self, store: &DirObjectStore) -> Result<()>;
}

#[derive(Parser, Debug)]
#[command(author, about = "the ort three-way tree merge engine")]
pub struct OrtCliOpts {
    #[command(subcommand)]
    pub subcmd: OrtSubCmd,
    /// Directory holding loose tree objects (one file per object, named by
    /// hex oid). Created if it doesn't exist.
    #[arg(long, short = 'd', default_value = ".ort/objects")]
    pub object_dir: PathBuf,
    #[arg(long, value_enum, default_value = "sha1")]
    pub hash: HashAlgoArg,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum HashAlgoArg {
    Sha1,
    Sha256,
}

impl From<HashAlgoArg> for HashAlgo {
    fn from(arg: HashAlgoArg) -> Self {
        match arg {
            HashAlgoArg::Sha1 => HashAlgo::Sha1,
            HashAlgoArg::Sha256 => HashAlgo::Sha256,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum OrtSubCmd {
    /// Three-way merge three already-resolved trees (C2-C6, no recursive
    /// base reduction).
    MergeTree(cli_merge_tree::MergeTreeCliOpts),
    /// Merge two trees given an explicit list of merge bases, reducing
    /// multiple bases to a single virtual ancestor first (C7).
    Merge(cli_merge::MergeCliOpts),
}

pub fn run<T: Into<OsString> + Clone>(args: impl IntoIterator<Item = T>) -> Result<()> {
    let opts = OrtCliOpts::parse_from(args);
    let store = DirObjectStore::open(&opts.object_dir, opts.hash.into())?;
    match opts.subcmd {
        OrtSubCmd::MergeTree(cmd) => cmd.exec(&store),
        OrtSubCmd::Merge(cmd) => cmd.exec(&store),
    }
}
