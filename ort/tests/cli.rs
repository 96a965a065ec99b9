//! End-to-end CLI tests, grounded on teacher's `bit!`-macro-driven
//! `bit/src/tests/cli_switch_tests.rs` (spawn the built binary, assert on its
//! stdout/exit code) but using `assert_cmd::Command::cargo_bin` directly
//! rather than reinstalling the binary on every test run.

use assert_cmd::Command;
use libort::hash::HashAlgo;
use libort::obj::{FileMode, Tree, TreeEntry};
use libort::path::OrtPath;
use libort::serialize::Serialize;
use pretty_assertions::assert_eq;
use std::fs;

/// Writes `tree` into `dir` using the exact on-disk format `DirObjectStore`
/// expects (one file per object, named by hex oid) and returns its hex oid.
fn seed_tree(dir: &std::path::Path, algo: HashAlgo, tree: &Tree) -> String {
    let mut bytes = vec![];
    tree.serialize(&mut bytes).unwrap();
    let oid = algo.hash(&bytes);
    if oid != algo.empty_tree_oid() {
        fs::write(dir.join(oid.to_hex()), &bytes).unwrap();
    }
    oid.to_hex()
}

#[test]
fn merge_tree_clean_add_on_one_side() {
    let dir = tempfile::tempdir().unwrap();
    let algo = HashAlgo::Sha1;
    let empty = algo.empty_tree_oid().to_hex();

    let mut side2 = Tree::empty();
    side2.entries.insert(TreeEntry::new(FileMode::Reg, OrtPath::intern("a"), algo.hash(b"hello")));
    let side2_oid = seed_tree(dir.path(), algo, &side2);

    let assert = Command::cargo_bin("ort")
        .unwrap()
        .args(["--object-dir", dir.path().to_str().unwrap(), "merge-tree", &empty, &empty, &side2_oid])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.trim(), side2_oid);
}

#[test]
fn merge_tree_modify_delete_conflict_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let algo = HashAlgo::Sha1;

    let mut base = Tree::empty();
    base.entries.insert(TreeEntry::new(FileMode::Reg, OrtPath::intern("a"), algo.hash(b"original")));
    let base_oid = seed_tree(dir.path(), algo, &base);

    let mut side1 = Tree::empty();
    side1.entries.insert(TreeEntry::new(FileMode::Reg, OrtPath::intern("a"), algo.hash(b"modified")));
    let side1_oid = seed_tree(dir.path(), algo, &side1);

    let side2_oid = algo.empty_tree_oid().to_hex();

    Command::cargo_bin("ort")
        .unwrap()
        .args(["--object-dir", dir.path().to_str().unwrap(), "merge-tree", &base_oid, &side1_oid, &side2_oid])
        .assert()
        .failure()
        .code(1);
}
