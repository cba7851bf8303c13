// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::walk::{WalkOptions, find_marked_dirs};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}

fn relative(root: &Path, found: &[std::path::PathBuf]) -> Vec<String> {
    found
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().display().to_string())
        .collect()
}

#[test]
fn test_find_marked_dirs_sorted() {
    let temp = temp_dir();
    touch(&temp.path().join("zeta/package.xml"));
    touch(&temp.path().join("alpha/package.xml"));
    touch(&temp.path().join("group/mid/package.xml"));
    touch(&temp.path().join("README.md"));

    let found = find_marked_dirs(temp.path(), "package.xml", &WalkOptions::for_packages()).unwrap();
    assert_eq!(
        relative(temp.path(), &found),
        vec!["alpha", "group/mid", "zeta"]
    );
}

#[test]
fn test_find_marked_dirs_stops_at_first_marker() {
    let temp = temp_dir();
    touch(&temp.path().join("outer/package.xml"));
    touch(&temp.path().join("outer/test/fixture/package.xml"));

    let found = find_marked_dirs(temp.path(), "package.xml", &WalkOptions::for_packages()).unwrap();
    assert_eq!(relative(temp.path(), &found), vec!["outer"]);
}

#[test]
fn test_find_marked_dirs_root_is_a_package() {
    let temp = temp_dir();
    touch(&temp.path().join("package.xml"));
    touch(&temp.path().join("nested/package.xml"));

    let found = find_marked_dirs(temp.path(), "package.xml", &WalkOptions::for_packages()).unwrap();
    assert_eq!(found, vec![temp.path().to_path_buf()]);
}

#[test]
fn test_find_marked_dirs_honors_ignore_markers_and_hidden() {
    let temp = temp_dir();
    touch(&temp.path().join("kept/package.xml"));
    touch(&temp.path().join("skipped/package.xml"));
    touch(&temp.path().join("skipped/CATKIN_IGNORE"));
    touch(&temp.path().join("tree/COLCON_IGNORE"));
    touch(&temp.path().join("tree/deep/package.xml"));
    touch(&temp.path().join(".hidden/package.xml"));

    let found = find_marked_dirs(temp.path(), "package.xml", &WalkOptions::for_packages()).unwrap();
    assert_eq!(relative(temp.path(), &found), vec!["kept"]);
}

#[test]
fn test_find_marked_dirs_ignores_gitignore() {
    let temp = temp_dir();
    fs::write(temp.path().join(".gitignore"), "generated/\n").unwrap();
    touch(&temp.path().join("generated/package.xml"));

    let found = find_marked_dirs(temp.path(), "package.xml", &WalkOptions::for_packages()).unwrap();
    assert_eq!(relative(temp.path(), &found), vec!["generated"]);
}

#[test]
fn test_find_marked_dirs_missing_root() {
    let temp = temp_dir();
    let result = find_marked_dirs(
        temp.path().join("does-not-exist"),
        "package.xml",
        &WalkOptions::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_walk_options_max_depth() {
    let temp = temp_dir();
    touch(&temp.path().join("a/package.xml"));
    touch(&temp.path().join("b/c/d/package.xml"));

    let options = WalkOptions::builder().with_max_depth(1).build();
    let found = find_marked_dirs(temp.path(), "package.xml", &options).unwrap();
    assert_eq!(relative(temp.path(), &found), vec!["a"]);
}
