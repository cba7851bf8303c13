// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end release pipeline tests.
//!
//! Every test builds a throwaway upstream repository plus a release
//! repository whose `master` carries `tracks.toml`, then drives the
//! pipeline against them with the system `git`.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rosrel::config::ReleaseConfig;
use rosrel::config::tracks::TracksFile;
use rosrel::error::RelResult;
use rosrel::logging::progress::ProgressDisplay;
use rosrel::patch::{self, ExportOutcome, ImportOutcome, RemoveOutcome};
use rosrel::pipeline::{self, RunContext, RunReport, Stages};
use rosrel::resolve::RuleTable;
use tempfile::TempDir;

const RULES: &str = r#"
[rules.catkin]
ubuntu = []
debian = []

[rules.roscpp_core]
ubuntu = []
debian = []
"#;

// =============================================================================
// Helpers
// =============================================================================

fn git_output(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test User")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test User")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to run git")
}

/// Run git and return trimmed stdout, panicking on failure.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = git_output(dir, args);
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn git_ok(dir: &Path, args: &[&str]) -> bool {
    git_output(dir, args).status.success()
}

fn init_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "tag.gpgsign", "false"]);
}

fn package_xml(name: &str, version: &str, format: u32) -> String {
    let (open, depends) = match format {
        1 => (
            "<package>".to_string(),
            "  <build_depend>roscpp_core</build_depend>\n  <run_depend>roscpp_core</run_depend>\n",
        ),
        _ => (
            format!("<package format=\"{format}\">"),
            "  <depend>roscpp_core</depend>\n",
        ),
    };
    format!(
        r#"<?xml version="1.0"?>
{open}
  <name>{name}</name>
  <version>{version}</version>
  <description>A catkin (melodic) ROS package called '{name}'</description>
  <maintainer email="bar@baz.com">Bar</maintainer>
  <license file="LICENSE">BSD</license>
  <url type="bugtracker">https://github.com/ros/this/issues</url>
  <url type="repository">https://github.com/ros/this</url>
  <buildtool_depend>catkin</buildtool_depend>
{depends}</package>
"#
    )
}

/// Lay out a package the way real upstream repositories look, odd files included.
fn write_package(dir: &Path, name: &str, version: &str, format: u32) {
    fs::create_dir_all(dir.join("include/sym")).unwrap();
    fs::create_dir_all(dir.join("debian")).unwrap();
    fs::write(dir.join("package.xml"), package_xml(name, version, format)).unwrap();
    fs::write(dir.join(".cproject"), "").unwrap();
    fs::write(dir.join(".project"), "").unwrap();
    fs::write(dir.join("white space.txt~"), "").unwrap();
    fs::write(dir.join(format!("include/{name}.h")), "").unwrap();
    std::os::unix::fs::symlink(format!("../{name}.h"), dir.join(format!("include/sym/{name}.h")))
        .unwrap();
    fs::write(dir.join("debian/something.udev"), "").unwrap();
    fs::write(dir.join("LICENSE"), format!("{name} license\n")).unwrap();
}

struct Pkg {
    name: &'static str,
    format: u32,
    version: &'static str,
}

const fn pkg(name: &'static str, format: u32) -> Pkg {
    Pkg {
        name,
        format,
        version: "0.1.0",
    }
}

struct Fixture {
    temp: TempDir,
    upstream: PathBuf,
    release: PathBuf,
    /// Package directories relative to the upstream root.
    dirs: Vec<PathBuf>,
}

impl Fixture {
    /// Upstream with `packages` below their own directories.
    fn stack(packages: &[Pkg], platforms: &str) -> Self {
        Self::build(packages, false, platforms)
    }

    /// Upstream with a single package at the repository root.
    fn unary(package: Pkg) -> Self {
        Self::build(&[package], true, "ubuntu = [\"bionic\"]")
    }

    fn build(packages: &[Pkg], unary: bool, platforms: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let upstream = temp.path().join("upstream");
        let release = temp.path().join("release");

        init_repo(&upstream);
        fs::write(upstream.join("README.md"), "upstream\n").unwrap();
        git(&upstream, &["add", "-A"]);
        git(&upstream, &["commit", "-q", "-m", "Initial commit"]);
        git(&upstream, &["checkout", "-q", "-b", "melodic_devel"]);

        let mut dirs = Vec::new();
        for package in packages {
            let dir = if unary {
                PathBuf::new()
            } else {
                PathBuf::from(package.name)
            };
            write_package(&upstream.join(&dir), package.name, package.version, package.format);
            if unary {
                fs::create_dir_all(upstream.join(package.name)).unwrap();
            }
            dirs.push(dir);
        }
        git(&upstream, &["add", "-A"]);
        git(&upstream, &["commit", "-q", "-m", "Releasing version 0.1.0"]);
        git(&upstream, &["tag", "-a", "0.1.0", "-m", "Releasing version 0.1.0"]);

        init_repo(&release);
        let tracks = format!(
            "[tracks.melodic]\nvcs_uri = '{}'\ndevel_branch = \"melodic_devel\"\nros_distro = \"melodic\"\n\n[tracks.melodic.platforms]\n{platforms}\n",
            upstream.display()
        );
        fs::write(release.join("tracks.toml"), tracks).unwrap();
        git(&release, &["add", "tracks.toml"]);
        git(&release, &["commit", "-q", "-m", "Add release tracks"]);

        Self {
            temp,
            upstream,
            release,
            dirs,
        }
    }

    /// Bump every upstream manifest from `old` to `new` and tag the result.
    fn bump_version(&self, old: &str, new: &str) {
        for dir in &self.dirs {
            let manifest = self.upstream.join(dir).join("package.xml");
            let content = fs::read_to_string(&manifest).unwrap().replace(
                &format!("<version>{old}</version>"),
                &format!("<version>{new}</version>"),
            );
            fs::write(&manifest, content).unwrap();
        }
        let message = format!("Releasing version {new}");
        git(&self.upstream, &["add", "-A"]);
        git(&self.upstream, &["commit", "-q", "-m", &message]);
        git(&self.upstream, &["tag", "-a", new, "-m", &message]);
    }

    fn try_run(&self, stages: Stages) -> RelResult<RunReport> {
        let tracks = TracksFile::load_from_branch(&self.release, &ReleaseConfig::default())?;
        let track = tracks.track("melodic")?;
        let rules = RuleTable::parse(RULES, "rules.toml")?;
        let mut ctx = RunContext::new(&self.release).with_progress(ProgressDisplay::Hidden);
        pipeline::run(&mut ctx, "melodic", &track, stages, &rules)
    }

    fn run(&self, stages: Stages) -> RunReport {
        let report = self.try_run(stages).unwrap();
        assert!(report.is_success(), "failures: {:?}", report.failures);
        report
    }

    fn tags(&self) -> Vec<String> {
        git(&self.release, &["tag", "-l"])
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    fn has_tag(&self, name: &str) -> bool {
        self.tags().iter().any(|t| t == name)
    }

    fn has_file(&self, rev: &str, file: &str) -> bool {
        git_ok(&self.release, &["cat-file", "-e", &format!("{rev}:{file}")])
    }

    fn show(&self, rev: &str, file: &str) -> String {
        git(&self.release, &["show", &format!("{rev}:{file}")])
    }

    fn commit_on(&self, branch: &str, change: impl FnOnce(&Path), message: &str) {
        git(&self.release, &["checkout", "-q", branch]);
        change(&self.release);
        git(&self.release, &["add", "-A"]);
        git(&self.release, &["commit", "-q", "-m", message]);
        git(&self.release, &["checkout", "-q", "master"]);
    }

    fn assert_clean_on_master(&self) {
        assert_eq!(git(&self.release, &["rev-parse", "--abbrev-ref", "HEAD"]), "master");
        assert_eq!(git(&self.release, &["status", "--porcelain"]), "");
    }
}

// =============================================================================
// Unary repository
// =============================================================================

#[test]
fn unary_package_across_versions() {
    let fx = Fixture::unary(pkg("foo", 2));
    git(&fx.release, &["tag", "upstream/0.0.0@baz"]);

    let versions = ["0.1.0", "0.1.1", "0.2.0"];
    for (round, version) in versions.iter().enumerate() {
        if round > 0 {
            fx.bump_version(versions[round - 1], version);
        }

        let report = fx.run(Stages::all());
        assert_eq!(report.version.as_deref(), Some(*version));
        assert!(report.upstream.as_ref().is_some_and(|u| u.created));
        fx.assert_clean_on_master();

        assert!(fx.has_tag(&format!("upstream/{version}")));
        assert!(fx.has_tag(&format!("release/melodic/foo/{version}-1")));
        assert!(fx.has_tag(&format!("debian/ros-melodic-foo_{version}-1_bionic")));
        assert!(fx.has_tag("upstream/0.0.0@baz"));
        assert!(
            fx.show("upstream", "package.xml")
                .contains(&format!("<version>{version}</version>"))
        );

        let release = "release/melodic/foo";
        for file in ["white space.txt~", ".cproject", "debian/something.udev"] {
            assert!(fx.has_file(release, file), "{file} missing on {release}");
        }
        let symlink = git(&fx.release, &["ls-tree", release, "include/sym/foo.h"]);
        assert!(symlink.starts_with("120000"), "not a symlink: {symlink}");

        // Each round adds one patch that toggles the header.
        assert_eq!(fx.has_file(release, "include/foo.h"), round % 2 == 0);

        let debian = "debian/melodic/bionic/foo";
        assert!(fx.has_file(debian, "debian/control"));
        assert!(fx.has_file(debian, "debian/something.udev"));
        assert!(git_ok(&fx.release, &["rev-parse", "--verify", "refs/heads/patches/release/melodic/foo"]));
        assert!(git_ok(&fx.release, &["rev-parse", "--verify", &format!("refs/heads/patches/{debian}")]));

        if round == 0 {
            let before = fx.tags();
            let again = fx.run(Stages::all());
            assert_eq!(fx.tags(), before);
            assert!(again.upstream.as_ref().is_some_and(|u| !u.created));
            assert!(again.releases.iter().all(|r| r.new_tag.is_none()));
            assert!(again.distributions.iter().all(|d| !d.tagged));
        }

        git(&fx.release, &["checkout", "-q", release]);
        let header = fx.release.join("include/foo.h");
        if header.exists() {
            git(&fx.release, &["rm", "-q", "include/foo.h"]);
        } else {
            fs::write(&header, "").unwrap();
            git(&fx.release, &["add", "include/foo.h"]);
        }
        git(&fx.release, &["commit", "-q", "-m", "A release patch"]);
        let patched = git(&fx.release, &["rev-parse", "HEAD^{tree}"]);

        assert_eq!(patch::export(&fx.release, release).unwrap(), ExportOutcome::Exported(round + 1));
        assert_eq!(patch::export(&fx.release, release).unwrap(), ExportOutcome::UpToDate);
        assert_eq!(patch::remove(&fx.release, release).unwrap(), RemoveOutcome::Removed);
        assert!(fx.release.join("include/foo.h").exists());
        assert_eq!(patch::import(&fx.release, release).unwrap(), ImportOutcome::Applied(round + 1));
        assert_eq!(git(&fx.release, &["rev-parse", "HEAD^{tree}"]), patched);
        git(&fx.release, &["checkout", "-q", "master"]);
    }
}

// =============================================================================
// Multi-package repository
// =============================================================================

#[test]
fn stack_release_on_two_platforms() {
    let fx = Fixture::stack(
        &[pkg("foo", 1), pkg("bar_ros", 2), pkg("baz", 3)],
        "ubuntu = [\"bionic\"]\ndebian = [\"stretch\"]",
    );

    let report = fx.run(Stages::all());
    assert_eq!(report.releases.len(), 3);
    assert_eq!(report.distributions.len(), 6);
    fx.assert_clean_on_master();

    for name in ["foo", "bar_ros", "baz"] {
        let release = format!("release/melodic/{name}");
        assert!(fx.has_tag(&format!("{release}/0.1.0-1")));
        assert!(git_ok(&fx.release, &["rev-parse", "--verify", &format!("refs/heads/patches/{release}")]));
        assert!(
            fx.show(&release, "package.xml")
                .contains(&format!("<name>{name}</name>"))
        );
        assert!(!fx.has_file(&release, "README.md"));

        for codename in ["bionic", "stretch"] {
            let debian = format!("debian/melodic/{codename}/{name}");
            assert!(fx.has_tag(&format!(
                "debian/ros-melodic-{}_0.1.0-1_{codename}",
                name.replace('_', "-")
            )));
            assert!(git_ok(&fx.release, &["rev-parse", "--verify", &format!("refs/heads/patches/{debian}")]));

            let control = fx.show(&debian, "debian/control");
            assert!(control.contains(&format!("Source: ros-melodic-{}", name.replace('_', "-"))));
            assert!(!control.contains("\n\nHomepage:"));
            assert!(control.contains("Homepage: https://github.com/ros/this\n"));

            // Only format 3 manifests point the license at a file.
            let copyright = fx.show(&debian, "debian/copyright");
            assert_eq!(copyright.contains(&format!("{name} license")), name == "baz");

            let changelog = fx.show(&debian, "debian/changelog");
            assert!(changelog.starts_with(&format!(
                "ros-melodic-{} (0.1.0-1{codename}) {codename}; urgency=high",
                name.replace('_', "-")
            )));
        }
    }
}

#[test]
fn release_branch_commits_produce_new_increment() {
    let fx = Fixture::stack(&[pkg("foo", 2), pkg("bar_ros", 2)], "ubuntu = [\"bionic\"]");
    fx.run(Stages::all());

    fx.commit_on(
        "release/melodic/foo",
        |root| fs::write(root.join("README.md"), "release notes\n").unwrap(),
        "Add README",
    );

    let report = fx.run(Stages::RELEASE | Stages::DEBIAN);
    assert!(report.upstream.is_none());
    assert_eq!(report.version.as_deref(), Some("0.1.0"));
    fx.assert_clean_on_master();

    assert!(fx.has_tag("release/melodic/foo/0.1.0-1"));
    assert!(fx.has_tag("release/melodic/foo/0.1.0-2"));
    assert!(fx.has_tag("debian/ros-melodic-foo_0.1.0-2_bionic"));
    assert!(!fx.has_tag("release/melodic/bar_ros/0.1.0-2"));
    assert!(fx.has_file("release/melodic/foo/0.1.0-2", "README.md"));
    assert!(fx.has_file("debian/melodic/bionic/foo", "README.md"));

    let set = patch::load(&fx.release, "release/melodic/foo").unwrap().unwrap();
    assert_eq!(set.patch_names(), vec!["0001-Add-README.patch"]);
}

#[test]
fn debian_stage_alone_uses_latest_release() {
    let fx = Fixture::stack(&[pkg("foo", 2)], "ubuntu = [\"bionic\"]");
    fx.run(Stages::IMPORT | Stages::RELEASE);
    assert!(!fx.has_tag("debian/ros-melodic-foo_0.1.0-1_bionic"));

    let report = fx.run(Stages::DEBIAN);
    assert!(report.releases.is_empty());
    assert_eq!(report.distributions.len(), 1);
    assert!(fx.has_tag("debian/ros-melodic-foo_0.1.0-1_bionic"));
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn patch_conflict_only_fails_that_package() {
    let fx = Fixture::stack(&[pkg("foo", 2), pkg("bar_ros", 2)], "ubuntu = [\"bionic\"]");
    fx.run(Stages::all());

    fx.commit_on(
        "release/melodic/foo",
        |root| fs::write(root.join("include/foo.h"), "int foo();\n").unwrap(),
        "Declare foo",
    );
    let tip = git(&fx.release, &["rev-parse", "refs/heads/release/melodic/foo"]);

    fs::write(fx.upstream.join("foo/include/foo.h"), "long foo();\n").unwrap();
    fx.bump_version("0.1.0", "0.1.1");

    let report = fx.try_run(Stages::all()).unwrap();
    assert_eq!(report.failed_packages(), vec!["foo"]);
    assert_eq!(report.failures[0].stage, "release");
    fx.assert_clean_on_master();

    assert!(fx.has_tag("release/melodic/bar_ros/0.1.1-1"));
    assert!(fx.has_tag("debian/ros-melodic-bar-ros_0.1.1-1_bionic"));
    assert!(!fx.has_tag("release/melodic/foo/0.1.1-1"));
    assert!(!fx.has_tag("debian/ros-melodic-foo_0.1.1-1_bionic"));

    assert_eq!(git(&fx.release, &["rev-parse", "refs/heads/release/melodic/foo"]), tip);
    assert_eq!(fx.show("release/melodic/foo", "include/foo.h"), "int foo();");
    let set = patch::load(&fx.release, "release/melodic/foo").unwrap().unwrap();
    assert_eq!(set.meta.exported_tip, tip);
    assert_eq!(set.patch_names().len(), 1);
}

#[test]
fn removed_patches_return_on_next_release() {
    let fx = Fixture::stack(&[pkg("foo", 2)], "ubuntu = [\"bionic\"]");
    fx.run(Stages::all());

    let release = "release/melodic/foo";
    fx.commit_on(release, |root| fs::write(root.join("NOTES"), "local\n").unwrap(), "Add notes");
    assert_eq!(patch::export(&fx.release, release).unwrap(), ExportOutcome::Exported(1));
    assert_eq!(patch::remove(&fx.release, release).unwrap(), RemoveOutcome::Removed);
    assert!(!fx.has_file(release, "NOTES"));

    fx.bump_version("0.1.0", "0.1.1");
    fx.run(Stages::all());
    fx.assert_clean_on_master();

    assert!(fx.has_tag("release/melodic/foo/0.1.1-1"));
    assert!(fx.has_file(release, "NOTES"));
    assert!(fx.has_file("debian/melodic/bionic/foo", "NOTES"));
    let set = patch::load(&fx.release, release).unwrap().unwrap();
    assert_eq!(set.patch_names(), vec!["0001-Add-notes.patch"]);
}

#[test]
fn unresolvable_dependency_only_fails_that_package() {
    let fx = Fixture::stack(&[pkg("foo", 2), pkg("bar_ros", 2)], "ubuntu = [\"bionic\"]");
    let manifest = fx.upstream.join("foo/package.xml");
    let content = fs::read_to_string(&manifest)
        .unwrap()
        .replace("</package>", "  <depend>no_such_key</depend>\n</package>");
    fs::write(&manifest, content).unwrap();
    fx.bump_version("0.1.0", "0.1.1");

    let report = fx.try_run(Stages::all()).unwrap();
    assert_eq!(report.failed_packages(), vec!["foo"]);
    assert_eq!(report.failures[0].stage, "debian");
    assert!(report.failures[0].error.contains("no_such_key"), "{}", report.failures[0].error);
    fx.assert_clean_on_master();

    assert!(fx.has_tag("release/melodic/foo/0.1.1-1"));
    assert!(!fx.has_tag("debian/ros-melodic-foo_0.1.1-1_bionic"));
    assert!(fx.has_tag("release/melodic/bar_ros/0.1.1-1"));
    assert!(fx.has_tag("debian/ros-melodic-bar-ros_0.1.1-1_bionic"));
}

#[test]
fn inconsistent_versions_abort_import() {
    let fx = Fixture::stack(
        &[
            pkg("foo", 2),
            Pkg {
                name: "bar_ros",
                format: 2,
                version: "0.2.0",
            },
        ],
        "ubuntu = [\"bionic\"]",
    );

    let err = fx.try_run(Stages::all()).unwrap_err();
    assert!(err.to_string().contains("inconsistent package versions"), "{err}");
    assert!(!git_ok(&fx.release, &["rev-parse", "--verify", "refs/heads/upstream"]));
    assert!(fx.tags().is_empty());
    fx.assert_clean_on_master();
}

#[test]
fn generate_without_import_fails() {
    let fx = Fixture::stack(&[pkg("foo", 2)], "ubuntu = [\"bionic\"]");
    git(&fx.release, &["tag", "upstream/0.0.0@baz"]);

    let err = fx.try_run(Stages::RELEASE | Stages::DEBIAN).unwrap_err();
    assert!(err.to_string().contains("no upstream version"), "{err}");
}

#[test]
fn dirty_release_repository_is_rejected() {
    let fx = Fixture::stack(&[pkg("foo", 2)], "ubuntu = [\"bionic\"]");
    fs::write(fx.release.join("scratch.txt"), "").unwrap();

    assert!(fx.try_run(Stages::all()).is_err());
    assert!(fx.tags().is_empty());
}

// =============================================================================
// Binary
// =============================================================================

fn rosrel(fx: &Fixture, args: &[&str]) -> std::process::Output {
    let rules = fx.temp.path().join("rules.toml");
    fs::write(&rules, RULES).unwrap();
    Command::new(env!("CARGO_BIN_EXE_rosrel"))
        .arg("--repo")
        .arg(&fx.release)
        .arg("--rules")
        .arg(&rules)
        .args(args)
        .current_dir(fx.temp.path())
        .output()
        .expect("failed to run rosrel")
}

#[test]
fn cli_release_then_patch_export() {
    let fx = Fixture::unary(pkg("foo", 2));

    let output = rosrel(&fx, &["release", "melodic", "--quiet"]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(fx.has_tag("release/melodic/foo/0.1.0-1"));
    assert!(fx.has_tag("debian/ros-melodic-foo_0.1.0-1_bionic"));

    fx.commit_on(
        "release/melodic/foo",
        |root| fs::write(root.join("CHANGELOG.rst"), "changes\n").unwrap(),
        "Add changelog",
    );
    let output = rosrel(&fx, &["patch", "export", "-b", "release/melodic/foo"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let set = patch::load(&fx.release, "release/melodic/foo").unwrap().unwrap();
    assert_eq!(set.patch_names(), vec!["0001-Add-changelog.patch"]);
}

#[test]
fn cli_unknown_track_fails() {
    let fx = Fixture::unary(pkg("foo", 2));
    let output = rosrel(&fx, &["release", "noetic"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("noetic"));
}
