// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::render::{DebianMetadata, LicenseText};
use tempfile::TempDir;

fn metadata() -> DebianMetadata {
    DebianMetadata {
        name: "ros-melodic-bar-ros".to_string(),
        version: "0.1.0-1bionic".to_string(),
        distro: "melodic".to_string(),
        codename: "bionic".to_string(),
        maintainer: "Bar <bar@baz.com>".to_string(),
        description: "A catkin (melodic) ROS package called 'bar_ros'".to_string(),
        homepage: Some("https://github.com/ros/this".to_string()),
        build_depends: vec!["ros-melodic-catkin".to_string()],
        depends: Vec::new(),
        conflicts: Vec::new(),
        replaces: Vec::new(),
        licenses: vec![LicenseText {
            name: "BSD".to_string(),
            text: None,
        }],
        date: "Mon, 05 Oct 2026 12:00:00 +0000".to_string(),
    }
}

const CONTROL: &str = "\
Source: ros-melodic-bar-ros
Section: misc
Priority: optional
Maintainer: Bar <bar@baz.com>
Build-Depends: debhelper (>= 9.0.0), ros-melodic-catkin
Homepage: https://github.com/ros/this
Standards-Version: 3.9.2

Package: ros-melodic-bar-ros
Architecture: any
Depends: ${shlibs:Depends}, ${misc:Depends}
Description: A catkin (melodic) ROS package called 'bar_ros'
";

#[test]
fn test_control_without_conflicts_or_replaces() {
    let control = metadata().control();
    assert_eq!(control, CONTROL);
    assert!(!control.contains("\n\nHomepage:"));
    assert!(!control.contains("Conflicts:"));
}

#[test]
fn test_control_optional_fields() {
    let mut meta = metadata();
    meta.homepage = None;
    meta.conflicts = vec!["ros-melodic-old-bar".to_string()];
    meta.replaces = vec!["ros-melodic-old-bar".to_string()];
    meta.depends = vec!["libfoo".to_string(), "libbar".to_string()];

    let control = meta.control();
    assert!(!control.contains("Homepage:"));
    assert!(control.contains("Depends: ${shlibs:Depends}, ${misc:Depends}, libfoo, libbar\n"));
    assert!(control.contains(
        "Conflicts: ros-melodic-old-bar\nReplaces: ros-melodic-old-bar\nDescription:"
    ));
    assert!(!control.contains("\n\n\n"));
}

#[test]
fn test_changelog_entry() {
    let changelog = metadata().changelog();
    assert!(changelog.starts_with("ros-melodic-bar-ros (0.1.0-1bionic) bionic; urgency=high\n"));
    assert!(changelog.contains("\n -- Bar <bar@baz.com>  Mon, 05 Oct 2026 12:00:00 +0000\n"));
}

#[test]
fn test_copyright_license_text() {
    let without_text = metadata().copyright();
    assert!(without_text.contains("License: BSD\n"));
    assert!(!without_text.contains("bar_ros license"));

    let mut meta = metadata();
    meta.licenses[0].text = Some("bar_ros license\n\nsecond paragraph\n".to_string());
    let copyright = meta.copyright();
    assert!(copyright.contains("License: BSD\n bar_ros license\n .\n second paragraph\n"));
}

#[test]
fn test_write_to_keeps_overlay() {
    let temp = TempDir::new().unwrap();
    let debian = temp.path().join("debian");
    std::fs::create_dir_all(&debian).unwrap();
    std::fs::write(debian.join("something.udev"), "").unwrap();

    metadata().write_to(temp.path()).unwrap();

    assert!(debian.join("something.udev").exists());
    assert_eq!(
        std::fs::read_to_string(debian.join("control")).unwrap(),
        CONTROL
    );
    assert_eq!(
        std::fs::read_to_string(debian.join("source/format")).unwrap(),
        "3.0 (quilt)\n"
    );
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(debian.join("rules")).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[test]
fn test_rendering_is_deterministic() {
    assert_eq!(metadata().files(), metadata().files());
    let paths: Vec<&str> = metadata().files().iter().map(|f| f.path).collect();
    assert_eq!(
        paths,
        vec![
            "debian/changelog",
            "debian/compat",
            "debian/control",
            "debian/copyright",
            "debian/rules",
            "debian/source/format",
        ]
    );
}
