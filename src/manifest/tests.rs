// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::discover::discover_packages;
use super::{License, Package, Person};
use crate::error::{ManifestError, RelError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn manifest(name: &str, format: u32) -> String {
    let catkin = if format > 1 {
        "<buildtool_depend>catkin</buildtool_depend>".to_string()
    } else {
        "<build_depend>catkin</build_depend>\n  <run_depend>catkin</run_depend>".to_string()
    };
    let depend_tag = if format > 1 { "depend" } else { "run_depend" };
    let license_attr = if format > 2 { r#" file="LICENSE""# } else { "" };
    format!(
        r#"<?xml version="1.0"?>
<package format="{format}">
  <name>{name}</name>
  <version>0.1.0</version>
  <description>A catkin (melodic) ROS package called '{name}'</description>
  <maintainer email="bar@baz.com">Bar</maintainer>
  <license{license_attr}>BSD</license>

  <url type="bugtracker">https://github.com/ros/this/issues</url>
  <url type="repository">https://github.com/ros/this</url>

  {catkin}

  <!-- required for messages generated by gencpp -->
  <{depend_tag}>roscpp_core</{depend_tag}>
</package>
"#
    )
}

fn write_package(root: &Path, dir: &str, name: &str, format: u32) {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("package.xml"), manifest(name, format)).unwrap();
}

#[test]
fn test_parse_format_1() {
    let package = Package::parse(&manifest("foo", 1), "foo/package.xml").unwrap();

    assert_eq!(package.name, "foo");
    assert_eq!(package.version, "0.1.0");
    assert_eq!(package.format, 1);
    assert_eq!(
        package.maintainers,
        vec![Person {
            name: "Bar".to_string(),
            email: Some("bar@baz.com".to_string()),
        }]
    );
    assert_eq!(package.build_depends(), vec!["catkin"]);
    assert_eq!(package.run_depends(), vec!["catkin", "roscpp_core"]);
}

#[test]
fn test_parse_format_2_depend_expands() {
    let package = Package::parse(&manifest("bar_ros", 2), "package.xml").unwrap();

    assert_eq!(package.format, 2);
    assert_eq!(package.build_depends(), vec!["catkin", "roscpp_core"]);
    assert_eq!(package.run_depends(), vec!["roscpp_core"]);
    assert_eq!(
        package.licenses,
        vec![License {
            name: "BSD".to_string(),
            file: None,
        }]
    );
}

#[test]
fn test_license_file_only_from_format_3() {
    let format3 = Package::parse(&manifest("baz", 3), "package.xml").unwrap();
    assert_eq!(format3.licenses[0].file.as_deref(), Some("LICENSE"));

    let format2 = Package::parse(
        &manifest("baz", 2).replace("<license>", r#"<license file="LICENSE">"#),
        "package.xml",
    )
    .unwrap();
    assert_eq!(format2.licenses[0].file, None);
}

#[test]
fn test_format_1_ignores_format_2_tags() {
    let xml = r#"<package><name>a</name><version>1.0.0</version>
        <exec_depend>ignored</exec_depend><run_depend>kept</run_depend></package>"#;
    let package = Package::parse(xml, "package.xml").unwrap();
    assert_eq!(package.format, 1);
    assert_eq!(package.run_depends(), vec!["kept"]);
}

#[test]
fn test_homepage_falls_back_to_repository() {
    let package = Package::parse(&manifest("foo", 2), "package.xml").unwrap();
    assert_eq!(package.homepage(), Some("https://github.com/ros/this"));
    assert_eq!(package.url("bugtracker"), Some("https://github.com/ros/this/issues"));

    let with_site = manifest("foo", 2).replace(
        "<url type=\"bugtracker\">",
        "<url>https://wiki.ros.org/foo</url>\n  <url type=\"bugtracker\">",
    );
    let package = Package::parse(&with_site, "package.xml").unwrap();
    assert_eq!(package.homepage(), Some("https://wiki.ros.org/foo"));
}

#[test]
fn test_description_whitespace_collapsed() {
    let xml = "<package format=\"2\"><name>a</name><version>1.0.0</version>\
               <description>\n  multi\n    line\n</description></package>";
    let package = Package::parse(xml, "package.xml").unwrap();
    assert_eq!(package.description, "multi line");
}

#[test]
fn test_missing_version() {
    let err = Package::parse("<package><name>a</name></package>", "a/package.xml").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"'a/package.xml' has no <version>");
}

#[test]
fn test_invalid_version() {
    let err = Package::parse(
        "<package><name>a</name><version>1.0</version></package>",
        "package.xml",
    )
    .unwrap_err();
    assert!(matches!(err, ManifestError::InvalidVersion { .. }));
}

#[test]
fn test_invalid_format() {
    for raw in ["0", "two"] {
        let xml = format!(r#"<package format="{raw}"><name>a</name><version>1.0.0</version></package>"#);
        let err = Package::parse(&xml, "package.xml").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidFormat { ref format, .. } if format == raw));
    }
}

#[test]
fn test_newer_format_follows_format_3_rules() {
    let package = Package::parse(&manifest("baz", 4), "package.xml").unwrap();
    assert_eq!(package.format, 4);
    assert_eq!(package.licenses[0].file.as_deref(), Some("LICENSE"));
    assert!(package.dependencies.exec.iter().any(|d| d == "roscpp_core"));
}

#[test]
fn test_malformed_xml() {
    let err = Package::parse("<package><name>a</package>", "package.xml").unwrap_err();
    assert!(matches!(err, ManifestError::Xml { .. }));
}

#[test]
fn test_wrong_root_element() {
    let err = Package::parse("<manifest/>", "package.xml").unwrap_err();
    assert!(err.to_string().contains("<package>"), "{err}");
}

#[test]
fn test_discover_sorted_by_name() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), "foo", "foo", 1);
    write_package(temp.path(), "bar_ros", "bar_ros", 2);
    write_package(temp.path(), "nested/baz", "baz", 3);

    let found = discover_packages(temp.path(), &[]).unwrap();
    let summary: Vec<(&str, &str)> = found
        .iter()
        .map(|p| (p.package.name.as_str(), p.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![("bar_ros", "bar_ros"), ("baz", "nested/baz"), ("foo", "foo")]
    );
}

#[test]
fn test_discover_root_package() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), "", "foo", 1);
    fs::create_dir_all(temp.path().join("foo")).unwrap();

    let found = discover_packages(temp.path(), &[]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, "");
}

#[test]
fn test_discover_ignore_patterns() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), "foo", "foo", 2);
    write_package(temp.path(), "foo_msgs", "foo_msgs", 2);

    let found = discover_packages(temp.path(), &["*_msgs".to_string()]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].package.name, "foo");
}

#[test]
fn test_discover_duplicate_names() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), "a", "foo", 2);
    write_package(temp.path(), "b", "foo", 2);

    let err = discover_packages(temp.path(), &[]).unwrap_err();
    assert!(matches!(err, RelError::Manifest(_)), "{err}");
}
