// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{DependencyResolver, ReleaseResolver, RuleTable};
use crate::error::RelError;

const RULES: &str = r#"
[rules.catkin]
ubuntu = []
debian = []

[rules.roscpp_core]
ubuntu = ["ros-melodic-roscpp-core"]

[rules.boost]
ubuntu = { bionic = ["libboost-all-dev"], focal = ["libboost1.71-all-dev"] }
"#;

#[test]
fn test_rule_table_lookup() {
    let table = RuleTable::parse(RULES, "rules.toml").unwrap();
    assert_eq!(table.len(), 3);

    assert_eq!(table.resolve("catkin", "debian", "stretch"), Some(vec![]));
    assert_eq!(
        table.resolve("roscpp_core", "ubuntu", "anything"),
        Some(vec!["ros-melodic-roscpp-core".to_string()])
    );
    assert_eq!(
        table.resolve("boost", "ubuntu", "focal"),
        Some(vec!["libboost1.71-all-dev".to_string()])
    );
    assert_eq!(table.resolve("boost", "ubuntu", "xenial"), None);
    assert_eq!(table.resolve("roscpp_core", "debian", "stretch"), None);
    assert_eq!(table.resolve("unknown", "ubuntu", "bionic"), None);
}

#[test]
fn test_rule_table_rejects_garbage() {
    assert!(RuleTable::parse("[rules\n", "rules.toml").is_err());
}

#[test]
fn test_empty_table() {
    let table = RuleTable::default();
    assert!(table.is_empty());
    assert_eq!(table.resolve("catkin", "ubuntu", "bionic"), None);
}

#[test]
fn test_release_resolver_prefers_released_packages() {
    let table = RuleTable::parse(RULES, "rules.toml").unwrap();
    let resolver = ReleaseResolver::new(&table, "melodic", ["bar_ros".to_string()]);

    let resolved = resolver
        .resolve_all("foo", &["catkin", "bar_ros", "boost", "boost"], "ubuntu", "bionic")
        .unwrap();
    assert_eq!(resolved, vec!["ros-melodic-bar-ros", "libboost-all-dev"]);
}

#[test]
fn test_release_resolver_reports_missing_key() {
    let table = RuleTable::parse(RULES, "rules.toml").unwrap();
    let resolver = ReleaseResolver::new(&table, "melodic", Vec::new());

    let err = resolver
        .resolve_all("foo", &["roscpp_core"], "debian", "stretch")
        .unwrap_err();
    assert!(matches!(err, RelError::Pipeline(_)));
    insta::assert_snapshot!(
        err.to_string(),
        @"cannot resolve dependency 'roscpp_core' of 'foo' for debian:stretch"
    );
}
