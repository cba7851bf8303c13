// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Debian packaging files rendered from package metadata.
//!
//! Rendering is pure; the same metadata always produces the same bytes.

use std::fmt::Write as _;
use std::path::Path;

/// Minimum debhelper version, also written to `debian/compat`.
pub const DEBHELPER_COMPAT: u32 = 9;

/// License name with its full text when the manifest points at a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseText {
    pub name: String,
    pub text: Option<String>,
}

/// Everything the packaging files are rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianMetadata {
    /// Binary and source package name, `ros-<distro>-<san>`.
    pub name: String,
    /// Debian version, `<version>-<inc><codename>`.
    pub version: String,
    pub distro: String,
    pub codename: String,
    pub maintainer: String,
    pub description: String,
    pub homepage: Option<String>,
    pub build_depends: Vec<String>,
    pub depends: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub licenses: Vec<LicenseText>,
    /// RFC 2822 date for the changelog entry.
    pub date: String,
}

/// A rendered file relative to the package root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: &'static str,
    pub content: String,
    pub executable: bool,
}

fn field_list(head: &[&str], rest: &[String]) -> String {
    head.iter()
        .copied()
        .chain(rest.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

impl DebianMetadata {
    #[must_use]
    pub fn control(&self) -> String {
        let debhelper = format!("debhelper (>= {DEBHELPER_COMPAT}.0.0)");
        let mut out = String::new();
        let _ = writeln!(out, "Source: {}", self.name);
        out.push_str("Section: misc\nPriority: optional\n");
        let _ = writeln!(out, "Maintainer: {}", self.maintainer);
        let _ = writeln!(out, "Build-Depends: {}", field_list(&[&debhelper], &self.build_depends));
        if let Some(homepage) = &self.homepage {
            let _ = writeln!(out, "Homepage: {homepage}");
        }
        out.push_str("Standards-Version: 3.9.2\n\n");

        let _ = writeln!(out, "Package: {}", self.name);
        out.push_str("Architecture: any\n");
        let _ = writeln!(
            out,
            "Depends: {}",
            field_list(&["${shlibs:Depends}", "${misc:Depends}"], &self.depends)
        );
        if !self.conflicts.is_empty() {
            let _ = writeln!(out, "Conflicts: {}", self.conflicts.join(", "));
        }
        if !self.replaces.is_empty() {
            let _ = writeln!(out, "Replaces: {}", self.replaces.join(", "));
        }
        let description = if self.description.is_empty() {
            format!("ROS package {}", self.name)
        } else {
            self.description.clone()
        };
        let _ = writeln!(out, "Description: {description}");
        out
    }

    #[must_use]
    pub fn changelog(&self) -> String {
        format!(
            "{name} ({version}) {codename}; urgency=high\n\n  * Autogenerated, no changelog for this version found.\n\n -- {maintainer}  {date}\n\n",
            name = self.name,
            version = self.version,
            codename = self.codename,
            maintainer = self.maintainer,
            date = self.date,
        )
    }

    #[must_use]
    pub fn copyright(&self) -> String {
        let mut out = String::from(
            "Format: https://www.debian.org/doc/packaging-manuals/copyright-format/1.0/\n",
        );
        let _ = writeln!(out, "Upstream-Name: {}", self.name);
        if let Some(homepage) = &self.homepage {
            let _ = writeln!(out, "Source: {homepage}");
        }
        for license in &self.licenses {
            out.push('\n');
            out.push_str("Files: *\nCopyright: See package.xml\n");
            let _ = writeln!(out, "License: {}", license.name);
            if let Some(text) = &license.text {
                for line in text.lines() {
                    if line.trim().is_empty() {
                        out.push_str(" .\n");
                    } else {
                        let _ = writeln!(out, " {line}");
                    }
                }
            }
        }
        out
    }

    #[must_use]
    pub fn rules(&self) -> String {
        format!(
            "#!/usr/bin/make -f\n\
             # -*- makefile -*-\n\
             \n\
             export DH_OPTIONS=-v --buildsystem=cmake\n\
             \n\
             %:\n\
             \tdh $@\n\
             \n\
             override_dh_auto_configure:\n\
             \tdh_auto_configure -- \\\n\
             \t\t-DCMAKE_INSTALL_PREFIX=\"/opt/ros/{distro}\" \\\n\
             \t\t-DCMAKE_PREFIX_PATH=\"/opt/ros/{distro}\"\n",
            distro = self.distro,
        )
    }

    /// Every packaging file in write order.
    #[must_use]
    pub fn files(&self) -> Vec<RenderedFile> {
        let file = |path, content, executable| RenderedFile {
            path,
            content,
            executable,
        };
        vec![
            file("debian/changelog", self.changelog(), false),
            file("debian/compat", format!("{DEBHELPER_COMPAT}\n"), false),
            file("debian/control", self.control(), false),
            file("debian/copyright", self.copyright(), false),
            file("debian/rules", self.rules(), true),
            file("debian/source/format", "3.0 (quilt)\n".to_string(), false),
        ]
    }

    /// Write the packaging files below `root`, leaving other files under
    /// `debian/` alone.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a file cannot be written.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        for rendered in self.files() {
            let path = root.join(rendered.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered.content.as_bytes())?;
            #[cfg(unix)]
            if rendered.executable {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
            }
        }
        Ok(())
    }
}
