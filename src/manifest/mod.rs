// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Package manifest (`package.xml`) model and parser.
//!
//! ```text
//! <package format="N">
//!   name, version, description, maintainer(email), license(file), url(type)
//!
//!   format 1:  build_depend  buildtool_depend  run_depend
//!   format 2+: depend  build_depend  buildtool_depend  exec_depend
//!              build_export_depend  buildtool_export_depend
//!   format 3+: <license file="..."> is honored
//! ```
//!
//! `depend` expands to build, build-export and exec dependencies.

pub mod discover;

#[cfg(test)]
mod tests;

use std::path::Path;
use xot::{NameId, Node, Xot};

use crate::error::{ManifestError, RelResult};

/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.xml";

/// Maintainer or author entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{email}>", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// License name plus, for format 3 and later, the file carrying its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub name: String,
    pub file: Option<String>,
}

/// `<url type="...">` entry; `kind` defaults to `website`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub kind: String,
    pub url: String,
}

/// Dependency declarations, already normalized across formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub build: Vec<String>,
    pub buildtool: Vec<String>,
    pub build_export: Vec<String>,
    pub buildtool_export: Vec<String>,
    pub exec: Vec<String>,
    pub test: Vec<String>,
}

/// A parsed package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub format: u32,
    pub description: String,
    pub maintainers: Vec<Person>,
    pub authors: Vec<Person>,
    pub licenses: Vec<License>,
    pub urls: Vec<Url>,
    pub dependencies: Dependencies,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
}

impl Package {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise see [`Self::parse`].
    pub fn from_file(path: &Path) -> RelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content, &path.display().to_string())?)
    }

    /// Parse manifest XML; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns a `ManifestError` for malformed XML, an unsupported `format`,
    /// a missing `name`/`version`, or a version that is not `X.Y.Z`.
    pub fn parse(xml: &str, origin: &str) -> Result<Self, ManifestError> {
        let mut reader = Reader::new(origin);
        reader.read(xml)
    }

    /// Dependencies needed to build: buildtool first, then build.
    #[must_use]
    pub fn build_depends(&self) -> Vec<&str> {
        dedup(
            self.dependencies
                .buildtool
                .iter()
                .chain(&self.dependencies.build),
        )
    }

    /// Dependencies needed at runtime.
    #[must_use]
    pub fn run_depends(&self) -> Vec<&str> {
        dedup(
            self.dependencies
                .exec
                .iter()
                .chain(&self.dependencies.build_export)
                .chain(&self.dependencies.buildtool_export),
        )
    }

    /// First URL of `kind`.
    #[must_use]
    pub fn url(&self, kind: &str) -> Option<&str> {
        self.urls
            .iter()
            .find(|u| u.kind == kind)
            .map(|u| u.url.as_str())
    }

    /// Project homepage: the website URL, else the repository URL.
    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        self.url("website").or_else(|| self.url("repository"))
    }
}

fn dedup<'a>(names: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for name in names {
        if !out.contains(&name.as_str()) {
            out.push(name);
        }
    }
    out
}

/// Check `major.minor.patch` with numeric components.
fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Element names the parser dispatches on.
struct Names {
    format: NameId,
    email: NameId,
    file: NameId,
    kind: NameId,
}

struct Reader<'a> {
    origin: &'a str,
    xot: Xot,
}

impl<'a> Reader<'a> {
    fn new(origin: &'a str) -> Self {
        Self {
            origin,
            xot: Xot::new(),
        }
    }

    fn xml_error(&self, message: impl std::fmt::Display) -> ManifestError {
        ManifestError::Xml {
            path: self.origin.to_string(),
            message: message.to_string(),
        }
    }

    fn read(&mut self, xml: &str) -> Result<Package, ManifestError> {
        let root = self.xot.parse(xml).map_err(|e| self.xml_error(e))?;
        let package = self
            .xot
            .document_element(root)
            .map_err(|e| self.xml_error(e))?;
        if self.local_name(package) != Some("package") {
            return Err(self.xml_error("root element is not <package>"));
        }

        let names = Names {
            format: self.xot.add_name("format"),
            email: self.xot.add_name("email"),
            file: self.xot.add_name("file"),
            kind: self.xot.add_name("type"),
        };

        let format = match self.xot.get_attribute(package, names.format) {
            None => 1,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n @ 1..) => n,
                _ => {
                    return Err(ManifestError::InvalidFormat {
                        path: self.origin.to_string(),
                        format: raw.to_string(),
                    });
                }
            },
        };

        let mut result = Package {
            name: String::new(),
            version: String::new(),
            format,
            description: String::new(),
            maintainers: Vec::new(),
            authors: Vec::new(),
            licenses: Vec::new(),
            urls: Vec::new(),
            dependencies: Dependencies::default(),
            conflicts: Vec::new(),
            replaces: Vec::new(),
        };

        let children: Vec<Node> = self.xot.children(package).collect();
        for child in children {
            let Some(tag) = self.local_name(child).map(ToString::to_string) else {
                continue;
            };
            let text = self.text(child);
            let deps = &mut result.dependencies;
            match (tag.as_str(), format) {
                ("name", _) => result.name = text,
                ("version", _) => result.version = text,
                ("description", _) => result.description = collapse_whitespace(&text),
                ("maintainer", _) => result.maintainers.push(Person {
                    name: text,
                    email: self.attribute(child, names.email),
                }),
                ("author", _) => result.authors.push(Person {
                    name: text,
                    email: self.attribute(child, names.email),
                }),
                ("license", _) => result.licenses.push(License {
                    name: text,
                    file: if format >= 3 {
                        self.attribute(child, names.file)
                    } else {
                        None
                    },
                }),
                ("url", _) => result.urls.push(Url {
                    kind: self
                        .attribute(child, names.kind)
                        .unwrap_or_else(|| "website".to_string()),
                    url: text,
                }),
                ("build_depend", _) => deps.build.push(text),
                ("buildtool_depend", _) => deps.buildtool.push(text),
                ("test_depend", _) => deps.test.push(text),
                ("conflict", _) => result.conflicts.push(text),
                ("replace", _) => result.replaces.push(text),
                ("run_depend", 1) => {
                    deps.build_export.push(text.clone());
                    deps.exec.push(text);
                }
                ("depend", 2..) => {
                    deps.build.push(text.clone());
                    deps.build_export.push(text.clone());
                    deps.exec.push(text);
                }
                ("exec_depend", 2..) => deps.exec.push(text),
                ("build_export_depend", 2..) => deps.build_export.push(text),
                ("buildtool_export_depend", 2..) => deps.buildtool_export.push(text),
                _ => {}
            }
        }

        if result.name.is_empty() {
            return Err(self.missing("name"));
        }
        if result.version.is_empty() {
            return Err(self.missing("version"));
        }
        if !is_valid_version(&result.version) {
            return Err(ManifestError::InvalidVersion {
                path: self.origin.to_string(),
                version: result.version,
            });
        }
        Ok(result)
    }

    fn missing(&self, field: &'static str) -> ManifestError {
        ManifestError::MissingField {
            path: self.origin.to_string(),
            field,
        }
    }

    fn local_name(&self, node: Node) -> Option<&str> {
        let element = self.xot.element(node)?;
        Some(self.xot.local_name_str(element.name()))
    }

    fn attribute(&self, node: Node, name: NameId) -> Option<String> {
        self.xot
            .get_attribute(node, name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Concatenated, trimmed text of an element and its descendants.
    fn text(&self, node: Node) -> String {
        let mut text = String::new();
        for descendant in self.xot.descendants(node) {
            if let Some(part) = self.xot.text_str(descendant) {
                text.push_str(part);
            }
        }
        text.trim().to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
