// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use bon::Builder;
use flume::unbounded;
use ignore::{WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Options for parallel directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    /// Follow symbolic links
    #[builder(setters(name = with_follow_links), default = false)]
    follow_links: bool,
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Number of threads (None = auto-detect based on CPU count)
    #[builder(setters(name = with_threads))]
    threads: Option<usize>,
    /// Skip directories matching these names (exact match)
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
    /// Skip directories containing any of these files
    #[builder(setters(name = with_ignore_markers), default)]
    ignore_markers: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    #[must_use]
    pub const fn threads(&self) -> Option<usize> {
        self.threads
    }

    #[must_use]
    pub fn skip_dirs(&self) -> &[String] {
        &self.skip_dirs
    }

    #[must_use]
    pub fn ignore_markers(&self) -> &[String] {
        &self.ignore_markers
    }

    /// Options for locating ROS packages in a source checkout.
    ///
    /// - Ignores hidden directories (and thereby `.git`)
    /// - Never consults `.gitignore`: every tracked package counts
    /// - Honors `CATKIN_IGNORE`, `COLCON_IGNORE` and `AMENT_IGNORE`
    #[must_use]
    pub fn for_packages() -> Self {
        Self::builder()
            .with_skip_dirs(vec![".git".to_string()])
            .with_ignore_markers(vec![
                "CATKIN_IGNORE".to_string(),
                "COLCON_IGNORE".to_string(),
                "AMENT_IGNORE".to_string(),
            ])
            .build()
    }
}

/// Builds a `WalkBuilder` with the given options, using `filter_entry` for directory skipping.
pub(super) fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    // No ignore files of any kind; hidden entries are the only implicit filter.
    builder.standard_filters(false);
    builder.follow_links(options.follow_links());
    builder.hidden(!options.include_hidden());

    if let Some(threads) = options.threads() {
        builder.threads(threads);
    }

    // Use filter_entry for efficient directory skipping (evaluated BEFORE descending)
    if !options.skip_dirs().is_empty() || !options.ignore_markers().is_empty() {
        let skip_dirs: Arc<Vec<String>> = Arc::new(options.skip_dirs().to_vec());
        let markers: Arc<Vec<String>> = Arc::new(options.ignore_markers().to_vec());
        builder.filter_entry(move |entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            if let Some(name) = entry.file_name().to_str()
                && skip_dirs.iter().any(|skip| skip == name)
            {
                return false;
            }
            !markers.iter().any(|marker| entry.path().join(marker).exists())
        });
    }

    builder
}

/// Finds every directory that contains `marker`, without descending into
/// the directories it finds.
///
/// Traversal runs on `ignore::WalkParallel`; results are sorted so callers
/// see a deterministic order.
///
/// # Errors
///
/// Returns an error if the root directory does not exist.
///
/// # Example
/// ```no_run
/// use rosrel::utility::fs::walk::{find_marked_dirs, WalkOptions};
///
/// let packages = find_marked_dirs("/path/to/src", "package.xml", &WalkOptions::for_packages())?;
/// println!("Found {} packages", packages.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn find_marked_dirs<P: AsRef<Path>>(
    root: P,
    marker: &str,
    options: &WalkOptions,
) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.is_dir() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    // Unbounded: the receiver is drained only after `run` returns.
    let (tx, rx) = unbounded::<PathBuf>();
    let error_count = Arc::new(AtomicUsize::new(0));
    let marker: Arc<str> = Arc::from(marker);

    let parallel = build_walker(root, options).build_parallel();

    parallel.run(|| {
        let tx = tx.clone();
        let marker = Arc::clone(&marker);
        let error_count = Arc::clone(&error_count);

        Box::new(move |entry_result| match entry_result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_dir())
                    && entry.path().join(&*marker).is_file()
                {
                    let _ = tx.send(entry.path().to_path_buf());
                    return WalkState::Skip;
                }
                WalkState::Continue
            }
            Err(e) => {
                warn!(error = %e, "walk error");
                error_count.fetch_add(1, Ordering::Relaxed);
                WalkState::Continue
            }
        })
    });

    drop(tx);
    let mut found: Vec<PathBuf> = rx.iter().collect();
    found.sort();

    let errors = error_count.load(Ordering::Relaxed);
    if errors > 0 {
        warn!(root = %root.display(), errors, "directory walk finished with errors");
    }
    Ok(found)
}
