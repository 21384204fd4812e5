//! Listing resolver for quickfiler.
//!
//! Given a directory and a query, produces the ordered rows the picker shows for it:
//! directories first, then matching files, then the FILE section (new file, new folder and,
//! while a copy is pending, paste).
//!
//! Every resolution runs three pieces of work concurrently on scoped threads:
//! - a non-recursive search for the immediate files (`*`),
//! - a recursive search for the expanded query,
//! - a directory read classifying immediate entries as directories.
//!
//! All of them share one [CancelToken]. A cancelled resolution yields [FilerError::Cancelled]
//! and nothing else.

use crate::core::fm::{CancelToken, FileSystem};
use crate::core::item::ListItem;
use crate::core::oracle::IgnoreOracle;
use crate::core::query::{IMMEDIATE_PATTERN, QueryOptions, search_pattern};
use crate::core::workspace::Workspace;
use crate::error::{FilerError, Result};

use log::debug;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// One listing request: which directory, which query, and whether a copy is pending.
///
/// `root == None` asks for the workspace-root view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRequest {
    pub root: Option<PathBuf>,
    pub query: Option<String>,
    pub copy_target: Option<PathBuf>,
    pub options: QueryOptions,
}

impl ListingRequest {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn with_copy_target(mut self, target: Option<PathBuf>) -> Self {
        self.copy_target = target;
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// The same request rooted at `root`.
    pub(crate) fn at(&self, root: &Path) -> Self {
        Self {
            root: Some(root.to_path_buf()),
            ..self.clone()
        }
    }
}

/// Everything a resolution depends on besides the request itself.
pub struct Resolver {
    fs: Arc<dyn FileSystem>,
    oracle: Option<Arc<dyn IgnoreOracle>>,
    exclude: Option<String>,
    workspace: Arc<Workspace>,
    max_results: usize,
}

impl Resolver {
    pub fn new(fs: Arc<dyn FileSystem>, workspace: Arc<Workspace>) -> Self {
        Self {
            fs,
            oracle: None,
            exclude: None,
            workspace,
            max_results: crate::utils::DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_oracle(mut self, oracle: Option<Arc<dyn IgnoreOracle>>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<String>) -> Self {
        self.exclude = exclude.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    #[inline]
    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    #[inline]
    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Resolves the rows for `request.root`. An absent root resolves to no rows.
    pub fn resolve(&self, request: &ListingRequest, cancel: &CancelToken) -> Result<Vec<ListItem>> {
        let Some(root) = request.root.as_deref() else {
            return Ok(Vec::new());
        };
        let started = Instant::now();
        let pattern = search_pattern(request.query.as_deref(), request.options);
        let exclude = self.exclude.as_deref();

        let (current, matched, dirs) = thread::scope(|s| {
            let current = s.spawn(|| {
                self.fs
                    .search(root, IMMEDIATE_PATTERN, exclude, self.max_results, cancel)
            });
            let matched = s.spawn(|| {
                self.fs
                    .search(root, &pattern, exclude, self.max_results, cancel)
            });
            let dirs = self.read_dirs(root, cancel);
            (join(current), join(matched), dirs)
        });

        let (current, matched, dirs) = (current?, matched?, dirs?);
        if cancel.is_cancelled() {
            return Err(FilerError::Cancelled);
        }

        let mut seen = HashSet::with_capacity(current.len() + matched.len());
        let files: Vec<PathBuf> = current
            .into_iter()
            .chain(matched)
            .filter(|p| seen.insert(p.clone()))
            .collect();

        let entries: Vec<ListItem> = dirs
            .into_iter()
            .filter(|d| !self.ignored(root, d, true))
            .map(ListItem::directory)
            .chain(
                files
                    .into_iter()
                    .filter(|f| !self.ignored(root, f, false))
                    .map(ListItem::file),
            )
            .collect();

        debug!(
            "Resolved {} ({:?}): {} rows in {:?}",
            root.display(),
            request.query,
            entries.len(),
            started.elapsed()
        );
        Ok(self.decorate(root, entries, request.copy_target.is_some()))
    }

    /// Immediate directories of `root`, in enumeration order.
    fn read_dirs(&self, root: &Path, cancel: &CancelToken) -> Result<Vec<PathBuf>> {
        let names = self.fs.list_entries(root)?;
        let mut dirs = Vec::new();
        for name in names {
            if cancel.is_cancelled() {
                return Err(FilerError::Cancelled);
            }
            let path = root.join(name);
            match self.fs.stat(&path) {
                Ok(stat) if stat.is_dir => dirs.push(path),
                Ok(_) => {}
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(dirs)
    }

    fn ignored(&self, root: &Path, path: &Path, is_dir: bool) -> bool {
        let Some(oracle) = &self.oracle else {
            return false;
        };
        path.strip_prefix(root)
            .map(|rel| oracle.ignores(root, rel, is_dir))
            .unwrap_or(false)
    }

    fn decorate(&self, root: &Path, entries: Vec<ListItem>, with_paste: bool) -> Vec<ListItem> {
        let mut items = Vec::with_capacity(entries.len() + 7);

        if self.workspace.is_workspace_root(root) {
            let label = self
                .workspace
                .folder_for(root)
                .map(|f| f.name().to_uppercase())
                .unwrap_or_default();
            items.push(ListItem::separator(label, false));
        } else {
            items.push(ListItem::separator(
                self.workspace.path_exclude_workspace_root(root),
                false,
            ));
            if let Some(parent) = root.parent() {
                let parent = parent.to_path_buf();
                items.push(if self.workspace.is_workspace_root(&parent) {
                    ListItem::Root { path: parent }
                } else {
                    ListItem::Directory {
                        path: parent,
                        parent_link: true,
                    }
                });
            }
        }

        items.extend(entries);
        items.push(ListItem::separator("FILE", true));
        items.push(ListItem::NewFile {
            dir: root.to_path_buf(),
        });
        items.push(ListItem::NewFolder {
            dir: root.to_path_buf(),
        });
        if with_paste {
            items.push(ListItem::Paste {
                dir: root.to_path_buf(),
            });
        }
        items.push(ListItem::separator("", false));
        items
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(FilerError::Io(std::io::Error::other("search thread panicked"))))
}
