//! Workspace folders for quickfiler.
//!
//! A workspace is one or more root folders. Listings, labels and relative paths are all computed
//! against the folder that contains a path.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFolder {
    name: String,
    path: PathBuf,
}

impl WorkspaceFolder {
    /// Creates a folder named after the last component of `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    name: Option<String>,
    folders: Vec<WorkspaceFolder>,
}

impl Workspace {
    pub fn new(name: Option<String>, folders: Vec<WorkspaceFolder>) -> Self {
        Self { name, folders }
    }

    /// A single-folder workspace rooted at `path`.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let folder = WorkspaceFolder::new(path);
        Self {
            name: Some(folder.name.clone()),
            folders: vec![folder],
        }
    }

    #[inline]
    pub fn folders(&self) -> &[WorkspaceFolder] {
        &self.folders
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Stable identifier used to key persisted state.
    pub fn key(&self) -> String {
        self.folders
            .iter()
            .map(|f| f.path.display().to_string())
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn is_workspace_root(&self, path: &Path) -> bool {
        self.folders.iter().any(|f| f.path == path)
    }

    /// The innermost workspace folder containing `path`.
    pub fn folder_for(&self, path: &Path) -> Option<&WorkspaceFolder> {
        self.folders
            .iter()
            .filter(|f| path.starts_with(&f.path))
            .max_by_key(|f| f.path.components().count())
    }

    /// Display form of `path` with everything above its workspace folder removed, so the folder
    /// name leads: `/home/me/proj/src/bin` becomes `proj/src/bin`.
    pub fn path_exclude_workspace_root(&self, path: &Path) -> String {
        let Some(folder) = self.folder_for(path) else {
            return path.display().to_string();
        };
        match path.strip_prefix(&folder.path) {
            Ok(rest) if rest.as_os_str().is_empty() => folder.name.clone(),
            Ok(rest) => format!("{}/{}", folder.name, slash_path(rest)),
            Err(_) => path.display().to_string(),
        }
    }

    /// Path of `path` relative to its workspace folder, `/`-separated. Paths outside the
    /// workspace are returned unchanged.
    pub fn relative_path(&self, path: &Path) -> String {
        match self
            .folder_for(path)
            .and_then(|f| path.strip_prefix(&f.path).ok())
        {
            Some(rest) => slash_path(rest),
            None => path.display().to_string(),
        }
    }

    /// Text for the "Search from ..." placeholder when no directory is selected.
    pub fn placeholder(&self) -> String {
        if self.folders.is_empty() {
            return "Search".to_string();
        }
        let names: Vec<&str> = self.folders.iter().map(|f| f.name()).collect();
        format!("Search from {}", names.join(", "))
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
