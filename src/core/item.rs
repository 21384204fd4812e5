//! Rows of the picker list.
//!
//! [ListItem] is a closed set of row shapes. Filesystem rows carry a real path, action and
//! separator rows carry none. Labels and descriptions are never stored: they are derived from the
//! location and the [Workspace] every time they are shown.

use crate::core::workspace::Workspace;

use std::path::{Path, PathBuf};

/// Kind tag of a [ListItem].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Separator,
    Directory,
    File,
    Root,
    NewFile,
    NewFolder,
    Paste,
    OpenToTheSide,
    CopyFile,
    CopyRelativePath,
    Rename,
    Delete,
    Diff,
    Empty,
}

/// One row in the presented list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Separator { label: String, always_show: bool },
    /// `parent_link` marks the synthetic `../` row.
    Directory { path: PathBuf, parent_link: bool },
    /// `open_editor` marks rows of the OPEN EDITORS section.
    File { path: PathBuf, open_editor: bool },
    /// Leads back to the workspace-root view.
    Root { path: PathBuf },
    NewFile { dir: PathBuf },
    NewFolder { dir: PathBuf },
    Paste { dir: PathBuf },
    OpenToTheSide,
    CopyFile,
    CopyRelativePath,
    Rename,
    Delete,
    Diff,
    /// Placeholder row shown while the first listing loads.
    Empty,
}

impl ListItem {
    pub fn separator(label: impl Into<String>, always_show: bool) -> Self {
        ListItem::Separator {
            label: label.into(),
            always_show,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        ListItem::File {
            path: path.into(),
            open_editor: false,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        ListItem::Directory {
            path: path.into(),
            parent_link: false,
        }
    }

    #[inline]
    pub fn loading() -> Self {
        ListItem::Empty
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ListItem::Separator { .. } => ItemKind::Separator,
            ListItem::Directory { .. } => ItemKind::Directory,
            ListItem::File { .. } => ItemKind::File,
            ListItem::Root { .. } => ItemKind::Root,
            ListItem::NewFile { .. } => ItemKind::NewFile,
            ListItem::NewFolder { .. } => ItemKind::NewFolder,
            ListItem::Paste { .. } => ItemKind::Paste,
            ListItem::OpenToTheSide => ItemKind::OpenToTheSide,
            ListItem::CopyFile => ItemKind::CopyFile,
            ListItem::CopyRelativePath => ItemKind::CopyRelativePath,
            ListItem::Rename => ItemKind::Rename,
            ListItem::Delete => ItemKind::Delete,
            ListItem::Diff => ItemKind::Diff,
            ListItem::Empty => ItemKind::Empty,
        }
    }

    /// Filesystem location of the row, `None` for separator and action rows.
    pub fn location(&self) -> Option<&Path> {
        match self {
            ListItem::Directory { path, .. }
            | ListItem::File { path, .. }
            | ListItem::Root { path } => Some(path),
            ListItem::NewFile { dir } | ListItem::NewFolder { dir } | ListItem::Paste { dir } => {
                Some(dir)
            }
            ListItem::Separator { .. }
            | ListItem::OpenToTheSide
            | ListItem::CopyFile
            | ListItem::CopyRelativePath
            | ListItem::Rename
            | ListItem::Delete
            | ListItem::Diff
            | ListItem::Empty => None,
        }
    }

    /// Path of a `file` or `directory` row. These are the only rows path filters apply to.
    pub fn entry_path(&self) -> Option<&Path> {
        match self {
            ListItem::Directory { path, .. } | ListItem::File { path, .. } => Some(path),
            _ => None,
        }
    }

    #[inline]
    pub fn is_separator(&self) -> bool {
        matches!(self, ListItem::Separator { .. })
    }

    /// Rows that survive presentation filtering regardless of the typed text.
    pub fn always_show(&self) -> bool {
        match self {
            ListItem::Separator { always_show, .. } => *always_show,
            ListItem::File { open_editor, .. } => *open_editor,
            ListItem::NewFile { .. }
            | ListItem::NewFolder { .. }
            | ListItem::OpenToTheSide
            | ListItem::CopyFile
            | ListItem::CopyRelativePath
            | ListItem::Rename
            | ListItem::Empty => true,
            ListItem::Directory { .. }
            | ListItem::Root { .. }
            | ListItem::Paste { .. }
            | ListItem::Delete
            | ListItem::Diff => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ListItem::Separator { label, .. } => label.clone(),
            ListItem::Directory {
                parent_link: true, ..
            }
            | ListItem::Root { .. } => "../".to_string(),
            ListItem::Directory { path, .. } => format!("{}/", file_name(path)),
            ListItem::File { path, .. } => file_name(path),
            ListItem::NewFile { .. } => "New File...".to_string(),
            ListItem::NewFolder { .. } => "New Folder...".to_string(),
            ListItem::Paste { .. } => "Paste".to_string(),
            ListItem::OpenToTheSide => "Open to the Side".to_string(),
            ListItem::CopyFile => "Copy File".to_string(),
            ListItem::CopyRelativePath => "Copy Relative Path".to_string(),
            ListItem::Rename => "Rename...".to_string(),
            ListItem::Delete => "Delete".to_string(),
            ListItem::Diff => "Compare Files".to_string(),
            ListItem::Empty => "Loading...".to_string(),
        }
    }

    /// Secondary text of the row.
    ///
    /// `current_root` is the directory being browsed, `None` in the workspace-root view.
    pub fn description(&self, workspace: &Workspace, current_root: Option<&Path>) -> String {
        match self {
            ListItem::File {
                path,
                open_editor: true,
            } => workspace.path_exclude_workspace_root(path),
            ListItem::File { path, .. } => {
                let (Some(folder), Some(dir)) = (workspace.folder_for(path), path.parent()) else {
                    return String::new();
                };
                if dir == folder.path() {
                    folder.name().to_string()
                } else if current_root == Some(dir) {
                    String::new()
                } else {
                    format!("{} - /{}", folder.name(), workspace.relative_path(dir))
                }
            }
            ListItem::Directory {
                path,
                parent_link: false,
            } => match path.parent() {
                Some(dir) if workspace.is_workspace_root(dir) => workspace
                    .folder_for(dir)
                    .map(|f| f.name().to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            },
            ListItem::NewFile { dir } | ListItem::NewFolder { dir } => {
                if workspace.is_workspace_root(dir) {
                    workspace.path_exclude_workspace_root(dir)
                } else {
                    String::new()
                }
            }
            ListItem::Paste { dir } => match workspace.folder_for(dir) {
                Some(folder) => folder.name().to_string(),
                None => dir.display().to_string(),
            },
            _ => String::new(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Action rows appended after every listing, followed by the OPEN EDITORS section.
///
/// `hidden` is the row that started the action currently awaiting a target.
pub fn menu_items(hidden: Option<ItemKind>, open_documents: &[PathBuf]) -> Vec<ListItem> {
    let mut items = vec![ListItem::separator("", true)];
    items.extend(
        [
            ListItem::OpenToTheSide,
            ListItem::CopyFile,
            ListItem::CopyRelativePath,
            ListItem::Rename,
            ListItem::Delete,
            ListItem::Diff,
        ]
        .into_iter()
        .filter(|item| Some(item.kind()) != hidden),
    );

    if !open_documents.is_empty() {
        items.push(ListItem::separator("OPEN EDITORS", true));
        items.extend(open_documents.iter().map(|path| ListItem::File {
            path: path.clone(),
            open_editor: true,
        }));
    }
    items
}
