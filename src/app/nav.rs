//! Navigation state machine for quickfiler.
//!
//! [NavState] owns the directory being browsed and the pending [Action]. It is only ever changed
//! through [NavState::dispatch], which takes one [Event] (an accepted row or the outcome of a file
//! operation) and returns the [Effect]s the session must carry out. It performs no I/O itself.

use crate::core::item::{ItemKind, ListItem};
use crate::core::workspace::Workspace;

use log::debug;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pending action of a navigation session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Action {
    #[default]
    Idle,
    AwaitingDeleteTarget,
    AwaitingRenameTarget,
    AwaitingCopySource,
    AwaitingPasteTarget {
        source: PathBuf,
    },
    AwaitingDiffLeft,
    AwaitingDiffRight {
        left: PathBuf,
    },
    AwaitingOpenSideTarget,
    AwaitingCopyRelativePathTarget,
}

impl Action {
    fn from_menu(kind: ItemKind) -> Option<Self> {
        match kind {
            ItemKind::Delete => Some(Action::AwaitingDeleteTarget),
            ItemKind::Rename => Some(Action::AwaitingRenameTarget),
            ItemKind::CopyFile => Some(Action::AwaitingCopySource),
            ItemKind::Diff => Some(Action::AwaitingDiffLeft),
            ItemKind::OpenToTheSide => Some(Action::AwaitingOpenSideTarget),
            ItemKind::CopyRelativePath => Some(Action::AwaitingCopyRelativePathTarget),
            _ => None,
        }
    }

    /// Menu row that started this action. It is not rendered while the action is pending.
    pub fn trigger(&self) -> Option<ItemKind> {
        match self {
            Action::Idle => None,
            Action::AwaitingDeleteTarget => Some(ItemKind::Delete),
            Action::AwaitingRenameTarget => Some(ItemKind::Rename),
            Action::AwaitingCopySource | Action::AwaitingPasteTarget { .. } => {
                Some(ItemKind::CopyFile)
            }
            Action::AwaitingDiffLeft | Action::AwaitingDiffRight { .. } => Some(ItemKind::Diff),
            Action::AwaitingOpenSideTarget => Some(ItemKind::OpenToTheSide),
            Action::AwaitingCopyRelativePathTarget => Some(ItemKind::CopyRelativePath),
        }
    }

    pub fn title(&self) -> Option<String> {
        let title = match self {
            Action::Idle | Action::AwaitingPasteTarget { .. } => return None,
            Action::AwaitingDeleteTarget => "Select files to delete",
            Action::AwaitingRenameTarget => "Select file to rename file",
            Action::AwaitingCopySource => "Select file to copy file",
            Action::AwaitingDiffLeft => "Select files to compare",
            Action::AwaitingDiffRight { left } => {
                return Some(format!(
                    "Select files to compare with {}",
                    left.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| left.display().to_string())
                ));
            }
            Action::AwaitingOpenSideTarget => "Select files to open on the side",
            Action::AwaitingCopyRelativePathTarget => "Select file to copy relative path",
        };
        Some(title.to_string())
    }

    /// Source of a pending copy, shown as a paste row in every listing.
    pub fn copy_target(&self) -> Option<&Path> {
        match self {
            Action::AwaitingPasteTarget { source } => Some(source),
            _ => None,
        }
    }

    /// Actions for which accepting a directory row selects it instead of descending.
    fn targets_directories(&self) -> bool {
        matches!(
            self,
            Action::AwaitingDeleteTarget
                | Action::AwaitingRenameTarget
                | Action::AwaitingCopySource
                | Action::AwaitingCopyRelativePathTarget
        )
    }
}

/// Input the session has to collect before an operation can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    NewFile { dir: PathBuf },
    NewFolder { dir: PathBuf },
    Rename { target: PathBuf, is_dir: bool },
    ConfirmDelete { target: PathBuf, is_dir: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Accept(ListItem),
    /// Explicit descent into a directory, whatever action is pending.
    Descend(PathBuf),
    FileCreated(PathBuf),
    FolderCreated(PathBuf),
    Renamed { path: PathBuf, is_dir: bool },
    Deleted(PathBuf),
    Pasted { dir: PathBuf },
    OperationFailed,
    PromptCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Re-resolve the listing for the current root and action.
    Refresh,
    SetTitle(Option<String>),
    SetPlaceholder(String),
    PersistRoot(Option<PathBuf>),
    Open { path: PathBuf, beside: bool },
    Diff { left: PathBuf, right: PathBuf },
    CopyToClipboard(String),
    Prompt(PromptRequest),
    Paste { source: PathBuf, dest_dir: PathBuf },
    Close,
}

pub struct NavState {
    root: Option<PathBuf>,
    action: Action,
    workspace: Arc<Workspace>,
}

impl NavState {
    /// Starts in `root`, or in the workspace-root view for `None`.
    pub fn new(workspace: Arc<Workspace>, root: Option<PathBuf>) -> Self {
        let mut nav = Self {
            root: None,
            action: Action::Idle,
            workspace,
        };
        nav.root = root.filter(|r| !nav.workspace.is_workspace_root(r));
        nav
    }

    // Getters / Accessors

    #[inline]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    #[inline]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[inline]
    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    pub fn placeholder(&self) -> String {
        match &self.root {
            Some(root) => format!(
                "Search from {}",
                self.workspace.path_exclude_workspace_root(root)
            ),
            None => self.workspace.placeholder(),
        }
    }

    /// Applies one event and returns the effects to carry out, in order.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        debug!("dispatch {:?} in {:?}", event, self.action);
        match event {
            Event::Accept(item) => self.accept(item),
            Event::Descend(path) => self.set_root(Some(path)),
            Event::FileCreated(path) => vec![Effect::Open { path, beside: false }, Effect::Close],
            Event::FolderCreated(path) => self.set_root(Some(path)),
            Event::Renamed { path, is_dir } => {
                let mut effects = self.finish();
                if is_dir {
                    effects.extend(self.set_root(Some(path)));
                } else {
                    effects.push(Effect::Open {
                        path,
                        beside: false,
                    });
                    effects.push(Effect::Close);
                }
                effects
            }
            Event::Deleted(path) => {
                let mut effects = self.finish();
                effects.extend(self.set_root(path.parent().map(Path::to_path_buf)));
                effects
            }
            Event::Pasted { dir } => {
                let mut effects = self.finish();
                effects.extend(self.set_root(Some(dir)));
                effects
            }
            Event::OperationFailed => {
                let mut effects = self.finish();
                effects.push(Effect::Refresh);
                effects
            }
            Event::PromptCancelled => match self.action {
                Action::AwaitingDeleteTarget | Action::AwaitingRenameTarget => {
                    let mut effects = self.finish();
                    effects.push(Effect::Refresh);
                    effects
                }
                _ => Vec::new(),
            },
        }
    }

    fn accept(&mut self, item: ListItem) -> Vec<Effect> {
        if let Some(action) = Action::from_menu(item.kind()) {
            return self.begin(action);
        }

        match item {
            ListItem::Separator { .. } | ListItem::Empty => Vec::new(),
            ListItem::OpenToTheSide
            | ListItem::CopyFile
            | ListItem::CopyRelativePath
            | ListItem::Rename
            | ListItem::Delete
            | ListItem::Diff => Vec::new(),
            ListItem::Root { .. } => self.set_root(None),
            ListItem::NewFile { dir } => vec![Effect::Prompt(PromptRequest::NewFile { dir })],
            ListItem::NewFolder { dir } => vec![Effect::Prompt(PromptRequest::NewFolder { dir })],
            ListItem::Paste { dir } => match &self.action {
                Action::AwaitingPasteTarget { source } => vec![Effect::Paste {
                    source: source.clone(),
                    dest_dir: dir,
                }],
                _ => Vec::new(),
            },
            ListItem::Directory { path, parent_link } => {
                if !parent_link && self.action.targets_directories() {
                    self.select_target(path, true)
                } else {
                    self.set_root(Some(path))
                }
            }
            ListItem::File { path, .. } => self.select_target(path, false),
        }
    }

    fn begin(&mut self, action: Action) -> Vec<Effect> {
        self.action = action;
        vec![Effect::SetTitle(self.action.title()), Effect::Refresh]
    }

    /// Returns to `Idle` and clears the title.
    fn finish(&mut self) -> Vec<Effect> {
        self.action = Action::Idle;
        vec![Effect::SetTitle(None)]
    }

    fn select_target(&mut self, path: PathBuf, is_dir: bool) -> Vec<Effect> {
        match std::mem::take(&mut self.action) {
            Action::Idle | Action::AwaitingPasteTarget { .. } if !is_dir => {
                vec![Effect::Open { path, beside: false }, Effect::Close]
            }
            Action::AwaitingDeleteTarget => {
                self.action = Action::AwaitingDeleteTarget;
                vec![Effect::Prompt(PromptRequest::ConfirmDelete {
                    target: path,
                    is_dir,
                })]
            }
            Action::AwaitingRenameTarget => {
                self.action = Action::AwaitingRenameTarget;
                vec![Effect::Prompt(PromptRequest::Rename {
                    target: path,
                    is_dir,
                })]
            }
            Action::AwaitingCopySource => {
                let parent = if is_dir {
                    self.root.clone()
                } else {
                    path.parent().map(Path::to_path_buf)
                };
                self.action = Action::AwaitingPasteTarget { source: path };
                let mut effects = vec![Effect::SetTitle(None)];
                effects.extend(self.set_root(parent));
                effects
            }
            Action::AwaitingDiffLeft => {
                self.action = Action::AwaitingDiffRight { left: path.clone() };
                let mut effects = vec![Effect::SetTitle(self.action.title())];
                effects.extend(self.set_root(path.parent().map(Path::to_path_buf)));
                effects
            }
            Action::AwaitingDiffRight { left } => {
                vec![
                    Effect::Diff { left, right: path },
                    Effect::SetTitle(None),
                    Effect::Refresh,
                ]
            }
            Action::AwaitingOpenSideTarget => {
                vec![Effect::Open { path, beside: true }, Effect::Close]
            }
            Action::AwaitingCopyRelativePathTarget => {
                let relative = self.workspace.relative_path(&path);
                vec![Effect::CopyToClipboard(relative), Effect::Close]
            }
            other => {
                // a directory reaching an action that only takes files descends instead
                self.action = other;
                self.set_root(Some(path))
            }
        }
    }

    /// Moves to `root` (workspace roots collapse into the workspace-root view) and re-lists.
    fn set_root(&mut self, root: Option<PathBuf>) -> Vec<Effect> {
        let root = root.filter(|r| !self.workspace.is_workspace_root(r));
        let mut effects = Vec::with_capacity(3);
        if root != self.root {
            self.root = root;
            effects.push(Effect::PersistRoot(self.root.clone()));
        }
        effects.push(Effect::SetPlaceholder(self.placeholder()));
        effects.push(Effect::Refresh);
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workspace::WorkspaceFolder;

    fn nav() -> NavState {
        let ws = Workspace::new(None, vec![WorkspaceFolder::new("/w/proj")]);
        NavState::new(Arc::new(ws), None)
    }

    fn file(p: &str) -> Event {
        Event::Accept(ListItem::file(p))
    }

    fn dir(p: &str) -> Event {
        Event::Accept(ListItem::directory(p))
    }

    #[test]
    fn menu_rows_enter_awaiting_states() {
        let mut nav = nav();
        let effects = nav.dispatch(Event::Accept(ListItem::Rename));
        assert_eq!(nav.action(), &Action::AwaitingRenameTarget);
        assert_eq!(
            effects,
            vec![
                Effect::SetTitle(Some("Select file to rename file".into())),
                Effect::Refresh
            ]
        );

        // another menu row switches the pending action
        nav.dispatch(Event::Accept(ListItem::Delete));
        assert_eq!(nav.action(), &Action::AwaitingDeleteTarget);
        assert_eq!(nav.action().trigger(), Some(ItemKind::Delete));
    }

    #[test]
    fn directories_descend_and_root_ascends() {
        let mut nav = nav();
        let effects = nav.dispatch(dir("/w/proj/src"));
        assert_eq!(nav.root(), Some(Path::new("/w/proj/src")));
        assert_eq!(
            effects,
            vec![
                Effect::PersistRoot(Some("/w/proj/src".into())),
                Effect::SetPlaceholder("Search from proj/src".into()),
                Effect::Refresh
            ]
        );

        let effects = nav.dispatch(Event::Accept(ListItem::Root {
            path: "/w/proj".into(),
        }));
        assert_eq!(nav.root(), None);
        assert_eq!(effects[0], Effect::PersistRoot(None));
    }

    #[test]
    fn workspace_folder_directory_is_the_root_view() {
        let mut nav = nav();
        nav.dispatch(dir("/w/proj/src"));
        nav.dispatch(Event::Accept(ListItem::Directory {
            path: "/w/proj".into(),
            parent_link: true,
        }));
        assert_eq!(nav.root(), None);
    }

    #[test]
    fn idle_file_opens_and_closes() {
        let mut nav = nav();
        let effects = nav.dispatch(file("/w/proj/a.txt"));
        assert_eq!(
            effects,
            vec![
                Effect::Open {
                    path: "/w/proj/a.txt".into(),
                    beside: false
                },
                Effect::Close
            ]
        );
    }

    #[test]
    fn copy_then_paste() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::CopyFile));
        assert_eq!(nav.action(), &Action::AwaitingCopySource);

        nav.dispatch(file("/w/proj/a.txt"));
        assert_eq!(
            nav.action(),
            &Action::AwaitingPasteTarget {
                source: "/w/proj/a.txt".into()
            }
        );
        assert_eq!(nav.action().copy_target(), Some(Path::new("/w/proj/a.txt")));

        // browsing keeps the pending paste
        nav.dispatch(dir("/w/proj/sub"));
        let effects = nav.dispatch(Event::Accept(ListItem::Paste {
            dir: "/w/proj/sub".into(),
        }));
        assert_eq!(
            effects,
            vec![Effect::Paste {
                source: "/w/proj/a.txt".into(),
                dest_dir: "/w/proj/sub".into()
            }]
        );

        let effects = nav.dispatch(Event::Pasted {
            dir: "/w/proj/sub".into(),
        });
        assert_eq!(nav.action(), &Action::Idle);
        assert!(effects.contains(&Effect::Refresh));
        assert_eq!(nav.root(), Some(Path::new("/w/proj/sub")));
    }

    #[test]
    fn pending_paste_still_opens_files() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::CopyFile));
        nav.dispatch(file("/w/proj/a.txt"));
        let effects = nav.dispatch(file("/w/proj/b.txt"));
        assert!(matches!(effects[0], Effect::Open { beside: false, .. }));
    }

    #[test]
    fn paste_row_without_pending_copy_does_nothing() {
        let mut nav = nav();
        let effects = nav.dispatch(Event::Accept(ListItem::Paste {
            dir: "/w/proj".into(),
        }));
        assert!(effects.is_empty());
    }

    #[test]
    fn diff_flow_keeps_order() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::Diff));
        let effects = nav.dispatch(file("/w/proj/left.txt"));
        assert_eq!(
            effects[0],
            Effect::SetTitle(Some("Select files to compare with left.txt".into()))
        );

        let effects = nav.dispatch(file("/w/proj/right.txt"));
        assert_eq!(
            effects[0],
            Effect::Diff {
                left: "/w/proj/left.txt".into(),
                right: "/w/proj/right.txt".into()
            }
        );
        assert_eq!(nav.action(), &Action::Idle);
        assert!(!effects.contains(&Effect::Close));
    }

    #[test]
    fn diff_and_open_side_descend_into_directories() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::Diff));
        nav.dispatch(dir("/w/proj/src"));
        assert_eq!(nav.action(), &Action::AwaitingDiffLeft);
        assert_eq!(nav.root(), Some(Path::new("/w/proj/src")));

        nav.dispatch(Event::Accept(ListItem::OpenToTheSide));
        nav.dispatch(dir("/w/proj/src/bin"));
        let effects = nav.dispatch(file("/w/proj/src/bin/main.rs"));
        assert_eq!(
            effects,
            vec![
                Effect::Open {
                    path: "/w/proj/src/bin/main.rs".into(),
                    beside: true
                },
                Effect::Close
            ]
        );
    }

    #[test]
    fn delete_and_rename_target_directories() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::Delete));
        let effects = nav.dispatch(dir("/w/proj/old"));
        assert_eq!(
            effects,
            vec![Effect::Prompt(PromptRequest::ConfirmDelete {
                target: "/w/proj/old".into(),
                is_dir: true
            })]
        );
        // the ../ row still navigates
        nav.dispatch(dir("/w/proj/a/b"));
        nav.dispatch(Event::Accept(ListItem::Directory {
            path: "/w/proj/a".into(),
            parent_link: true,
        }));
        assert_eq!(nav.root(), Some(Path::new("/w/proj/a")));
        assert_eq!(nav.action(), &Action::AwaitingDeleteTarget);
    }

    #[test]
    fn delete_outcome_lists_the_parent() {
        let mut nav = nav();
        nav.dispatch(Event::Descend("/w/proj/a".into()));
        nav.dispatch(Event::Accept(ListItem::Delete));
        nav.dispatch(dir("/w/proj/a/old"));
        let effects = nav.dispatch(Event::Deleted("/w/proj/a/old".into()));
        assert_eq!(nav.action(), &Action::Idle);
        assert_eq!(nav.root(), Some(Path::new("/w/proj/a")));
        assert_eq!(effects[0], Effect::SetTitle(None));

        // deleting the directory being browsed moves up
        let effects = nav.dispatch(Event::Deleted("/w/proj/a".into()));
        assert_eq!(nav.root(), None);
        assert!(effects.contains(&Effect::PersistRoot(None)));
    }

    #[test]
    fn rename_outcomes() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::Rename));
        let effects = nav.dispatch(Event::Renamed {
            path: "/w/proj/new.txt".into(),
            is_dir: false,
        });
        assert!(effects.contains(&Effect::Close));
        assert_eq!(nav.action(), &Action::Idle);

        let effects = nav.dispatch(Event::Renamed {
            path: "/w/proj/newdir".into(),
            is_dir: true,
        });
        assert!(effects.contains(&Effect::Refresh));
        assert_eq!(nav.root(), Some(Path::new("/w/proj/newdir")));
    }

    #[test]
    fn relative_path_goes_to_clipboard() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::CopyRelativePath));
        let effects = nav.dispatch(dir("/w/proj/src/core"));
        assert_eq!(
            effects,
            vec![Effect::CopyToClipboard("src/core".into()), Effect::Close]
        );
    }

    #[test]
    fn new_entries() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::CopyFile));
        nav.dispatch(file("/w/proj/a.txt"));

        let effects = nav.dispatch(Event::Accept(ListItem::NewFolder {
            dir: "/w/proj".into(),
        }));
        assert_eq!(
            effects,
            vec![Effect::Prompt(PromptRequest::NewFolder {
                dir: "/w/proj".into()
            })]
        );
        nav.dispatch(Event::FolderCreated("/w/proj/fresh".into()));
        assert_eq!(nav.root(), Some(Path::new("/w/proj/fresh")));
        // the pending paste survives
        assert!(nav.action().copy_target().is_some());

        let effects = nav.dispatch(Event::FileCreated("/w/proj/fresh/x.rs".into()));
        assert_eq!(effects.last(), Some(&Effect::Close));
    }

    #[test]
    fn cancelled_prompts() {
        let mut nav = nav();
        nav.dispatch(Event::Accept(ListItem::Rename));
        nav.dispatch(file("/w/proj/a.txt"));
        assert_eq!(nav.action(), &Action::AwaitingRenameTarget);
        nav.dispatch(Event::PromptCancelled);
        assert_eq!(nav.action(), &Action::Idle);

        nav.dispatch(Event::Accept(ListItem::Diff));
        assert!(nav.dispatch(Event::PromptCancelled).is_empty());
        assert_eq!(nav.action(), &Action::AwaitingDiffLeft);
    }

    #[test]
    fn loading_and_separator_rows_are_inert() {
        let mut nav = nav();
        assert!(nav.dispatch(Event::Accept(ListItem::loading())).is_empty());
        assert!(
            nav.dispatch(Event::Accept(ListItem::separator("FILE", true)))
                .is_empty()
        );
    }
}
