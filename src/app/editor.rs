//! Editor host collaborator for quickfiler.
//!
//! The session never opens files itself. It asks an [EditorHost] to open a file (optionally in a
//! given column), compare two files, or put text on the clipboard. [TerminalEditor] is the host
//! used by the `qf` binary: it hands the terminal to the configured editor command.

use crate::config::Editor;
use crate::utils::open_in_editor;

use log::{debug, warn};

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

pub trait EditorHost {
    /// Opens `path`. `column` places it in an editor column, `None` replaces the active one.
    fn open(&mut self, path: &Path, column: Option<u16>) -> io::Result<()>;

    fn diff(&mut self, left: &Path, right: &Path) -> io::Result<()>;

    fn write_clipboard(&mut self, text: &str) -> io::Result<()>;

    /// Documents currently open in the editor, listed under OPEN EDITORS.
    fn open_documents(&self) -> Vec<PathBuf>;

    /// Column of the active editor, if one is active.
    fn active_column(&self) -> Option<u16>;
}

/// Runs the configured editor in the terminal.
///
/// The file passed with `--here` is the active document in column 1. Opening beside it splits the
/// editor with [Editor::split_args].
pub struct TerminalEditor {
    editor: Editor,
    active: Option<PathBuf>,
    clipboard: Option<arboard::Clipboard>,
}

impl TerminalEditor {
    pub fn new(editor: Editor, active: Option<PathBuf>) -> Self {
        if !editor.exists() {
            warn!("Editor command {:?} was not found in PATH", editor.cmd());
        }
        Self {
            editor,
            active,
            clipboard: None,
        }
    }

    fn run(&self, args: Vec<OsString>) -> io::Result<()> {
        debug!("Running {} {:?}", self.editor.cmd(), args);
        open_in_editor(&self.editor, args)
    }
}

impl EditorHost for TerminalEditor {
    fn open(&mut self, path: &Path, column: Option<u16>) -> io::Result<()> {
        let mut args: Vec<OsString> = Vec::new();
        if let (Some(column), Some(active)) = (column, &self.active)
            && column > 1
            && active != path
        {
            args.extend(self.editor.split_args().iter().map(OsString::from));
            args.push(active.clone().into_os_string());
        }
        args.push(path.as_os_str().to_os_string());
        self.run(args)
    }

    fn diff(&mut self, left: &Path, right: &Path) -> io::Result<()> {
        let mut args: Vec<OsString> = self
            .editor
            .diff_args()
            .iter()
            .map(OsString::from)
            .collect();
        args.push(left.as_os_str().to_os_string());
        args.push(right.as_os_str().to_os_string());
        self.run(args)
    }

    fn write_clipboard(&mut self, text: &str) -> io::Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new().map_err(io::Error::other)?);
        }
        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text).map_err(io::Error::other),
            None => Err(io::Error::other("clipboard unavailable")),
        }
    }

    fn open_documents(&self) -> Vec<PathBuf> {
        self.active.iter().cloned().collect()
    }

    fn active_column(&self) -> Option<u16> {
        self.active.as_ref().map(|_| 1)
    }
}
