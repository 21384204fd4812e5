//! Input prompts for quickfiler.
//!
//! A [Prompt] collects a name (new file, new folder, rename) or a yes/no answer (delete) and turns
//! it into a [FileOp]. Validation failures stay inside the prompt as an inline message, the
//! session keeps running and the user can correct the input.

use crate::app::nav::PromptRequest;
use crate::core::fm::FileSystem;
use crate::core::ops::FileOp;
use crate::error::FilerError;

use std::path::{Component, Path, PathBuf};

/// What submitting a prompt led to.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Input was rejected; the message is shown and the prompt stays open.
    Rejected,
    /// Input accepted, run this operation.
    Run(FileOp),
    /// The prompt was answered without anything to do, like declining a delete.
    Dismissed,
}

/// Single-line text input with a cursor, shared by the query line and the prompts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputLine {
    buffer: String,
    cursor: usize,
}

impl InputLine {
    pub fn new(text: impl Into<String>) -> Self {
        let buffer = text.into();
        Self {
            cursor: buffer.len(),
            buffer,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn move_cursor_left(&mut self) {
        if let Some((previous, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = previous;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Inserts a character at the cursor position.
    pub fn insert_at_cursor(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Deletes the character before the cursor position. Returns whether the text changed.
    pub fn backspace_at_cursor(&mut self) -> bool {
        if self.cursor > 0
            && let Some((previous, _)) = self.buffer[..self.cursor].char_indices().next_back()
        {
            self.buffer.remove(previous);
            self.cursor = previous;
            return true;
        }
        false
    }

    /// Deletes the character at the cursor position. Returns whether the text changed.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
            return true;
        }
        false
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.buffer.len();
    }
}

pub struct Prompt {
    request: PromptRequest,
    line: InputLine,
    error: Option<String>,
}

impl Prompt {
    /// Opens a prompt for `request`. Rename prompts start with the current name.
    pub fn new(request: PromptRequest) -> Self {
        let line = match &request {
            PromptRequest::Rename { target, .. } => InputLine::new(file_name(target)),
            _ => InputLine::default(),
        };
        Self {
            request,
            line,
            error: None,
        }
    }

    // Getters / accessors

    #[inline]
    pub fn input(&self) -> &str {
        self.line.text()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_confirmation(&self) -> bool {
        matches!(self.request, PromptRequest::ConfirmDelete { .. })
    }

    pub fn label(&self) -> String {
        match &self.request {
            PromptRequest::NewFile { .. } => "New file name".to_string(),
            PromptRequest::NewFolder { .. } => "New folder name".to_string(),
            PromptRequest::Rename { target, .. } => format!("Rename '{}' to", file_name(target)),
            PromptRequest::ConfirmDelete { target, .. } => format!(
                "Are you sure you want to delete '{}'? (y/n)",
                file_name(target)
            ),
        }
    }

    /// Validates the input and builds the operation.
    pub fn submit(&mut self, fs: &dyn FileSystem, use_trash: bool) -> PromptOutcome {
        let name = self.line.text().trim().to_string();
        let result = match &self.request {
            PromptRequest::NewFile { dir } => {
                validated(fs, dir, &name, "File name is empty").map(|path| FileOp::CreateFile { path })
            }
            PromptRequest::NewFolder { dir } => validated(fs, dir, &name, "Folder name is empty")
                .map(|path| FileOp::CreateFolder { path }),
            PromptRequest::Rename { target, is_dir } => {
                if name == file_name(target) {
                    return PromptOutcome::Dismissed;
                }
                let dir = target.parent().unwrap_or_else(|| Path::new(""));
                validated(fs, dir, &name, "name is empty").map(|to| FileOp::Rename {
                    from: target.clone(),
                    to,
                    is_dir: *is_dir,
                })
            }
            PromptRequest::ConfirmDelete { target, is_dir } => {
                return match name.to_lowercase().as_str() {
                    "y" | "yes" => PromptOutcome::Run(FileOp::Delete {
                        path: target.clone(),
                        is_dir: *is_dir,
                        use_trash,
                    }),
                    _ => PromptOutcome::Dismissed,
                };
            }
        };

        match result {
            Ok(op) => PromptOutcome::Run(op),
            Err(e) => {
                self.error = Some(e.to_string());
                PromptOutcome::Rejected
            }
        }
    }

    // Cursor actions

    pub fn move_cursor_left(&mut self) {
        self.line.move_cursor_left();
    }

    pub fn move_cursor_right(&mut self) {
        self.line.move_cursor_right();
    }

    pub fn insert_at_cursor(&mut self, ch: char) {
        self.line.insert_at_cursor(ch);
        self.error = None;
    }

    pub fn backspace_at_cursor(&mut self) {
        if self.line.backspace_at_cursor() {
            self.error = None;
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.line.delete_at_cursor() {
            self.error = None;
        }
    }

    pub fn cursor_home(&mut self) {
        self.line.cursor_home();
    }

    pub fn cursor_end(&mut self) {
        self.line.cursor_end();
    }
}

/// `dir/name`, unless `name` is empty, already taken or leads outside `dir`.
fn validated(
    fs: &dyn FileSystem,
    dir: &Path,
    name: &str,
    empty: &'static str,
) -> Result<PathBuf, FilerError> {
    if name.is_empty() {
        return Err(FilerError::EmptyInput(empty));
    }
    let stays_inside = Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !stays_inside {
        return Err(FilerError::InvalidName(name.to_string()));
    }
    let path = dir.join(name);
    if fs.exists(&path) {
        return Err(FilerError::AlreadyExists(name.to_string()));
    }
    Ok(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fm::LocalFs;

    use std::error;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn empty_and_existing_names_are_rejected() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("taken.rs"))?;

        let mut prompt = Prompt::new(PromptRequest::NewFile {
            dir: dir.path().to_path_buf(),
        });
        assert_eq!(prompt.submit(&LocalFs, true), PromptOutcome::Rejected);
        assert_eq!(prompt.error(), Some("File name is empty"));

        for ch in "taken.rs".chars() {
            prompt.insert_at_cursor(ch);
        }
        assert_eq!(prompt.error(), None);
        assert_eq!(prompt.submit(&LocalFs, true), PromptOutcome::Rejected);
        assert_eq!(prompt.error(), Some("taken.rs already exists"));

        prompt.backspace_at_cursor();
        prompt.backspace_at_cursor();
        prompt.insert_at_cursor('m');
        prompt.insert_at_cursor('d');
        assert_eq!(
            prompt.submit(&LocalFs, true),
            PromptOutcome::Run(FileOp::CreateFile {
                path: dir.path().join("taken.md")
            })
        );

        let mut folder = Prompt::new(PromptRequest::NewFolder {
            dir: dir.path().to_path_buf(),
        });
        folder.insert_at_cursor(' ');
        assert_eq!(folder.submit(&LocalFs, true), PromptOutcome::Rejected);
        assert_eq!(folder.error(), Some("Folder name is empty"));
        Ok(())
    }

    #[test]
    fn names_leading_outside_the_directory_are_rejected() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let inside = dir.path().join("inside");
        std::fs::create_dir(&inside)?;
        let outside = dir.path().join("outside.txt");

        let mut prompt = Prompt::new(PromptRequest::NewFile { dir: inside.clone() });
        for ch in outside.to_string_lossy().chars() {
            prompt.insert_at_cursor(ch);
        }
        assert_eq!(prompt.submit(&LocalFs, true), PromptOutcome::Rejected);
        assert_eq!(
            prompt.error(),
            Some(format!("{} is not a valid name", outside.display()).as_str())
        );

        let mut folder = Prompt::new(PromptRequest::NewFolder { dir: inside.clone() });
        for ch in "../up".chars() {
            folder.insert_at_cursor(ch);
        }
        assert_eq!(folder.submit(&LocalFs, true), PromptOutcome::Rejected);
        assert_eq!(folder.error(), Some("../up is not a valid name"));

        let target = inside.join("old.txt");
        File::create(&target)?;
        let mut rename = Prompt::new(PromptRequest::Rename {
            target,
            is_dir: false,
        });
        rename.cursor_home();
        for ch in "../".chars() {
            rename.insert_at_cursor(ch);
        }
        assert_eq!(rename.submit(&LocalFs, true), PromptOutcome::Rejected);

        // nested names stay below the directory
        let mut nested = Prompt::new(PromptRequest::NewFolder { dir: inside.clone() });
        for ch in "a/b".chars() {
            nested.insert_at_cursor(ch);
        }
        assert_eq!(
            nested.submit(&LocalFs, true),
            PromptOutcome::Run(FileOp::CreateFolder {
                path: inside.join("a/b")
            })
        );
        assert!(!outside.exists());
        Ok(())
    }

    #[test]
    fn rename_is_prefilled() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let target = dir.path().join("old.txt");
        File::create(&target)?;

        let mut prompt = Prompt::new(PromptRequest::Rename {
            target: target.clone(),
            is_dir: false,
        });
        assert_eq!(prompt.input(), "old.txt");
        assert_eq!(prompt.cursor(), "old.txt".len());
        // unchanged name: nothing to do
        assert_eq!(prompt.submit(&LocalFs, true), PromptOutcome::Dismissed);

        prompt.cursor_home();
        prompt.delete_at_cursor();
        prompt.delete_at_cursor();
        prompt.delete_at_cursor();
        prompt.insert_at_cursor('n');
        prompt.insert_at_cursor('e');
        prompt.insert_at_cursor('w');
        assert_eq!(prompt.input(), "new.txt");
        assert_eq!(
            prompt.submit(&LocalFs, true),
            PromptOutcome::Run(FileOp::Rename {
                from: target,
                to: dir.path().join("new.txt"),
                is_dir: false
            })
        );

        prompt.cursor_end();
        while !prompt.input().is_empty() {
            prompt.backspace_at_cursor();
        }
        assert_eq!(prompt.submit(&LocalFs, true), PromptOutcome::Rejected);
        assert_eq!(prompt.error(), Some("name is empty"));
        Ok(())
    }

    #[test]
    fn delete_confirmation() {
        let request = PromptRequest::ConfirmDelete {
            target: PathBuf::from("/w/proj/old"),
            is_dir: true,
        };
        let mut prompt = Prompt::new(request.clone());
        assert!(prompt.is_confirmation());
        assert_eq!(
            prompt.label(),
            "Are you sure you want to delete 'old'? (y/n)"
        );
        prompt.insert_at_cursor('y');
        assert_eq!(
            prompt.submit(&LocalFs, false),
            PromptOutcome::Run(FileOp::Delete {
                path: PathBuf::from("/w/proj/old"),
                is_dir: true,
                use_trash: false
            })
        );

        let mut prompt = Prompt::new(request);
        prompt.insert_at_cursor('n');
        assert_eq!(prompt.submit(&LocalFs, false), PromptOutcome::Dismissed);
    }

    #[test]
    fn cursor_moves_over_multibyte_chars() {
        let mut prompt = Prompt::new(PromptRequest::NewFile {
            dir: PathBuf::from("/tmp"),
        });
        prompt.insert_at_cursor('é');
        prompt.insert_at_cursor('x');
        prompt.move_cursor_left();
        prompt.move_cursor_left();
        assert_eq!(prompt.cursor(), 0);
        prompt.move_cursor_right();
        assert_eq!(prompt.cursor(), 'é'.len_utf8());
        prompt.backspace_at_cursor();
        assert_eq!(prompt.input(), "x");
    }
}
