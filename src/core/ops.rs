//! Mutating file operations for quickfiler.
//!
//! Each [FileOp] is applied through the [FileSystem] collaborator and reports an [OpOutcome] that
//! the navigation state machine turns into its follow-up (open the new file, descend into the new
//! folder, re-list the parent of a deleted entry, ...). A failure records whether anything was
//! already changed on disk so the caller knows if cached listings went stale.

use crate::core::fm::{CopyOptions, DeleteOptions, FileSystem};
use crate::error::FilerError;

use log::info;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Supported file system operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    CreateFile { path: PathBuf },
    CreateFolder { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf, is_dir: bool },
    Delete { path: PathBuf, is_dir: bool, use_trash: bool },
    Copy { src: PathBuf, dest_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    FileCreated(PathBuf),
    FolderCreated(PathBuf),
    Renamed { path: PathBuf, is_dir: bool },
    Deleted(PathBuf),
    /// `path` is the copy that was written into `dir`.
    Pasted { path: PathBuf, dir: PathBuf },
}

impl OpOutcome {
    pub fn message(&self) -> String {
        match self {
            OpOutcome::FileCreated(p) | OpOutcome::FolderCreated(p) => {
                format!("Created {}", display_name(p))
            }
            OpOutcome::Renamed { path, .. } => format!("Renamed to {}", display_name(path)),
            OpOutcome::Deleted(p) => format!("Deleted {}", display_name(p)),
            OpOutcome::Pasted { path, .. } => format!("Pasted {}", display_name(path)),
        }
    }
}

#[derive(Debug)]
pub struct OpFailure {
    pub error: FilerError,
    /// Something was changed on disk before the failure.
    pub partially_applied: bool,
}

impl OpFailure {
    fn clean(error: FilerError) -> Self {
        Self {
            error,
            partially_applied: false,
        }
    }
}

/// Applies `op`. Nothing is retried.
pub fn apply(fs: &dyn FileSystem, op: FileOp) -> Result<OpOutcome, OpFailure> {
    match op {
        FileOp::CreateFile { path } => {
            if fs.exists(&path) {
                return Err(OpFailure::clean(already_exists(&path)));
            }
            fs.write_file(&path, b"").map_err(OpFailure::clean)?;
            info!("Created file {}", path.display());
            Ok(OpOutcome::FileCreated(path))
        }
        FileOp::CreateFolder { path } => {
            if fs.exists(&path) {
                return Err(OpFailure::clean(already_exists(&path)));
            }
            fs.create_dir(&path).map_err(|error| OpFailure {
                partially_applied: fs.exists(&path),
                error,
            })?;
            info!("Created folder {}", path.display());
            Ok(OpOutcome::FolderCreated(path))
        }
        FileOp::Rename { from, to, is_dir } => {
            if fs.exists(&to) {
                return Err(OpFailure::clean(already_exists(&to)));
            }
            fs.rename(&from, &to).map_err(OpFailure::clean)?;
            info!("Renamed {} to {}", from.display(), to.display());
            Ok(OpOutcome::Renamed { path: to, is_dir })
        }
        FileOp::Delete {
            path,
            is_dir,
            use_trash,
        } => {
            let options = DeleteOptions {
                use_trash,
                recursive: is_dir,
            };
            fs.delete(&path, options).map_err(|error| OpFailure {
                partially_applied: is_dir && fs.exists(&path),
                error,
            })?;
            info!("Deleted {} (trash: {})", path.display(), use_trash);
            Ok(OpOutcome::Deleted(path))
        }
        FileOp::Copy { src, dest_dir } => {
            if !fs.exists(&src) {
                return Err(OpFailure::clean(FilerError::NotFound(src)));
            }
            let Some(name) = src.file_name().map(|n| n.to_os_string()) else {
                return Err(OpFailure::clean(FilerError::NotFound(src)));
            };
            let is_dir = fs.stat(&src).map_err(OpFailure::clean)?.is_dir;
            if is_dir && dest_dir.starts_with(&src) {
                let error = FilerError::CopyIntoItself(display_name(&src));
                return Err(OpFailure::clean(error));
            }
            let target = unused_copy_path(fs, &dest_dir, name);
            fs.copy(&src, &target, CopyOptions { overwrite: false })
                .map_err(|error| OpFailure {
                    partially_applied: fs.exists(&target),
                    error,
                })?;
            info!("Copied {} to {}", src.display(), target.display());
            Ok(OpOutcome::Pasted {
                path: target,
                dir: dest_dir,
            })
        }
    }
}

/// First free path for a copy of `name` inside `dir`.
///
/// Collisions insert `" copy"` before the extension, repeatedly: `a.txt`, `a copy.txt`,
/// `a copy copy.txt`. The loop is unbounded; it ends at the first name that does not exist.
pub fn unused_copy_path(fs: &dyn FileSystem, dir: &Path, name: OsString) -> PathBuf {
    let mut target = dir.join(name);
    while fs.exists(&target) {
        let current = Path::new(target.file_name().unwrap_or_default());
        let (stem, ext) = split_extension(current);
        target = dir.join(format!("{stem} copy{ext}"));
    }
    target
}

/// Splits a file name into base name and extension (with its dot). Dotfiles such as
/// `.gitignore` have no extension.
fn split_extension(name: &Path) -> (String, String) {
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

fn already_exists(path: &Path) -> FilerError {
    FilerError::AlreadyExists(display_name(path))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
