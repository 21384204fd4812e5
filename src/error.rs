//! Error taxonomy for quickfiler.
//!
//! Every failure in the navigator is session scoped. The variants map onto how a failure is
//! handled:
//! - [FilerError::Cancelled] is superseded work and is dropped silently.
//! - [FilerError::NotFound], [FilerError::AlreadyExists], [FilerError::EmptyInput] and
//!   [FilerError::InvalidName] are input validation errors and are shown inline in the prompt
//!   that produced them.
//! - [FilerError::CopyIntoItself], [FilerError::PermissionDenied] and [FilerError::Io] are
//!   surfaced once as a notification.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FilerError {
    #[error("search cancelled")]
    Cancelled,

    #[error("{} could not be found.", .0.display())]
    NotFound(PathBuf),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    EmptyInput(&'static str),

    #[error("{0} is not a valid name")]
    InvalidName(String),

    #[error("Cannot copy {0} into itself")]
    CopyIntoItself(String),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FilerError>;

impl FilerError {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FilerError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FilerError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => FilerError::AlreadyExists(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ),
            _ => FilerError::Io(err),
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FilerError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_io_classifies_kinds() {
        let path = Path::new("/tmp/some/file.txt");

        let err = FilerError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, FilerError::NotFound(p) if p == path));

        let err = FilerError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, FilerError::PermissionDenied(_)));

        let err = FilerError::from_io(path, io::Error::from(io::ErrorKind::AlreadyExists));
        assert_eq!(err.to_string(), "file.txt already exists");

        let err = FilerError::from_io(path, io::Error::other("boom"));
        assert!(matches!(err, FilerError::Io(_)));
    }

    #[test]
    fn cancel_flag_and_messages() {
        assert!(FilerError::Cancelled.is_cancelled());
        assert!(!FilerError::EmptyInput("File name is empty").is_cancelled());
        assert_eq!(
            FilerError::EmptyInput("File name is empty").to_string(),
            "File name is empty"
        );
        assert_eq!(
            FilerError::InvalidName("../x".to_string()).to_string(),
            "../x is not a valid name"
        );
    }
}
