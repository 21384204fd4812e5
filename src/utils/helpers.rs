//! Helpers for quickfiler.
//!
//! Result limits used by the search collaborator, editor process launching with the terminal
//! handed over, recursive copying for the paste operation, and path display/resolution helpers.

use crate::config::Editor;

use log::warn;

use std::ffi::OsStr;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::{fs, io};

/// Lowest accepted `max_results`.
pub const MIN_MAX_RESULTS: usize = 100;
/// Per-search result limit unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 10_000;
pub const MAX_RESULTS_LIMIT: usize = 1_000_000;

/// Clamps a configured result limit into [MIN_MAX_RESULTS]..=[MAX_RESULTS_LIMIT].
pub fn clamp_max_results(value: usize) -> usize {
    let clamped = value.clamp(MIN_MAX_RESULTS, MAX_RESULTS_LIMIT);
    if clamped != value {
        warn!(
            "max_results={} out of range ({}..={}), clamped to {}",
            value, MIN_MAX_RESULTS, MAX_RESULTS_LIMIT, clamped
        );
    }
    clamped
}

/// Runs the configured editor with `args`.
///
/// Temporary disables raw mode and leaves the alternate screen while the editor runs.
/// On return, restores raw mode and the alternate screen.
pub fn open_in_editor<I, S>(editor: &Editor, args: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };

    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    let status = std::process::Command::new(editor.cmd()).args(args).status();

    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    match status {
        Ok(s) if !s.success() => {
            warn!("{} exited with {}", editor.cmd(), s);
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Recursively copies files and directories from `src` to `dest`.
///
/// If `src` is a directory, it creates the directory at `dest` and copies all its contents recursively.
pub fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let entry_path = entry.path();
            let dest_path = dest.join(entry.file_name());
            copy_recursive(&entry_path, &dest_path)?;
        }
    } else {
        fs::copy(src, dest)?;
    }
    Ok(())
}

#[inline]
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Shortens the home directory to `~` for display.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }
        let mut short = stripped.display().to_string();
        if short.starts_with(MAIN_SEPARATOR) {
            short.remove(0);
        }
        return format!("~{}{}", MAIN_SEPARATOR, short);
    }
    path.display().to_string()
}

/// Expands a leading `~` and makes `arg` absolute against the current directory.
pub fn resolve_path(arg: &str) -> io::Result<PathBuf> {
    let expanded = match arg.strip_prefix('~') {
        Some(rest) => match get_home() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(arg),
        },
        None => PathBuf::from(arg),
    };
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    fs::canonicalize(&absolute).or(Ok(absolute))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use tempfile::tempdir;

    #[test]
    fn test_clamp_max_results() {
        assert_eq!(clamp_max_results(5), MIN_MAX_RESULTS);
        assert_eq!(clamp_max_results(DEFAULT_MAX_RESULTS), DEFAULT_MAX_RESULTS);
        assert_eq!(clamp_max_results(usize::MAX), MAX_RESULTS_LIMIT);
    }

    #[test]
    fn test_copy_recursive_nested() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("a/b"))?;
        fs::write(src.join("a/b/c.txt"), "deep")?;
        fs::write(src.join("top.txt"), "top")?;

        let dest = dir.path().join("dest");
        copy_recursive(&src, &dest)?;
        assert_eq!(fs::read_to_string(dest.join("a/b/c.txt"))?, "deep");
        assert_eq!(fs::read_to_string(dest.join("top.txt"))?, "top");
        Ok(())
    }

    #[test]
    fn test_resolve_path_absolute() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let resolved = resolve_path(&dir.path().display().to_string())?;
        assert_eq!(resolved, fs::canonicalize(dir.path())?);

        let missing = dir.path().join("nope");
        assert_eq!(resolve_path(&missing.display().to_string())?, missing);
        Ok(())
    }
}
