//! Filesystem access for quickfiler.
//!
//! Everything the engine reads or mutates on disk goes through the [FileSystem] trait, so the
//! listing resolver, the cache and the file operations can be driven by an instrumented or fake
//! implementation in tests. [LocalFs] is the real one: directory walks use `ignore::WalkBuilder`
//! and glob matching uses `globset` against root-relative paths.

use crate::error::{FilerError, Result};
use crate::utils::copy_recursive;

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use log::debug;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation scope for one listing request.
///
/// The issuer keeps a clone and is the only party that calls [CancelToken::cancel]. Searches poll
/// [CancelToken::is_cancelled] and stop emitting once it flips.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub is_dir: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub use_trash: bool,
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub overwrite: bool,
}

/// Filesystem collaborator consumed by the engine.
pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> Result<Stat>;

    /// Names of the immediate entries of `dir`, in enumeration order.
    fn list_entries(&self, dir: &Path) -> Result<Vec<OsString>>;

    /// Absolute paths of files under `root` whose root-relative path matches `pattern`.
    ///
    /// Entries matching `exclude` are skipped, directories included. Returns
    /// [FilerError::Cancelled] as soon as `cancel` is observed.
    fn search(
        &self,
        root: &Path,
        pattern: &str,
        exclude: Option<&str>,
        max_results: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn create_dir(&self, path: &Path) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn delete(&self, path: &Path, options: DeleteOptions) -> Result<()>;

    fn copy(&self, src: &Path, dst: &Path, options: CopyOptions) -> Result<()>;
}

/// [FileSystem] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn stat(&self, path: &Path) -> Result<Stat> {
        let meta = fs::metadata(path).map_err(|e| FilerError::from_io(path, e))?;
        Ok(Stat {
            is_dir: meta.is_dir(),
        })
    }

    fn list_entries(&self, dir: &Path) -> Result<Vec<OsString>> {
        let read = fs::read_dir(dir).map_err(|e| FilerError::from_io(dir, e))?;
        let mut names = Vec::new();
        for entry in read {
            match entry {
                Ok(entry) => names.push(entry.file_name()),
                Err(e) => debug!("Skipping unreadable entry in {}: {}", dir.display(), e),
            }
        }
        Ok(names)
    }

    fn search(
        &self,
        root: &Path,
        pattern: &str,
        exclude: Option<&str>,
        max_results: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>> {
        let matcher = compile_glob(pattern)?;
        let exclude = exclude
            .filter(|e| !e.trim().is_empty())
            .map(compile_glob)
            .transpose()?;

        fs::metadata(root).map_err(|e| FilerError::from_io(root, e))?;

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        if !is_recursive(pattern) {
            builder.max_depth(Some(1));
        }
        if let Some(exclude) = exclude {
            let base = root.to_path_buf();
            builder.filter_entry(move |entry| match entry.path().strip_prefix(&base) {
                Ok(rel) if !rel.as_os_str().is_empty() => !exclude.is_match(rel),
                _ => true,
            });
        }

        let mut results = Vec::new();
        for entry in builder.build() {
            if cancel.is_cancelled() {
                return Err(FilerError::Cancelled);
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Search skipped an entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            let is_file = entry.file_type().is_some_and(|ft| {
                ft.is_file() || (ft.is_symlink() && entry.path().is_file())
            });
            if !is_file {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            if matcher.is_match(rel) {
                results.push(entry.into_path());
                if results.len() >= max_results {
                    break;
                }
            }
        }
        Ok(results)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).map_err(|e| FilerError::from_io(path, e))
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| FilerError::from_io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| FilerError::from_io(from, e))
    }

    fn delete(&self, path: &Path, options: DeleteOptions) -> Result<()> {
        if options.use_trash {
            return trash::delete(path)
                .map_err(|e| FilerError::Io(std::io::Error::other(e.to_string())));
        }
        let meta = fs::symlink_metadata(path).map_err(|e| FilerError::from_io(path, e))?;
        let res = if meta.is_dir() {
            if options.recursive {
                fs::remove_dir_all(path)
            } else {
                fs::remove_dir(path)
            }
        } else {
            fs::remove_file(path)
        };
        res.map_err(|e| FilerError::from_io(path, e))
    }

    fn copy(&self, src: &Path, dst: &Path, options: CopyOptions) -> Result<()> {
        if !self.exists(src) {
            return Err(FilerError::NotFound(src.to_path_buf()));
        }
        if !options.overwrite && self.exists(dst) {
            return Err(FilerError::from_io(
                dst,
                std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            ));
        }
        copy_recursive(src, dst).map_err(|e| FilerError::from_io(src, e))
    }
}

/// Compiles a glob with `/` treated as a literal separator.
///
/// A `**` that is not a whole path component only spans characters inside that component, so it
/// is reduced to `*` before compiling.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(&component_stars(pattern))
        .literal_separator(true)
        .build()?;
    Ok(glob.compile_matcher())
}

fn component_stars(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '*' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i] == '*' {
            i += 1;
        }
        let whole_component =
            (start == 0 || chars[start - 1] == '/') && (i == chars.len() || chars[i] == '/');
        if i - start >= 2 && whole_component {
            out.push_str("**");
        } else {
            out.push('*');
        }
    }
    out
}

fn is_recursive(pattern: &str) -> bool {
    pattern.contains('/') || pattern.contains("**")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn in_component_double_star_is_reduced() {
        assert_eq!(component_stars("**/{foo,bar}**"), "**/{foo,bar}*");
        assert_eq!(component_stars("**"), "**");
        assert_eq!(component_stars("a/**/b***"), "a/**/b*");
        assert_eq!(component_stars("*"), "*");
    }

    #[test]
    fn immediate_search_does_not_descend() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("top.txt"))?;
        fs::create_dir(dir.path().join("sub"))?;
        File::create(dir.path().join("sub/deep.txt"))?;

        let found = LocalFs.search(dir.path(), "*", None, 100, &CancelToken::new())?;
        assert_eq!(found, vec![dir.path().join("top.txt")]);
        Ok(())
    }

    #[test]
    fn recursive_search_matches_file_names() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("a/b"))?;
        File::create(dir.path().join("a/b/foo_bar.rs"))?;
        File::create(dir.path().join("a/other.rs"))?;
        File::create(dir.path().join("fooBar.txt"))?;

        let found = LocalFs.search(
            dir.path(),
            "**/{fooBar,foo_bar}**",
            None,
            100,
            &CancelToken::new(),
        )?;
        assert_eq!(found.len(), 2, "{found:?}");
        assert!(found.contains(&dir.path().join("a/b/foo_bar.rs")));
        assert!(found.contains(&dir.path().join("fooBar.txt")));
        Ok(())
    }

    #[test]
    fn exclude_prunes_directories() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join(".git/objects"))?;
        File::create(dir.path().join(".git/objects/config"))?;
        File::create(dir.path().join("config"))?;

        let found = LocalFs.search(
            dir.path(),
            "**/config**",
            Some("**/.git"),
            100,
            &CancelToken::new(),
        )?;
        assert_eq!(found, vec![dir.path().join("config")]);
        Ok(())
    }

    #[test]
    fn search_honours_limits_and_cancellation() -> Result<()> {
        let dir = tempdir()?;
        for i in 0..10 {
            File::create(dir.path().join(format!("f{i}.txt")))?;
        }
        let found = LocalFs.search(dir.path(), "*", None, 3, &CancelToken::new())?;
        assert_eq!(found.len(), 3);

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = LocalFs.search(dir.path(), "*", None, 100, &cancel);
        assert!(matches!(err, Err(FilerError::Cancelled)));
        Ok(())
    }

    #[test]
    fn missing_root_is_not_found() {
        let err = LocalFs.search(
            Path::new("/definitely/not/here"),
            "*",
            None,
            10,
            &CancelToken::new(),
        );
        assert!(matches!(err, Err(FilerError::NotFound(_))));
    }

    #[test]
    fn copy_refuses_to_overwrite() -> Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "a")?;
        fs::write(&dst, "b")?;

        let err = LocalFs.copy(&src, &dst, CopyOptions::default());
        assert!(matches!(err, Err(FilerError::AlreadyExists(_))));

        LocalFs.copy(&src, &dst, CopyOptions { overwrite: true })?;
        assert_eq!(fs::read_to_string(&dst)?, "a");
        Ok(())
    }

    #[test]
    fn delete_without_trash() -> Result<()> {
        let dir = tempdir()?;
        let sub = dir.path().join("sub");
        fs::create_dir_all(sub.join("inner"))?;
        File::create(sub.join("inner/x"))?;

        let err = LocalFs.delete(&sub, DeleteOptions::default());
        assert!(err.is_err());
        LocalFs.delete(
            &sub,
            DeleteOptions {
                use_trash: false,
                recursive: true,
            },
        )?;
        assert!(!LocalFs.exists(&sub));
        Ok(())
    }
}
