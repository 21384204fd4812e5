//! Ignore oracle used to hide entries from listings.
//!
//! The resolver asks [IgnoreOracle::ignores] with the listing root and a root-relative path. The
//! gitignore-backed oracle anchors that path to the workspace folder whose `.gitignore` applies.

use crate::core::workspace::Workspace;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};

use std::path::{Path, PathBuf};

pub trait IgnoreOracle: Send + Sync {
    fn ignores(&self, root: &Path, relative: &Path, is_dir: bool) -> bool;
}

/// Oracle built once per session from the `.gitignore` of every workspace folder.
#[derive(Debug)]
pub struct GitignoreOracle {
    matchers: Vec<(PathBuf, Gitignore)>,
}

impl GitignoreOracle {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let mut matchers = Vec::new();
        for folder in workspace.folders() {
            let file = folder.path().join(".gitignore");
            if !file.is_file() {
                continue;
            }
            let mut builder = GitignoreBuilder::new(folder.path());
            if let Some(err) = builder.add(&file) {
                warn!("Partially parsed {}: {}", file.display(), err);
            }
            match builder.build() {
                Ok(gi) => {
                    debug!("Loaded {} ignore rules from {}", gi.num_ignores(), file.display());
                    matchers.push((folder.path().to_path_buf(), gi));
                }
                Err(e) => warn!("Ignoring {}: {}", file.display(), e),
            }
        }
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl IgnoreOracle for GitignoreOracle {
    fn ignores(&self, root: &Path, relative: &Path, is_dir: bool) -> bool {
        let absolute = root.join(relative);
        self.matchers
            .iter()
            .filter(|(base, _)| absolute.starts_with(base) && absolute != *base)
            .max_by_key(|(base, _)| base.components().count())
            .is_some_and(|(_, gi)| {
                gi.matched_path_or_any_parents(&absolute, is_dir)
                    .is_ignore()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn gitignore_rules_apply_below_the_folder() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join(".gitignore"), "target/\n*.log\n")?;
        fs::create_dir_all(dir.path().join("src/target"))?;

        let ws = Workspace::single(dir.path());
        let oracle = GitignoreOracle::from_workspace(&ws);
        assert!(!oracle.is_empty());

        assert!(oracle.ignores(dir.path(), Path::new("debug.log"), false));
        assert!(oracle.ignores(dir.path(), Path::new("target"), true));
        assert!(!oracle.ignores(dir.path(), Path::new("main.rs"), false));

        // relative to a subdirectory listing
        let src = dir.path().join("src");
        assert!(oracle.ignores(&src, Path::new("target"), true));
        assert!(oracle.ignores(&src, Path::new("target/x.rs"), false));
        assert!(!oracle.ignores(&src, Path::new("lib.rs"), false));
        Ok(())
    }

    #[test]
    fn paths_outside_the_workspace_are_kept() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join(".gitignore"), "*\n")?;
        let oracle = GitignoreOracle::from_workspace(&Workspace::single(dir.path()));
        assert!(!oracle.ignores(Path::new("/elsewhere"), Path::new("a.txt"), false));
        Ok(())
    }
}
