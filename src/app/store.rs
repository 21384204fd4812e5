//! Persisted session state for quickfiler.
//!
//! Exactly one value is remembered between sessions: the last directory the picker showed, per
//! workspace. [TomlStore] keeps it in `state.toml` under the user's state directory, keyed by
//! [Workspace::key]. [MemoryStore] keeps it in memory.

use crate::core::fm::FileSystem;
use crate::core::workspace::Workspace;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

pub trait StateStore {
    fn last_open_dir(&self) -> Option<PathBuf>;

    /// Stores `dir`, or forgets the value for `None` (the workspace-root view).
    fn set_last_open_dir(&mut self, dir: Option<&Path>) -> io::Result<()>;
}

/// The stored directory if it still exists. A stored file resolves to its parent directory.
pub fn restore_last_dir(store: &dyn StateStore, fs: &dyn FileSystem) -> Option<PathBuf> {
    let dir = store.last_open_dir()?;
    match fs.stat(&dir) {
        Ok(stat) if stat.is_dir => Some(dir),
        Ok(_) => dir.parent().map(Path::to_path_buf),
        Err(e) => {
            debug!("Ignoring stored directory {}: {}", dir.display(), e);
            None
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
struct StateFile {
    last_open_dir: BTreeMap<String, PathBuf>,
}

/// [StateStore] backed by a toml file shared by every workspace.
pub struct TomlStore {
    path: PathBuf,
    key: String,
    state: StateFile,
}

impl TomlStore {
    /// Opens the store at [TomlStore::default_path] for `workspace`.
    pub fn open(workspace: &Workspace) -> Self {
        Self::open_at(Self::default_path(), workspace)
    }

    pub fn open_at(path: PathBuf, workspace: &Workspace) -> Self {
        let state = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!("Discarding unreadable state file {}: {}", path.display(), e);
                StateFile::default()
            }),
            Err(_) => StateFile::default(),
        };
        Self {
            path,
            key: workspace.key(),
            state,
        }
    }

    /// `$XDG_STATE_HOME/quickfiler/state.toml`, falling back to the data directory.
    pub fn default_path() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("quickfiler/state.toml")
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(&self.state).map_err(io::Error::other)?;
        fs::write(&self.path, content)
    }
}

impl StateStore for TomlStore {
    fn last_open_dir(&self) -> Option<PathBuf> {
        self.state.last_open_dir.get(&self.key).cloned()
    }

    fn set_last_open_dir(&mut self, dir: Option<&Path>) -> io::Result<()> {
        match dir {
            Some(dir) => {
                self.state
                    .last_open_dir
                    .insert(self.key.clone(), dir.to_path_buf());
            }
            None => {
                self.state.last_open_dir.remove(&self.key);
            }
        }
        self.save()
    }
}

/// In-memory [StateStore].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    dir: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }
}

impl StateStore for MemoryStore {
    fn last_open_dir(&self) -> Option<PathBuf> {
        self.dir.clone()
    }

    fn set_last_open_dir(&mut self, dir: Option<&Path>) -> io::Result<()> {
        self.dir = dir.map(Path::to_path_buf);
        Ok(())
    }
}
