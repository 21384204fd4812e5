//! Core runtime logic for quickfiler.
//!
//! This module contains the non-UI "engine" pieces used by the picker:
//! - [query]: turns typed text into a glob pattern (see [expand]).
//! - [workspace]: workspace folders and path display relative to them.
//! - [item]: the rows of the picker, resolved entries and menu commands alike.
//! - [fm]: the [FileSystem] seam, its local implementation and the [CancelToken].
//! - [oracle]: the gitignore oracle consulted while listing.
//! - [listing]: resolves a [ListingRequest] into rows.
//! - [cache]: time-limited memo of resolved listings.
//! - [ops]: file operations (create, rename, delete, copy).
//! - [worker]: background listing and file-operation threads.
//! - [terminal]: terminal setup/teardown and the crossterm/ratatui event loop.

pub mod cache;
pub mod fm;
pub mod item;
pub mod listing;
pub mod ops;
pub mod oracle;
pub mod query;
pub mod terminal;
pub mod worker;
pub mod workspace;

pub use cache::ResultCache;
pub use fm::{CancelToken, FileSystem, LocalFs};
pub use item::{ItemKind, ListItem};
pub use listing::{ListingRequest, Resolver};
pub use oracle::GitignoreOracle;
pub use query::{QueryOptions, expand};
pub use workspace::{Workspace, WorkspaceFolder};
