//! Miscellaneous utilities for quickfiler.
//!
//! - [cli]: command-line flag handling.
//! - [helpers]: result limits, editor launching, recursive copy and path display helpers.

pub mod cli;
pub mod helpers;

pub use helpers::{
    DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT, MIN_MAX_RESULTS, clamp_max_results, copy_recursive,
    get_home, open_in_editor, resolve_path, shorten_home_path,
};
