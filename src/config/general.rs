//! The general and cache settings for quickfiler.
//!
//! [General] and [Cache] are deserialized from the `qf.toml` configuration file. [General] is
//! converted into [InternalGeneral], which holds the validated values used by the session.

use crate::core::query::QueryOptions;
use crate::utils::{DEFAULT_MAX_RESULTS, clamp_max_results};

use serde::Deserialize;

use std::time::Duration;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    exclude_gitignore: bool,
    exclude: Option<String>,
    case_sensitive: bool,
    move_to_trash: bool,
    #[serde(default = "default_max_results")]
    max_results: usize,
    debounce_ms: u64,
}

impl Default for General {
    fn default() -> Self {
        General {
            exclude_gitignore: true,
            exclude: Some("**/.git".into()),
            case_sensitive: false,
            move_to_trash: true,
            max_results: DEFAULT_MAX_RESULTS,
            debounce_ms: 300,
        }
    }
}

#[derive(Debug)]
pub struct InternalGeneral {
    exclude_gitignore: bool,
    exclude: Option<String>,
    query_options: QueryOptions,
    move_to_trash: bool,
    max_results: usize,
    debounce: Duration,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        Self {
            exclude_gitignore: g.exclude_gitignore,
            exclude: g.exclude.filter(|e| !e.trim().is_empty()),
            query_options: QueryOptions::new(g.case_sensitive),
            move_to_trash: g.move_to_trash,
            max_results: clamp_max_results(g.max_results),
            debounce: Duration::from_millis(g.debounce_ms),
        }
    }
}

impl InternalGeneral {
    #[inline]
    pub fn exclude_gitignore(&self) -> bool {
        self.exclude_gitignore
    }

    #[inline]
    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_deref()
    }

    #[inline]
    pub fn query_options(&self) -> QueryOptions {
        self.query_options
    }

    #[inline]
    pub fn move_to_trash(&self) -> bool {
        self.move_to_trash
    }

    #[inline]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    #[inline]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

/// Result cache settings.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Cache {
    ttl_secs: u64,
    capacity: usize,
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            ttl_secs: crate::core::cache::DEFAULT_TTL.as_secs(),
            capacity: crate::core::cache::DEFAULT_CAPACITY,
        }
    }
}

impl Cache {
    #[inline]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.max(1)
    }
}

/// Helper function for default max_results
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
