//! Result cache for quickfiler listings.
//!
//! Memoizes resolved rows per (root, query, paste-row, case mode). Entries expire a fixed time
//! after insertion and reads never extend that. When full, the least recently used entry is
//! evicted. The cache is shared by the session and the worker threads behind a `Mutex`, and a
//! generation counter keeps a resolution that started before [ResultCache::invalidate_all] from
//! re-populating the cache with stale rows.

use crate::core::fm::CancelToken;
use crate::core::item::ListItem;
use crate::core::listing::{ListingRequest, Resolver};
use crate::error::{FilerError, Result};

use log::{debug, info};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    root: PathBuf,
    query: String,
    has_copy_target: bool,
    case_sensitive: bool,
}

impl CacheKey {
    fn for_request(root: PathBuf, request: &ListingRequest) -> Self {
        Self {
            root,
            query: request.query.clone().unwrap_or_default(),
            has_copy_target: request.copy_target.is_some(),
            case_sensitive: request.options.case_sensitive,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    items: Arc<Vec<ListItem>>,
    inserted: Instant,
    last_access: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    generation: u64,
    clock: u64,
}

#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry. Resolutions already in flight will not be stored.
    pub fn invalidate_all(&self) {
        let mut inner = self.lock();
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.generation = inner.generation.wrapping_add(1);
        info!("Cache invalidated ({} entries dropped)", dropped);
    }

    /// Cached rows for `request`, if present and unexpired.
    pub fn get(&self, request: &ListingRequest) -> Option<Arc<Vec<ListItem>>> {
        self.get_at(request, Instant::now())
    }

    pub fn get_at(&self, request: &ListingRequest, now: Instant) -> Option<Arc<Vec<ListItem>>> {
        let root = request.root.clone()?;
        let key = CacheKey::for_request(root, request);
        let mut inner = self.lock();
        self.lookup(&mut inner, &key, now)
    }

    pub fn get_or_resolve(
        &self,
        resolver: &Resolver,
        request: &ListingRequest,
        cancel: &CancelToken,
    ) -> Result<Arc<Vec<ListItem>>> {
        self.get_or_resolve_at(resolver, request, cancel, Instant::now())
    }

    /// Returns the cached rows for `request` or resolves and stores them.
    ///
    /// A cancelled resolution leaves the cache untouched.
    pub fn get_or_resolve_at(
        &self,
        resolver: &Resolver,
        request: &ListingRequest,
        cancel: &CancelToken,
        now: Instant,
    ) -> Result<Arc<Vec<ListItem>>> {
        let Some(root) = request.root.clone() else {
            return Ok(Arc::new(Vec::new()));
        };
        let key = CacheKey::for_request(root, request);

        let generation = {
            let mut inner = self.lock();
            if let Some(items) = self.lookup(&mut inner, &key, now) {
                debug!("Cache hit for {:?}", key);
                return Ok(items);
            }
            inner.generation
        };

        debug!("Cache miss for {:?}", key);
        let items = Arc::new(resolver.resolve(request, cancel)?);
        if cancel.is_cancelled() {
            return Err(FilerError::Cancelled);
        }

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Not caching {:?}: invalidated while resolving", key);
            return Ok(items);
        }
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            evict_lru(&mut inner);
        }
        inner.clock += 1;
        let last_access = inner.clock;
        inner.entries.insert(
            key,
            CacheEntry {
                items: Arc::clone(&items),
                inserted: now,
                last_access,
            },
        );
        Ok(items)
    }

    /// Rows for the view `request` asks for.
    ///
    /// A request without a root aggregates every workspace folder, each resolved and cached on
    /// its own, concatenated in folder order.
    pub fn load_view(
        &self,
        resolver: &Resolver,
        request: &ListingRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<ListItem>> {
        if request.root.is_some() {
            return Ok(self.get_or_resolve(resolver, request, cancel)?.to_vec());
        }
        let mut items = Vec::new();
        for folder in resolver.workspace().folders() {
            let rows = self.get_or_resolve(resolver, &request.at(folder.path()), cancel)?;
            items.extend(rows.iter().cloned());
        }
        Ok(items)
    }

    fn lookup(
        &self,
        inner: &mut CacheInner,
        key: &CacheKey,
        now: Instant,
    ) -> Option<Arc<Vec<ListItem>>> {
        let expired = {
            let entry = inner.entries.get(key)?;
            now.saturating_duration_since(entry.inserted) >= self.ttl
        };
        if expired {
            debug!("Cache entry expired for {:?}", key);
            inner.entries.remove(key);
            return None;
        }
        inner.clock += 1;
        let clock = inner.clock;
        let entry = inner.entries.get_mut(key)?;
        entry.last_access = clock;
        Some(Arc::clone(&entry.items))
    }
}

fn evict_lru(inner: &mut CacheInner) {
    let oldest = inner
        .entries
        .iter()
        .min_by_key(|(_, e)| e.last_access)
        .map(|(k, _)| k.clone());
    if let Some(key) = oldest {
        debug!("Evicting {:?}", key);
        inner.entries.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fm::LocalFs;
    use crate::core::workspace::Workspace;
    use rand::Rng;
    use std::fs::File;
    use tempfile::tempdir;

    fn setup() -> std::io::Result<(tempfile::TempDir, Resolver)> {
        let dir = tempdir()?;
        File::create(dir.path().join("a.txt"))?;
        let resolver = Resolver::new(Arc::new(LocalFs), Arc::new(Workspace::single(dir.path())));
        Ok((dir, resolver))
    }

    #[test]
    fn hit_returns_the_same_rows() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (dir, resolver) = setup()?;
        let cache = ResultCache::default();
        let request = ListingRequest::new(Some(dir.path().to_path_buf())).with_query("a");
        let cancel = CancelToken::new();

        let first = cache.get_or_resolve(&resolver, &request, &cancel)?;
        let second = cache.get_or_resolve(&resolver, &request, &cancel)?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn entries_expire_from_insertion() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (dir, resolver) = setup()?;
        let cache = ResultCache::new(Duration::from_secs(10), 10);
        let request = ListingRequest::new(Some(dir.path().to_path_buf()));
        let cancel = CancelToken::new();
        let t0 = Instant::now();

        let first = cache.get_or_resolve_at(&resolver, &request, &cancel, t0)?;
        // reads do not slide the expiry
        assert!(cache.get_at(&request, t0 + Duration::from_secs(9)).is_some());
        assert!(cache.get_at(&request, t0 + Duration::from_secs(10)).is_none());

        let later = t0 + Duration::from_secs(11);
        let fresh = cache.get_or_resolve_at(&resolver, &request, &cancel, later)?;
        assert!(!Arc::ptr_eq(&first, &fresh));
        Ok(())
    }

    #[test]
    fn invalidation_forces_a_fresh_resolution()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (dir, resolver) = setup()?;
        let cache = ResultCache::default();
        let request = ListingRequest::new(Some(dir.path().to_path_buf()));
        let cancel = CancelToken::new();

        let first = cache.get_or_resolve(&resolver, &request, &cancel)?;
        File::create(dir.path().join("b.txt"))?;
        cache.invalidate_all();
        assert!(cache.is_empty());

        let second = cache.get_or_resolve(&resolver, &request, &cancel)?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), first.len() + 1);
        Ok(())
    }

    #[test]
    fn copy_target_is_part_of_the_key() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (dir, resolver) = setup()?;
        let cache = ResultCache::default();
        let cancel = CancelToken::new();
        let plain = ListingRequest::new(Some(dir.path().to_path_buf()));
        let pasting = plain.clone().with_copy_target(Some(dir.path().join("a.txt")));

        let a = cache.get_or_resolve(&resolver, &plain, &cancel)?;
        let b = cache.get_or_resolve(&resolver, &pasting, &cancel)?;
        assert_eq!(b.len(), a.len() + 1);
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn cancelled_resolution_is_not_stored() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let (dir, resolver) = setup()?;
        let cache = ResultCache::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let request = ListingRequest::new(Some(dir.path().to_path_buf()));
        let res = cache.get_or_resolve(&resolver, &request, &cancel);
        assert!(matches!(res, Err(FilerError::Cancelled)));
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn capacity_is_a_hard_bound() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (dir, resolver) = setup()?;
        let mut rng = rand::rng();
        let capacity = rng.random_range(1..6);
        let cache = ResultCache::new(DEFAULT_TTL, capacity);
        let cancel = CancelToken::new();
        let base = ListingRequest::new(Some(dir.path().to_path_buf()));

        let keep = base.clone().with_query("keep");
        cache.get_or_resolve(&resolver, &keep, &cancel)?;
        for i in 0..capacity * 3 {
            // touching `keep` makes it the most recently used entry
            if capacity > 1 {
                assert!(cache.get(&keep).is_some());
            }
            let request = base.clone().with_query(format!("q{i}"));
            cache.get_or_resolve(&resolver, &request, &cancel)?;
            assert!(cache.len() <= capacity);
        }
        if capacity > 1 {
            assert!(cache.get(&keep).is_some());
        }
        Ok(())
    }
}
