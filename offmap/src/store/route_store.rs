//! The per-family route store.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::entry::{route_file_stem, write_atomic, EntryHeader, IndexedEntry, RouteCacheEntry};
use super::StoreError;
use crate::coord::BoundingBox;
use crate::features::FeatureFamily;

/// Counts reported by [`RouteFeatureStore::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub routes: usize,
    /// Sum of per-route record counts.
    pub records: usize,
}

struct StoreInner<F: FeatureFamily> {
    entries: HashMap<String, IndexedEntry<F>>,
    next_seq: u64,
}

impl<F: FeatureFamily> StoreInner<F> {
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Entries in creation order.
    fn ordered(&self) -> Vec<&IndexedEntry<F>> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }
}

/// Route-keyed, deduplicating record store for one feature family.
///
/// All reads return owned copies; the map is guarded by a reader/writer lock
/// so readers see a route either before or after an upsert, never halfway.
pub struct RouteFeatureStore<F: FeatureFamily> {
    directory: PathBuf,
    inner: RwLock<StoreInner<F>>,
}

impl<F: FeatureFamily> RouteFeatureStore<F> {
    /// Create an empty store persisting into `directory`.
    ///
    /// Nothing is read from disk until [`load_all`](Self::load_all).
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            inner: RwLock::new(StoreInner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File backing `route_id`.
    pub fn route_path(&self, route_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}.json", route_file_stem(route_id)))
    }

    /// Start a fresh entry for `route_id`, discarding any previous records.
    ///
    /// A replaced route also takes a new creation sequence and timestamp, so
    /// it moves behind every other route in [`get_all`](Self::get_all). The
    /// same order is rebuilt by [`load_all`](Self::load_all) from `createdAt`
    /// after a restart.
    pub fn begin(&self, route_id: &str, corridor_radius: Option<f64>) {
        let mut inner = self.inner.write();
        let seq = inner.next_seq();
        let replaced = inner
            .entries
            .insert(
                route_id.to_string(),
                IndexedEntry::empty(route_id, corridor_radius, seq),
            )
            .is_some();

        tracing::debug!(family = F::NAME, route_id, replaced, "Began route entry");
    }

    /// Merge `records` into the route's entry, creating it if needed.
    ///
    /// Records whose key is already present are dropped. Returns the number
    /// of records actually added.
    pub fn upsert(&self, route_id: &str, records: Vec<F::Record>) -> usize {
        let mut inner = self.inner.write();
        if !inner.entries.contains_key(route_id) {
            let seq = inner.next_seq();
            inner
                .entries
                .insert(route_id.to_string(), IndexedEntry::empty(route_id, None, seq));
        }

        match inner.entries.get_mut(route_id) {
            Some(entry) => entry.extend(records),
            None => 0,
        }
    }

    /// Every record of every route, deduplicated by key across routes.
    ///
    /// Earlier-created routes win, then record order within a route.
    pub fn get_all(&self) -> Vec<F::Record> {
        let inner = self.inner.read();
        let mut seen: HashSet<F::Key> = HashSet::new();
        let mut out = Vec::new();

        for indexed in inner.ordered() {
            for record in &indexed.entry.records {
                if seen.insert(F::key(record)) {
                    out.push(record.clone());
                }
            }
        }
        out
    }

    /// Records with at least one vertex inside `bounds`.
    pub fn get_in_bounds(&self, bounds: &BoundingBox) -> Vec<F::Record> {
        self.get_all()
            .into_iter()
            .filter(|record| bounds.intersects_any(F::vertices(record)))
            .collect()
    }

    pub fn get_route(&self, route_id: &str) -> Option<RouteCacheEntry<F::Record>> {
        self.inner
            .read()
            .entries
            .get(route_id)
            .map(|indexed| indexed.entry.clone())
    }

    /// Route ids in creation order.
    pub fn route_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .ordered()
            .into_iter()
            .map(|indexed| indexed.entry.route_id.clone())
            .collect()
    }

    /// Number of records cached for `route_id` (0 if unknown).
    pub fn len(&self, route_id: &str) -> usize {
        self.inner
            .read()
            .entries
            .get(route_id)
            .map_or(0, |indexed| indexed.entry.records.len())
    }

    pub fn has(&self, route_id: &str) -> bool {
        self.inner.read().entries.contains_key(route_id)
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            routes: inner.entries.len(),
            records: inner
                .entries
                .values()
                .map(|indexed| indexed.entry.records.len())
                .sum(),
        }
    }

    /// Write the route's entry to disk. A route with no entry is a no-op.
    pub fn persist(&self, route_id: &str) -> Result<(), StoreError> {
        let path = self.route_path(route_id);

        // Serialize under the read lock, write after releasing it
        let document = {
            let inner = self.inner.read();
            match inner.entries.get(route_id) {
                Some(indexed) => indexed.to_document(&path)?,
                None => return Ok(()),
            }
        };

        write_atomic(&path, &document)?;
        tracing::trace!(family = F::NAME, route_id, path = %path.display(), "Persisted route entry");
        Ok(())
    }

    /// Hydrate from every `*.json` file in the store directory.
    ///
    /// Files that do not parse as an entry of this family are skipped with a
    /// warning. A missing directory is treated as empty. Returns the number
    /// of routes loaded.
    pub fn load_all(&self) -> Result<usize, StoreError> {
        let paths = match self.json_files() {
            Ok(paths) => paths,
            Err(StoreError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                return Ok(0)
            }
            Err(e) => return Err(e),
        };

        let mut loaded = Vec::new();
        for path in paths {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(family = F::NAME, path = %path.display(), error = %e, "Skipping unreadable route file");
                    continue;
                }
            };

            match IndexedEntry::<F>::from_bytes(&bytes, 0) {
                Some(indexed) => loaded.push(indexed),
                None => {
                    tracing::warn!(family = F::NAME, path = %path.display(), "Skipping corrupt route file");
                }
            }
        }

        // Creation order for cross-route reads follows the recorded timestamps
        loaded.sort_by(|a, b| {
            a.entry
                .created_at
                .cmp(&b.entry.created_at)
                .then_with(|| a.entry.route_id.cmp(&b.entry.route_id))
        });

        let count = loaded.len();
        let mut inner = self.inner.write();
        for mut indexed in loaded {
            indexed.seq = inner.next_seq();
            inner
                .entries
                .insert(indexed.entry.route_id.clone(), indexed);
        }
        drop(inner);

        tracing::info!(family = F::NAME, routes = count, directory = %self.directory.display(), "Loaded cached routes");
        Ok(count)
    }

    /// Drop the route from memory and delete its file.
    ///
    /// Returns whether anything existed.
    pub fn clear(&self, route_id: &str) -> Result<bool, StoreError> {
        let in_memory = self.inner.write().entries.remove(route_id).is_some();

        let path = self.route_path(route_id);
        let on_disk = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(StoreError::io(path, e)),
        };

        if in_memory || on_disk {
            tracing::info!(family = F::NAME, route_id, "Cleared route");
        }
        Ok(in_memory || on_disk)
    }

    /// Drop every route and delete this family's cache files.
    ///
    /// Only `*.json` files that parse as a route entry header are removed;
    /// anything else in the directory is left alone. Returns the number of
    /// files deleted.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        self.inner.write().entries.clear();

        let paths = match self.json_files() {
            Ok(paths) => paths,
            Err(StoreError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                return Ok(0)
            }
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for path in paths {
            let is_entry = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<EntryHeader>(&bytes).ok())
                .is_some();
            if !is_entry {
                continue;
            }
            fs::remove_file(&path).map_err(|e| StoreError::io(&path, e))?;
            removed += 1;
        }

        tracing::info!(family = F::NAME, files = removed, "Cleared all routes");
        Ok(removed)
    }

    fn json_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let read_dir =
            fs::read_dir(&self.directory).map_err(|e| StoreError::io(&self.directory, e))?;

        let mut paths = Vec::new();
        for dir_entry in read_dir {
            let path = dir_entry
                .map_err(|e| StoreError::io(&self.directory, e))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}
