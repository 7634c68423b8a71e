//! Route cache entries and their on-disk representation.

use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::StoreError;
use crate::features::FeatureFamily;

/// All records cached for one route in one family.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCacheEntry<R> {
    pub route_id: String,
    pub created_at: DateTime<Utc>,
    /// Query radius the records were fetched with (Overpass families only).
    pub corridor_radius: Option<f64>,
    pub records: Vec<R>,
}

/// Metadata fields shared by every family's route file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryHeader {
    pub route_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub corridor_radius: Option<f64>,
}

/// In-memory entry with its dedup index.
pub(crate) struct IndexedEntry<F: FeatureFamily> {
    pub entry: RouteCacheEntry<F::Record>,
    pub keys: HashSet<F::Key>,
    /// Creation sequence, orders routes for cross-route reads.
    pub seq: u64,
}

impl<F: FeatureFamily> IndexedEntry<F> {
    pub fn empty(route_id: &str, corridor_radius: Option<f64>, seq: u64) -> Self {
        Self {
            entry: RouteCacheEntry {
                route_id: route_id.to_string(),
                created_at: Utc::now(),
                corridor_radius: if F::USES_CORRIDOR_RADIUS {
                    corridor_radius
                } else {
                    None
                },
                records: Vec::new(),
            },
            keys: HashSet::new(),
            seq,
        }
    }

    /// Append records whose key is not yet present. Returns how many were added.
    pub fn extend(&mut self, records: impl IntoIterator<Item = F::Record>) -> usize {
        let mut added = 0;
        for record in records {
            if self.keys.insert(F::key(&record)) {
                self.entry.records.push(record);
                added += 1;
            }
        }
        added
    }

    /// Build the JSON document written to disk.
    pub fn to_document(&self, path: &Path) -> Result<Value, StoreError> {
        let mut doc = Map::new();
        doc.insert(
            "routeId".to_string(),
            Value::String(self.entry.route_id.clone()),
        );
        doc.insert(
            "createdAt".to_string(),
            Value::String(self.entry.created_at.to_rfc3339()),
        );
        if F::USES_CORRIDOR_RADIUS {
            if let Some(radius) = self.entry.corridor_radius {
                doc.insert("corridorRadius".to_string(), Value::from(radius));
            }
        }
        let records =
            serde_json::to_value(&self.entry.records).map_err(|source| StoreError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;
        doc.insert(F::RECORDS_FIELD.to_string(), records);
        Ok(Value::Object(doc))
    }

    /// Parse a route file. Returns `None` for anything that is not a valid
    /// entry of this family.
    pub fn from_bytes(bytes: &[u8], seq: u64) -> Option<Self> {
        let mut doc: Map<String, Value> = serde_json::from_slice(bytes).ok()?;
        let records = doc.remove(F::RECORDS_FIELD)?;
        let header = EntryHeader::deserialize(Value::Object(doc)).ok()?;
        let records: Vec<F::Record> = serde_json::from_value(records).ok()?;

        let mut indexed = Self::empty(&header.route_id, header.corridor_radius, seq);
        indexed.entry.created_at = header.created_at;
        indexed.extend(records);
        Some(indexed)
    }
}

/// Map a route id onto a file stem, one stem per id.
///
/// ASCII alphanumerics, `-`, `_` and `.` pass through; every other byte of
/// the UTF-8 encoding becomes `%XX`. Since `%` itself is always escaped the
/// mapping is injective. The empty id maps to `%`, which no escape produces.
pub fn route_file_stem(route_id: &str) -> String {
    if route_id.is_empty() {
        return "%".to_string();
    }

    let mut stem = String::with_capacity(route_id.len());
    for byte in route_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Distinguishes temp files of concurrent writers within this process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `value` to `path` through a uniquely named temporary sibling and
/// rename.
pub(crate) fn write_atomic(path: &Path, value: &Value) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(
        "{}.{}-{}.tmp",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = write_file(&temp_path, value)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_file(temp_path: &Path, value: &Value) -> Result<(), StoreError> {
    let file = fs::File::create(temp_path).map_err(|e| StoreError::io(temp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| StoreError::Serialize {
        path: temp_path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| StoreError::io(temp_path, e))
}
