//! Hierarchical key-value cache with per-entry expiry, persisted as one JSON file.
//!
//! Values live in nested JSON objects addressed by a key path
//! (`["jira", "boards", "kraft"]`). Each leaf written by [`Cache::set`] gets a
//! sibling marker `"_<key>_expire"` holding an RFC 3339 timestamp. Expiry is
//! enforced when an entry is read; there is no background sweep.
//!
//! The backing file is read on first access and only written by
//! [`Cache::save`], which the CLI calls once before exiting.

use crate::error::{DevflowError, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default time-to-live for cache entries, in days.
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Cache file location relative to the app directory.
pub const CACHE_FILE: &str = "tmp/cache.json";

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

pub struct Cache {
    path: PathBuf,
    tree: Option<Map<String, Value>>,
    clock: Clock,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("path", &self.path)
            .field("loaded", &self.tree.is_some())
            .finish_non_exhaustive()
    }
}

/// Name of the expiry marker stored next to `key`.
pub fn expiry_key(key: &str) -> String {
    format!("_{}_expire", key)
}

fn is_expiry_key(key: &str) -> bool {
    key.starts_with('_') && key.ends_with("_expire")
}

impl Cache {
    /// Cache backed by `path`. Nothing is read until the first access.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Utc::now)
    }

    /// Cache with a custom time source, for deterministic expiry.
    pub fn with_clock(
        path: impl Into<PathBuf>,
        clock: impl Fn() -> DateTime<Utc> + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            tree: None,
            clock: Box::new(clock),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tree(&mut self) -> &mut Map<String, Value> {
        if self.tree.is_none() {
            self.tree = Some(load_tree(&self.path));
        }
        self.tree.get_or_insert_with(Map::new)
    }

    /// Read the value at `key_path`, or `default` when it is missing or expired.
    ///
    /// An expired entry is removed together with its marker.
    pub fn get(&mut self, key_path: &[&str], default: Value) -> Value {
        self.lookup(key_path).unwrap_or(default)
    }

    /// Like [`Cache::get`] but `None` on a miss.
    pub fn lookup(&mut self, key_path: &[&str]) -> Option<Value> {
        let (last, parents) = key_path.split_last()?;
        let now = (self.clock)();
        let parent = descend(self.tree(), parents)?;

        let marker = expiry_key(last);
        if is_expired(parent.get(&marker), now) {
            debug!(key = %key_path.join("."), "cache entry expired");
            parent.remove(*last);
            parent.remove(&marker);
            return None;
        }

        parent.get(*last).cloned()
    }

    /// Deserialize the value at `key_path`. Entries that no longer match `T`
    /// are treated as misses.
    pub fn lookup_as<T: serde::de::DeserializeOwned>(&mut self, key_path: &[&str]) -> Option<T> {
        let value = self.lookup(key_path)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!(key = %key_path.join("."), error = %e, "ignoring malformed cache entry");
                None
            }
        }
    }

    /// Store `value` with the default time-to-live.
    pub fn set(&mut self, key_path: &[&str], value: Value) -> Value {
        self.set_with_ttl(key_path, value, Some(DEFAULT_TTL_DAYS))
    }

    /// Serialize and store `value` with the default time-to-live.
    pub fn set_as<T: serde::Serialize>(&mut self, key_path: &[&str], value: &T) -> Result<Value> {
        let value = serde_json::to_value(value)?;
        Ok(self.set(key_path, value))
    }

    /// Store `value`, expiring after `ttl_days` (never when `None`).
    ///
    /// Missing intermediate maps are created; non-map intermediates are replaced.
    pub fn set_with_ttl(&mut self, key_path: &[&str], value: Value, ttl_days: Option<i64>) -> Value {
        let Some((last, parents)) = key_path.split_last() else {
            return value;
        };
        let now = (self.clock)();

        let mut node = self.tree();
        for segment in parents {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just made an object"),
            };
        }

        node.insert(last.to_string(), value.clone());
        let marker = expiry_key(last);
        match ttl_days {
            Some(days) => {
                let expires_at = now + Duration::days(days);
                node.insert(marker, Value::String(expires_at.to_rfc3339()));
            }
            None => {
                node.remove(&marker);
            }
        }

        value
    }

    /// Remove the subtree at `key_path` and its marker. Ancestors are kept.
    /// An empty path clears the whole cache.
    pub fn reset(&mut self, key_path: &[&str]) {
        let Some((last, parents)) = key_path.split_last() else {
            self.tree().clear();
            return;
        };

        if let Some(parent) = descend(self.tree(), parents) {
            parent.remove(*last);
            parent.remove(&expiry_key(last));
        }
    }

    /// Live child keys of the map at `key_path`: markers and expired entries
    /// are skipped (and expired entries removed).
    pub fn keys(&mut self, key_path: &[&str]) -> Vec<String> {
        let now = (self.clock)();
        let node = if key_path.is_empty() {
            Some(self.tree())
        } else {
            match self.lookup(key_path) {
                Some(Value::Object(_)) => descend(self.tree(), key_path),
                _ => None,
            }
        };
        let Some(node) = node else {
            return Vec::new();
        };

        let expired: Vec<String> = node
            .keys()
            .filter(|k| !is_expiry_key(k))
            .filter(|k| is_expired(node.get(&expiry_key(k)), now))
            .cloned()
            .collect();
        for key in &expired {
            node.remove(key);
            node.remove(&expiry_key(key));
        }

        let mut keys: Vec<String> = node.keys().filter(|k| !is_expiry_key(k)).cloned().collect();
        keys.sort();
        keys
    }

    /// Raw view of the whole tree, markers included.
    pub fn snapshot(&mut self) -> Value {
        Value::Object(self.tree().clone())
    }

    /// Write the tree to the backing file, pretty-printed.
    ///
    /// Safe to call repeatedly. A cache that was never accessed is not
    /// rewritten.
    pub fn save(&self) -> Result<()> {
        let Some(tree) = &self.tree else {
            return Ok(());
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(tree)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "cache saved");
        Ok(())
    }
}

fn load_tree(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            warn!("{}", DevflowError::CacheCorrupt(e.to_string()));
            return Map::new();
        }
    };

    if content.trim().is_empty() {
        return Map::new();
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(
                "{}",
                DevflowError::CacheCorrupt(format!("{} is not a JSON object", path.display()))
            );
            Map::new()
        }
        Err(e) => {
            warn!("{}", DevflowError::CacheCorrupt(e.to_string()));
            Map::new()
        }
    }
}

/// Walk `segments` down from `node`, stopping at the first non-map.
fn descend<'a>(
    mut node: &'a mut Map<String, Value>,
    segments: &[&str],
) -> Option<&'a mut Map<String, Value>> {
    for segment in segments {
        node = node.get_mut(*segment)?.as_object_mut()?;
    }
    Some(node)
}

/// Missing marker = never expires. A marker that does not parse counts as expired.
fn is_expired(marker: Option<&Value>, now: DateTime<Utc>) -> bool {
    let Some(marker) = marker else {
        return false;
    };
    match marker.as_str().map(DateTime::parse_from_rfc3339) {
        Some(Ok(expires_at)) => expires_at.with_timezone(&Utc) <= now,
        _ => true,
    }
}
