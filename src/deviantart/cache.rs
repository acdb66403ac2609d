//! On-disk cache for listing responses
//!
//! Keys are the SHA-256 of the request path plus its sorted query parameters.
//! The access token never takes part in the key.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::observability::{trace_event, Event, Logger};

/// JSON response cache under one directory
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    /// Skip reads; entries are still rewritten
    refresh: bool,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, refresh: bool) -> Self {
        Self {
            dir: dir.into(),
            refresh,
        }
    }

    /// Cache that is written but never read
    ///
    /// Used when the listing must be live while later commands may still
    /// reuse what this one fetched.
    pub fn write_only(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, true)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stable key for `path` and `params`, independent of parameter order
    pub fn key(path: &str, params: &[(String, String)]) -> String {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();

        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        for (name, value) in sorted {
            hasher.update(b"\n");
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Cached payload, unless refreshing or absent or unreadable
    pub fn get(&self, key: &str) -> Option<Value> {
        if self.refresh {
            return None;
        }
        let text = fs::read_to_string(self.entry_path(key)).ok()?;
        let value = serde_json::from_str(&text).ok()?;
        trace_event(Event::CacheHit, &[("key", key)]);
        Some(value)
    }

    /// Store `payload`; failures only cost a future cache miss
    pub fn put(&self, key: &str, payload: &Value) {
        let result = fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.entry_path(key), payload.to_string()));
        match result {
            Ok(()) => trace_event(Event::CacheStore, &[("key", key)]),
            Err(e) => {
                let detail = e.to_string();
                Logger::warn(Event::CacheStore.as_str(), &[("error", &detail), ("key", key)]);
            }
        }
    }
}
