//! Search result memoization
//!
//! Caches the id list produced by a query, keyed by a normalized query
//! signature: predicates sorted by field name, each rendered as
//! `"field=value OPERATOR "` and concatenated.
//!
//! The cache is all-or-nothing: any mutation of the owning store clears
//! every entry, since a single write can change the membership of any
//! cached result.

use std::collections::HashMap;

use super::query::Query;
use crate::record::{normalize, RecordId};

/// Cache statistics. Passive only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

/// Query-signature -> id-list cache.
#[derive(Debug, Default)]
pub struct Memoizer {
    entries: HashMap<String, Vec<RecordId>>,
    stats: MemoStats,
}

impl Memoizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized cache key for `query`.
    ///
    /// Values are lower-cased: matching is case-insensitive, so `Jo` and
    /// `jo` select the same records.
    pub fn signature(query: &Query) -> String {
        let mut parts: Vec<(&'static str, String)> = query
            .predicates()
            .iter()
            .map(|p| (p.field.name(), normalize(&p.value)))
            .collect();
        parts.sort();

        let operator = query.operator().as_str();
        parts
            .iter()
            .map(|(field, value)| format!("{}={} {} ", field, value, operator))
            .collect()
    }

    /// Returns the cached ids for `query`, if any.
    pub fn get(&mut self, query: &Query) -> Option<&[RecordId]> {
        let key = Self::signature(query);
        match self.entries.get(&key) {
            Some(ids) => {
                self.stats.hits += 1;
                Some(ids.as_slice())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, query: &Query, ids: Vec<RecordId>) {
        self.entries.insert(Self::signature(query), ids);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.stats.invalidations += 1;
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }
}
