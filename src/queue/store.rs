// SPDX-License-Identifier: MIT

//! Content-addressed work item storage

use std::collections::HashMap;

use super::item::WorkItem;
use super::source::parse_source;
use crate::error::Result;

/// Work items keyed by source hash, iterated in insertion order
#[derive(Debug, Clone, Default)]
pub struct WorkItemStore {
    items: HashMap<String, WorkItem>,
    order: Vec<String>,
}

impl WorkItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and store a raw source.
    ///
    /// Re-ingesting identical text keeps the existing slot and queue position.
    /// On parse failure the store is not modified.
    pub fn ingest(&mut self, raw: &str) -> Result<&WorkItem> {
        let mut item = parse_source(raw)?;
        let hash = item.source_hash.clone();

        match self.items.get(&hash) {
            Some(existing) => {
                item.queue_position = existing.queue_position;
                log::debug!("Re-ingested {}", item.short_hash());
            }
            None => {
                log::info!("Ingested {} ({})", item.name(), item.short_hash());
                self.order.push(hash.clone());
            }
        }

        self.items.insert(hash.clone(), item);
        Ok(&self.items[&hash])
    }

    /// Replace the whole store with a fresh set of sources.
    ///
    /// Sources that fail to parse are logged and left out. Returns the number
    /// of items stored.
    pub fn refresh<I, S>(&mut self, sources: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fresh = WorkItemStore::new();
        for raw in sources {
            if let Err(e) = fresh.ingest(raw.as_ref()) {
                log::warn!("Skipping malformed source: {}", e);
            }
        }
        *self = fresh;
        self.len()
    }

    pub fn get(&self, hash: &str) -> Option<&WorkItem> {
        self.items.get(hash)
    }

    pub fn get_mut(&mut self, hash: &str) -> Option<&mut WorkItem> {
        self.items.get_mut(hash)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.items.contains_key(hash)
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.order.iter().map(|hash| &self.items[hash])
    }

    /// Mutable items, in no particular order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WorkItem> {
        self.items.values_mut()
    }

    pub fn hashes(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;

    fn project(name: &str) -> String {
        format!(r#"<project name="{}" weight="5"/>"#, name)
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let mut store = WorkItemStore::new();
        let raw = project("a");

        let first = store.ingest(&raw).unwrap().source_hash.clone();
        let second = store.ingest(&raw).unwrap().source_hash.clone();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reingest_keeps_position_and_slot() {
        let mut store = WorkItemStore::new();
        let a = store.ingest(&project("a")).unwrap().source_hash.clone();
        store.ingest(&project("b")).unwrap();
        store.get_mut(&a).unwrap().queue_position = 4;

        store.ingest(&project("a")).unwrap();

        assert_eq!(store.get(&a).unwrap().queue_position, 4);
        assert_eq!(store.iter().next().unwrap().source_hash, a);
    }

    #[test]
    fn test_distinct_sources_are_distinct_items() {
        let mut store = WorkItemStore::new();
        store.ingest(&project("a")).unwrap();
        store.ingest(&project("b")).unwrap();
        // Whitespace differences change the hash
        store.ingest(&format!("{} ", project("a"))).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_failed_ingest_leaves_store_untouched() {
        let mut store = WorkItemStore::new();
        store.ingest(&project("a")).unwrap();

        let err = store.ingest("<project").unwrap_err();
        assert!(matches!(err, QueueError::MalformedSource(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut store = WorkItemStore::new();
        for name in ["c", "a", "b"] {
            store.ingest(&project(name)).unwrap();
        }
        let names: Vec<String> = store.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(store.iter_mut().count(), 3);
    }

    #[test]
    fn test_refresh_replaces_contents() {
        let mut store = WorkItemStore::new();
        store.ingest(&project("old")).unwrap();

        let count = store.refresh(vec![project("a"), "<broken".to_string(), project("b")]);

        assert_eq!(count, 2);
        let names: Vec<String> = store.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
