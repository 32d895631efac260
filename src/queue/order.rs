// SPDX-License-Identifier: MIT

//! Queue ordering and active item selection

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::item::WorkItem;
use super::store::WorkItemStore;
use crate::error::{QueueError, Result};
use crate::rules::{applicable_rules, RuleDefinition};

/// Persistent source hash to queue position index.
///
/// Lives outside the store so operator edits survive a full refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueOrder {
    positions: HashMap<String, i64>,
}

impl QueueOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &str) -> Option<i64> {
        self.positions.get(hash).copied()
    }

    pub fn set(&mut self, hash: impl Into<String>, position: i64) {
        self.positions.insert(hash.into(), position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Parse operator text into a queue position
pub fn parse_position(text: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| QueueError::InvalidPosition(text.to_string()))
}

/// Parse a batch of textual overrides. Either every entry parses or none is returned.
pub fn parse_overrides<I, H, T>(entries: I) -> Result<Vec<(String, i64)>>
where
    I: IntoIterator<Item = (H, T)>,
    H: Into<String>,
    T: AsRef<str>,
{
    entries
        .into_iter()
        .map(|(hash, text)| -> Result<(String, i64)> {
            Ok((hash.into(), parse_position(text.as_ref())?))
        })
        .collect()
}

/// One row of the rendering plan
#[derive(Debug, Serialize)]
pub struct PlanEntry<'a> {
    pub item: &'a WorkItem,
    pub active: bool,
    pub rules: Vec<&'a RuleDefinition>,
}

/// Ordered rendering plan produced by [`reorder`]
#[derive(Debug, Default, Serialize)]
pub struct QueuePlan<'a> {
    pub entries: Vec<PlanEntry<'a>>,
}

impl<'a> QueuePlan<'a> {
    /// The head-of-queue entry, if any
    pub fn active(&self) -> Option<&PlanEntry<'a>> {
        self.entries.iter().find(|e| e.active)
    }

    /// Source hashes in plan order
    pub fn hashes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.item.source_hash.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply position overrides, order the store and bind rules.
///
/// Positions recorded in `order` are restored onto stored items first, then
/// `overrides` are applied and recorded (overrides for absent hashes are kept
/// for later). Items are walked by ascending position, insertion order inside
/// a position; the first item walked is the active one.
pub fn reorder<'a>(
    store: &'a mut WorkItemStore,
    order: &mut QueueOrder,
    overrides: &[(String, i64)],
    definitions: &'a [RuleDefinition],
) -> QueuePlan<'a> {
    for item in store.iter_mut() {
        if let Some(position) = order.get(&item.source_hash) {
            item.queue_position = position;
        }
    }

    for (hash, position) in overrides {
        if let Some(item) = store.get_mut(hash) {
            item.queue_position = *position;
        } else {
            log::debug!("Keeping position {} for absent item {}", position, hash);
        }
        order.set(hash.clone(), *position);
    }

    let store: &'a WorkItemStore = store;
    let mut buckets: BTreeMap<i64, Vec<&'a WorkItem>> = BTreeMap::new();
    for item in store.iter() {
        order.set(item.source_hash.clone(), item.queue_position);
        buckets.entry(item.queue_position).or_default().push(item);
    }

    let entries = buckets
        .into_values()
        .flatten()
        .enumerate()
        .map(|(idx, item)| PlanEntry {
            item,
            active: idx == 0,
            rules: applicable_rules(item, definitions),
        })
        .collect();

    QueuePlan { entries }
}
