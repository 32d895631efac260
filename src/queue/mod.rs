// SPDX-License-Identifier: MIT

//! Content-addressed work queue
//!
//! This module provides:
//! - `WorkItemStore` - deduplicating storage keyed by source hash
//! - `QueueOrder` - operator positions that outlive store refreshes
//! - `reorder` - ordering, active item selection and rule binding

mod item;
mod order;
mod source;
mod store;

pub use item::{Category, ProjectRule, RuleParameter, WorkItem};
pub use order::{parse_overrides, parse_position, reorder, PlanEntry, QueueOrder, QueuePlan};
pub use source::{content_hash, parse_source};
pub use store::WorkItemStore;
