// SPDX-License-Identifier: MIT

//! Fabrication job queue: a condition language that gates configured rules,
//! and a content-addressed queue that picks the active job.

pub mod condition;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod queue;
pub mod rules;

pub use engine::{Preparation, QueueEngine};
pub use environment::Environment;
pub use error::{QueueError, Result};
