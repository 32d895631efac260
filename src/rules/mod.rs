// SPDX-License-Identifier: MIT

//! Configured rules: definitions, binding to work items, loading and execution

pub mod binding;
pub mod definition;
pub mod executor;
pub mod loader;

pub use binding::{applicable_rules, applies};
pub use definition::{Rgb, RuleAction, RuleDefinition, RuleKind};
pub use executor::{ActionExecutor, ExecutionOutcome, Launcher, ProcessLauncher};
pub use loader::{load_definitions, DefinitionLoader};
