// SPDX-License-Identifier: MIT

//! Condition language for rule gating
//!
//! One condition per line, each a numeric comparison over a single field:
//! - `weight >= 10.0`
//! - `width > 5.0 in`
//! - `4.0 in < height > 50.0 in`
//!
//! All lines must hold for the set to match.

mod ast;
mod evaluator;
mod parser;

pub use ast::{Bound, CompareOp, Condition, ConditionSet};
pub use evaluator::{evaluate, evaluate_condition};
pub use parser::{parse, parse_all};
