// SPDX-License-Identifier: MIT

//! Selects which configured rules apply to a work item

use super::definition::{RuleDefinition, RuleKind};
use crate::condition;
use crate::environment::Environment;
use crate::queue::WorkItem;

/// Rules applicable to a work item, in configuration order
pub fn applicable_rules<'a>(
    item: &WorkItem,
    definitions: &'a [RuleDefinition],
) -> Vec<&'a RuleDefinition> {
    definitions
        .iter()
        .filter(|def| applies(def, &item.attributes))
        .collect()
}

/// Check a single definition against an environment.
///
/// Invoke rules are always offered, whatever their conditions. Mutate rules
/// need a non-empty condition set that evaluates to true. A definition whose
/// conditions do not parse never applies.
pub fn applies(definition: &RuleDefinition, env: &Environment) -> bool {
    match definition.kind() {
        RuleKind::Invoke => true,
        RuleKind::Mutate => {
            if definition.conditions.is_empty() {
                return false;
            }
            match condition::parse_all(&definition.conditions) {
                Ok(conditions) => condition::evaluate(&conditions, env),
                Err(e) => {
                    log::warn!(
                        "Skipping rule '{}' with malformed conditions {:?}: {}",
                        definition.label(),
                        definition.conditions,
                        e
                    );
                    false
                }
            }
        }
    }
}
