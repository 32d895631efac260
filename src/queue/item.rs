// SPDX-License-Identifier: MIT

//! Work item types

use serde::Serialize;

use crate::environment::Environment;

/// A parsed, content-addressed unit of queued work
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    /// Hex SHA-224 of the raw source text
    pub source_hash: String,
    #[serde(skip)]
    pub source: String,
    /// Project attributes plus category projections
    pub attributes: Environment,
    pub rules: Vec<ProjectRule>,
    pub categories: Vec<Category>,
    /// Operator-assigned position, lower runs first
    pub queue_position: i64,
}

/// A rule carried inside a project source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRule {
    pub source_field: String,
    pub dest_field: String,
    pub result: String,
    pub parameters: Vec<RuleParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleParameter {
    pub symbol: String,
    pub values: String,
}

/// A material or color category of a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: String,
    pub rough_amount: i64,
    pub rough_order: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rough_amount_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rough_amount_end: Option<String>,
}

impl WorkItem {
    /// Abbreviated hash for display
    pub fn short_hash(&self) -> &str {
        let end = self.source_hash.len().min(12);
        &self.source_hash[..end]
    }

    /// Display name: the project's `name` attribute, else the short hash
    pub fn name(&self) -> String {
        self.attributes
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.short_hash().to_string())
    }
}
