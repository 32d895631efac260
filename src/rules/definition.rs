// SPDX-License-Identifier: MIT

//! Configured actions and attribute mutations

use serde::Serialize;
use sha2::{Digest, Sha224};
use std::str::FromStr;

use crate::error::QueueError;

/// Discriminant of a rule's action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Invoke,
    Mutate,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Invoke => write!(f, "invoke"),
            RuleKind::Mutate => write!(f, "mutate"),
        }
    }
}

/// What a rule does when executed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleAction {
    /// Launch an external command
    Invoke { command: String, args: Vec<String> },
    /// Assign a value to an attribute
    Mutate { attribute: String, value: String },
}

impl RuleAction {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleAction::Invoke { .. } => RuleKind::Invoke,
            RuleAction::Mutate { .. } => RuleKind::Mutate,
        }
    }
}

/// RGB color used to correlate a rule with its UI element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Derive a stable color from arbitrary text
    pub fn derive_from(text: &str) -> Self {
        let digest = Sha224::digest(text.as_bytes());
        Self::new(digest[0], digest[1], digest[2])
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl FromStr for Rgb {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.trim().trim_start_matches('#');
        let bytes = hex::decode(hex_part)
            .map_err(|e| QueueError::malformed(format!("invalid color '{}': {}", s, e)))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(QueueError::malformed(format!(
                "invalid color '{}': expected #rrggbb",
                s
            ))),
        }
    }
}

/// A configured action or mutation, optionally gated by conditions.
///
/// The color is fixed when the definition is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDefinition {
    #[serde(flatten)]
    pub action: RuleAction,
    /// Raw condition lines, parsed when rules are bound
    pub conditions: Vec<String>,
    color: Rgb,
}

impl RuleDefinition {
    /// Create a definition; without an explicit color one is derived from the action
    pub fn new(action: RuleAction, conditions: Vec<String>, color: Option<Rgb>) -> Self {
        let color = color.unwrap_or_else(|| Rgb::derive_from(&color_seed(&action)));
        Self {
            action,
            conditions,
            color,
        }
    }

    pub fn invoke(command: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(
            RuleAction::Invoke {
                command: command.into(),
                args,
            },
            Vec::new(),
            None,
        )
    }

    pub fn mutate(
        attribute: impl Into<String>,
        value: impl Into<String>,
        conditions: Vec<String>,
    ) -> Self {
        Self::new(
            RuleAction::Mutate {
                attribute: attribute.into(),
                value: value.into(),
            },
            conditions,
            None,
        )
    }

    /// Build an invoke rule from operator input like `"--fast,,out.pdf"`
    pub fn invoke_from_csv(command: impl Into<String>, args_csv: &str) -> Self {
        let args = args_csv.split(',').map(|a| a.trim().to_string()).collect();
        Self::invoke(command, args)
    }

    /// Build a mutate rule from operator input like `"weight >= 10, width > 5"`
    pub fn mutate_from_csv(
        attribute: impl Into<String>,
        value: impl Into<String>,
        conditions_csv: &str,
    ) -> Self {
        let conditions = conditions_csv
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Self::mutate(attribute, value, conditions)
    }

    pub fn kind(&self) -> RuleKind {
        self.action.kind()
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Short text shown on the rule's button
    pub fn label(&self) -> String {
        match &self.action {
            RuleAction::Invoke { command, .. } => command.clone(),
            RuleAction::Mutate { attribute, value } => format!("{}={}", attribute, value),
        }
    }
}

fn color_seed(action: &RuleAction) -> String {
    match action {
        RuleAction::Invoke { command, args } => format!("invoke\0{}\0{}", command, args.join("\0")),
        RuleAction::Mutate { attribute, value } => format!("mutate\0{}\0{}", attribute, value),
    }
}
