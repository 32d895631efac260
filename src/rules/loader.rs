//! Rule definition loader - XML file loading and parsing
//!
//! Reads documents shaped like:
//!
//! ```xml
//! <defaults>
//!   <default type="invoke" value="notify-send" color="#3080ff">
//!     <parameter type="arg" value="queued"/>
//!   </default>
//!   <default type="mutate" attribute="status" value="ready">
//!     <parameter type="condition" value="weight >= 10.0"/>
//!   </default>
//! </defaults>
//! ```

use super::definition::{RuleAction, RuleDefinition, Rgb};
use crate::error::{QueueError, Result};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

/// Loads rule definitions from XML files
pub struct DefinitionLoader;

impl DefinitionLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load definitions from an XML file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RuleDefinition>> {
        let content = fs::read_to_string(path)?;
        load_definitions(&content)
    }
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder kept for a condition marker without a `value`. It never
/// parses, so the owning rule is skipped at binding time.
pub const CONDITION_MARKER: &str = "*";

/// Parse every `default` element of a document, in document order.
///
/// Only a document that is not XML fails the whole load. A `default` with a
/// missing attribute or a bad color is logged and skipped.
pub fn load_definitions(xml: &str) -> Result<Vec<RuleDefinition>> {
    let doc = Document::parse(xml)?;
    let mut definitions = Vec::new();

    for node in doc.descendants().filter(|n| n.has_tag_name("default")) {
        match parse_default(&node) {
            Ok(Some(definition)) => definitions.push(definition),
            Ok(None) => {}
            Err(e) => log::warn!(
                "Skipping default at byte {}: {}",
                node.range().start,
                e
            ),
        }
    }

    log::info!("Loaded {} rule definitions", definitions.len());
    Ok(definitions)
}

fn parse_default(node: &Node) -> Result<Option<RuleDefinition>> {
    let default_type = required(node, "type")?;
    let color = node
        .attribute("color")
        .map(str::parse::<Rgb>)
        .transpose()?;

    let action = match default_type {
        "invoke" | "call" => RuleAction::Invoke {
            command: required(node, "value")?.to_string(),
            args: parameters(node, "arg")?,
        },
        "mutate" | "setset" => RuleAction::Mutate {
            attribute: required(node, "attribute")?.to_string(),
            value: required(node, "value")?.to_string(),
        },
        other => {
            log::warn!("Skipping default with unknown type '{}'", other);
            return Ok(None);
        }
    };

    let conditions = node
        .children()
        .filter(|c| c.has_tag_name("parameter") && c.attribute("type") == Some("condition"))
        .map(|c| c.attribute("value").unwrap_or(CONDITION_MARKER).to_string())
        .collect();

    Ok(Some(RuleDefinition::new(action, conditions, color)))
}

fn required<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        QueueError::malformed(format!(
            "<{}> is missing required attribute '{}'",
            node.tag_name().name(),
            name
        ))
    })
}

/// Values of the direct `parameter` children with the given type
fn parameters(node: &Node, param_type: &str) -> Result<Vec<String>> {
    node.children()
        .filter(|c| c.has_tag_name("parameter") && c.attribute("type") == Some(param_type))
        .map(|c| required(&c, "value").map(str::to_string))
        .collect()
}
