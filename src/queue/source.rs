//! Project source parsing
//!
//! Turns raw project XML into a [`WorkItem`]. Sources look like:
//!
//! ```xml
//! <project name="sign" width="24" height="36">
//!   <rule source="width" destination="cost" result="scaled">
//!     <parameter symbol="*" values="1.5"/>
//!   </rule>
//!   <category name="red" color="#ff0000" rough_amount="3" rough_order="1"/>
//! </project>
//! ```

use super::item::{Category, ProjectRule, RuleParameter, WorkItem};
use crate::environment::Environment;
use crate::error::{QueueError, Result};
use roxmltree::{Document, Node};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha224};

/// Stable content hash of raw source text (lowercase hex SHA-224)
pub fn content_hash(raw: &str) -> String {
    hex::encode(Sha224::digest(raw.as_bytes()))
}

/// Parse raw project XML into a work item at queue position 0
pub fn parse_source(raw: &str) -> Result<WorkItem> {
    let doc = Document::parse(raw)?;

    let projects: Vec<Node> = doc
        .descendants()
        .filter(|n| n.has_tag_name("project"))
        .collect();
    if projects.is_empty() {
        return Err(QueueError::malformed("no <project> element"));
    }

    let mut attributes = Environment::new();
    for project in &projects {
        for attr in project.attributes() {
            attributes.set_text(attr.name(), attr.value());
        }
    }

    let rules = doc
        .descendants()
        .filter(|n| n.has_tag_name("rule"))
        .map(|n| parse_rule(&n))
        .collect::<Result<Vec<_>>>()?;

    let categories = doc
        .descendants()
        .filter(|n| n.has_tag_name("category"))
        .map(|n| parse_category(&n))
        .collect::<Result<Vec<_>>>()?;

    project_categories(&mut attributes, &categories);

    Ok(WorkItem {
        source_hash: content_hash(raw),
        source: raw.to_string(),
        attributes,
        rules,
        categories,
        queue_position: 0,
    })
}

fn parse_rule(node: &Node) -> Result<ProjectRule> {
    let parameters = node
        .children()
        .filter(|c| c.has_tag_name("parameter"))
        .map(|c| {
            Ok(RuleParameter {
                symbol: required(&c, "symbol")?.to_string(),
                values: required(&c, "values")?.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectRule {
        source_field: required(node, "source")?.to_string(),
        dest_field: required(node, "destination")?.to_string(),
        result: required(node, "result")?.to_string(),
        parameters,
    })
}

fn parse_category(node: &Node) -> Result<Category> {
    let name = required(node, "name")?;
    let rough_amount_text = required(node, "rough_amount")?;
    let rough_amount = rough_amount_text.trim().parse::<i64>().map_err(|_| {
        QueueError::malformed(format!(
            "category '{}' has non-integer rough_amount '{}'",
            name, rough_amount_text
        ))
    })?;

    let rough_order = match node.attribute("rough_order") {
        Some(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| {
                QueueError::malformed(format!(
                    "category '{}' has non-numeric rough_order '{}'",
                    name, text
                ))
            })?,
        None => 0.0,
    };

    Ok(Category {
        name: name.to_string(),
        color: required(node, "color")?.to_string(),
        rough_amount,
        rough_order,
        rough_amount_start: node.attribute("rough_amount_start").map(str::to_string),
        rough_amount_end: node.attribute("rough_amount_end").map(str::to_string),
    })
}

/// Expose categories to conditions as `categories.<name>`, `order.<name>`
/// and `palette.<name>.fill`
fn project_categories(attributes: &mut Environment, categories: &[Category]) {
    let mut amounts = Map::new();
    let mut orders = Map::new();
    let mut palette = Map::new();

    for c in categories {
        amounts.insert(c.name.clone(), json!(c.rough_amount));
        orders.insert(c.name.clone(), json!(c.rough_order));
        palette.insert(c.name.clone(), json!({ "fill": c.color }));
    }

    attributes.set("categories", Value::Object(amounts));
    attributes.set("order", Value::Object(orders));
    attributes.set("palette", Value::Object(palette));
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

#[cfg(test)]
mod tests {
    use super::*;

    const SIGN: &str = r##"<project name="sign" width="24" height="36.5">
  <rule source="width" destination="cost" result="scaled">
    <parameter symbol="*" values="1.5"/>
    <parameter symbol="+" values="2"/>
  </rule>
  <category name="red" color="#ff0000" rough_amount="3" rough_order="1"/>
  <category name="blue" color="#0000ff" rough_amount="7" rough_amount_start="0" rough_amount_end="7"/>
</project>"##;

    #[test]
    fn test_content_hash_is_sha224_hex() {
        let hash = content_hash("abc");
        assert_eq!(
            hash,
            "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"
        );
        assert_eq!(hash.len(), 56);
    }

    #[test]
    fn test_parse_project_attributes() {
        let item = parse_source(SIGN).unwrap();
        assert_eq!(item.source_hash, content_hash(SIGN));
        assert_eq!(item.queue_position, 0);
        assert_eq!(item.attributes.get("name"), Some(&json!("sign")));
        assert_eq!(item.attributes.number("width"), Some(24.0));
        assert_eq!(item.attributes.number("height"), Some(36.5));
        assert_eq!(item.name(), "sign");
    }

    #[test]
    fn test_parse_rules_keep_every_parameter() {
        let item = parse_source(SIGN).unwrap();
        assert_eq!(item.rules.len(), 1);
        let rule = &item.rules[0];
        assert_eq!(rule.source_field, "width");
        assert_eq!(rule.dest_field, "cost");
        assert_eq!(rule.result, "scaled");
        assert_eq!(rule.parameters.len(), 2);
        assert_eq!(rule.parameters[1].symbol, "+");
    }

    #[test]
    fn test_parse_categories() {
        let item = parse_source(SIGN).unwrap();
        assert_eq!(item.categories.len(), 2);
        assert_eq!(item.categories[0].rough_order, 1.0);
        assert_eq!(item.categories[1].rough_order, 0.0);
        assert_eq!(item.categories[1].rough_amount_end.as_deref(), Some("7"));

        assert_eq!(item.attributes.number("categories.blue"), Some(7.0));
        assert_eq!(item.attributes.number("order.red"), Some(1.0));
        assert_eq!(
            item.attributes.get_path("palette.red.fill"),
            Some(&json!("#ff0000"))
        );
    }

    #[test]
    fn test_missing_project_is_malformed() {
        let err = parse_source("<projects/>").unwrap_err();
        assert!(matches!(err, QueueError::MalformedSource(_)));
    }

    #[test]
    fn test_missing_rule_attribute_is_malformed() {
        let err = parse_source(r#"<project><rule source="a" result="b"/></project>"#).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_bad_rough_amount_is_malformed() {
        let raw = r##"<project><category name="red" color="#f00" rough_amount="lots"/></project>"##;
        assert!(matches!(
            parse_source(raw),
            Err(QueueError::MalformedSource(_))
        ));
    }

    #[test]
    fn test_bad_rough_order_is_malformed() {
        let raw = r##"<project><category name="red" color="#f00" rough_amount="1" rough_order="soon"/></project>"##;
        assert!(parse_source(raw).is_err());
    }

    #[test]
    fn test_not_xml_is_malformed() {
        assert!(matches!(
            parse_source("project name=sign"),
            Err(QueueError::MalformedSource(_))
        ));
    }
}
