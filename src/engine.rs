// SPDX-License-Identifier: MIT

//! Queue engine: the one value callers hold for the store, the position
//! index and the configured rules.
//!
//! Calls must be serialized by the caller; nothing here locks.

use crate::config::QueueConfig;
use crate::error::{QueueError, Result};
use crate::queue::{self, QueueOrder, QueuePlan, WorkItem, WorkItemStore};
use crate::rules::{self, ActionExecutor, ExecutionOutcome, Launcher, RuleDefinition};

/// Prepare command launched for the active item
#[derive(Debug, Clone, PartialEq)]
pub struct Preparation {
    pub source_hash: String,
    /// Path substituted for `{thumbnail}`
    pub thumbnail: String,
    pub pid: Option<u32>,
}

#[derive(Debug, Default)]
pub struct QueueEngine {
    store: WorkItemStore,
    order: QueueOrder,
    definitions: Vec<RuleDefinition>,
    pending: Vec<(String, i64)>,
}

impl QueueEngine {
    pub fn new(definitions: Vec<RuleDefinition>) -> Self {
        Self {
            definitions,
            ..Self::default()
        }
    }

    pub fn definitions(&self) -> &[RuleDefinition] {
        &self.definitions
    }

    pub fn set_definitions(&mut self, definitions: Vec<RuleDefinition>) {
        self.definitions = definitions;
    }

    pub fn store(&self) -> &WorkItemStore {
        &self.store
    }

    pub fn order(&self) -> &QueueOrder {
        &self.order
    }

    /// Resolve a full hash or a unique hash prefix to a stored item's hash
    pub fn resolve_hash(&self, prefix: &str) -> Result<String> {
        let mut matches = self.store.hashes().iter().filter(|h| h.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(hash), None) if !prefix.is_empty() => Ok(hash.clone()),
            _ => Err(QueueError::UnknownItem(prefix.to_string())),
        }
    }

    /// Parse and store one raw project source
    pub fn ingest(&mut self, raw: &str) -> Result<&WorkItem> {
        self.store.ingest(raw)
    }

    /// Rebuild the store from a complete set of sources; positions are kept
    pub fn refresh<I, S>(&mut self, sources: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.store.refresh(sources)
    }

    /// Record an operator position edit, applied on the next [`reorder`](Self::reorder)
    pub fn set_queue_position(&mut self, hash: impl Into<String>, position: i64) {
        self.pending.push((hash.into(), position));
    }

    /// Record a position edit typed by an operator
    pub fn set_queue_position_text(&mut self, hash: impl Into<String>, text: &str) -> Result<()> {
        let position = queue::parse_position(text)?;
        self.set_queue_position(hash, position);
        Ok(())
    }

    /// Record a batch of typed edits; nothing is recorded if any entry is invalid
    pub fn set_queue_positions_text<H, T>(&mut self, edits: Vec<(H, T)>) -> Result<()>
    where
        H: Into<String>,
        T: AsRef<str>,
    {
        let parsed = queue::parse_overrides(edits)?;
        self.pending.extend(parsed);
        Ok(())
    }

    /// Rules that apply to a stored item
    pub fn applicable_rules(&self, hash: &str) -> Result<Vec<&RuleDefinition>> {
        let item = self
            .store
            .get(hash)
            .ok_or_else(|| QueueError::UnknownItem(hash.to_string()))?;
        Ok(rules::applicable_rules(item, &self.definitions))
    }

    /// Apply pending position edits and build the rendering plan
    pub fn reorder(&mut self) -> QueuePlan<'_> {
        let pending = std::mem::take(&mut self.pending);
        queue::reorder(&mut self.store, &mut self.order, &pending, &self.definitions)
    }

    /// Launch the configured prepare command for the plan's active item only.
    ///
    /// Returns `None` when the plan is empty or no command is configured.
    pub async fn prepare_active(
        plan: &QueuePlan<'_>,
        config: &QueueConfig,
        launcher: &dyn Launcher,
    ) -> Result<Option<Preparation>> {
        let Some(active) = plan.active() else {
            return Ok(None);
        };
        let Some((program, args, thumbnail)) = config.prepare_invocation() else {
            return Ok(None);
        };

        log::info!(
            "Preparing {} (thumbnail {})",
            active.item.name(),
            thumbnail
        );
        let pid = launcher.launch(&program, &args).await?;
        Ok(Some(Preparation {
            source_hash: active.item.source_hash.clone(),
            thumbnail,
            pid,
        }))
    }

    /// Execute the definition at `rule` against the item stored under `hash`
    pub async fn execute(
        &mut self,
        executor: &ActionExecutor,
        hash: &str,
        rule: usize,
    ) -> Result<ExecutionOutcome> {
        let definition = self
            .definitions
            .get(rule)
            .cloned()
            .ok_or(QueueError::UnknownRule(rule))?;
        let item = self
            .store
            .get_mut(hash)
            .ok_or_else(|| QueueError::UnknownItem(hash.to_string()))?;
        executor.execute(&definition, &mut item.attributes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEAVY: &str = r#"<project name="heavy" weight="12"/>"#;
    const LIGHT: &str = r#"<project name="light" weight="5"/>"#;

    fn engine() -> QueueEngine {
        QueueEngine::new(vec![
            RuleDefinition::invoke("notify", vec![]),
            RuleDefinition::mutate("status", "ready", vec!["weight >= 10.0".to_string()]),
        ])
    }

    #[test]
    fn test_applicable_rules_by_hash() {
        let mut engine = engine();
        let heavy = engine.ingest(HEAVY).unwrap().source_hash.clone();
        let light = engine.ingest(LIGHT).unwrap().source_hash.clone();

        assert_eq!(engine.applicable_rules(&heavy).unwrap().len(), 2);
        let light_rules = engine.applicable_rules(&light).unwrap();
        assert_eq!(light_rules.len(), 1);
        assert_eq!(light_rules[0].label(), "notify");

        assert!(matches!(
            engine.applicable_rules("nope"),
            Err(QueueError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_resolve_hash_prefix() {
        let mut engine = engine();
        let heavy = engine.ingest(HEAVY).unwrap().source_hash.clone();
        assert_eq!(engine.resolve_hash(&heavy[..8]).unwrap(), heavy);
        assert_eq!(engine.resolve_hash(&heavy).unwrap(), heavy);
        assert!(engine.resolve_hash("").is_err());
        assert!(engine.resolve_hash("zzzz").is_err());
    }

    #[test]
    fn test_position_survives_refresh() {
        let mut engine = engine();
        let heavy = engine.ingest(HEAVY).unwrap().source_hash.clone();
        engine.ingest(LIGHT).unwrap();

        engine.set_queue_position(heavy.clone(), 3);
        engine.reorder();

        engine.refresh([HEAVY, LIGHT]);
        let plan = engine.reorder();
        assert_eq!(plan.active().unwrap().item.name(), "light");
        assert_eq!(plan.entries[1].item.queue_position, 3);
    }

    #[test]
    fn test_invalid_text_batch_records_nothing() {
        let mut engine = engine();
        let heavy = engine.ingest(HEAVY).unwrap().source_hash.clone();
        let light = engine.ingest(LIGHT).unwrap().source_hash.clone();

        let result =
            engine.set_queue_positions_text(vec![(heavy.clone(), "-1"), (light.clone(), "x")]);
        assert!(result.is_err());

        let plan = engine.reorder();
        assert_eq!(plan.hashes(), vec![heavy.as_str(), light.as_str()]);

        assert!(engine.set_queue_position_text(light.clone(), "-1").is_ok());
        let plan = engine.reorder();
        assert_eq!(plan.active().unwrap().item.source_hash, light);
    }

    #[tokio::test]
    async fn test_execute_mutation_updates_item() {
        let mut engine = engine();
        let heavy = engine.ingest(HEAVY).unwrap().source_hash.clone();
        let executor = ActionExecutor::default();

        let outcome = engine.execute(&executor, &heavy, 1).await.unwrap();
        assert_eq!(
            outcome,
            ExecutionOutcome::Mutated {
                attribute: "status".to_string()
            }
        );
        let item = engine.store().get(&heavy).unwrap();
        assert_eq!(item.attributes.get("status"), Some(&json!("ready")));

        assert!(matches!(
            engine.execute(&executor, &heavy, 9).await,
            Err(QueueError::UnknownRule(9))
        ));
    }
}
