// SPDX-License-Identifier: MIT

//! Explicit execution of a selected rule

use super::definition::{RuleAction, RuleDefinition};
use crate::environment::Environment;
use crate::error::{QueueError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Starts external processes for invoke rules
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Start `program` with `args` without waiting for it to finish.
    /// Returns the process id when the platform reports one.
    async fn launch(&self, program: &str, args: &[String]) -> Result<Option<u32>>;
}

/// Launches real child processes through tokio
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, program: &str, args: &[String]) -> Result<Option<u32>> {
        log::info!("Launching: {} {:?}", program, args);

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => QueueError::execution(program, "executable not found"),
                _ => QueueError::execution(program, e.to_string()),
            })?;

        Ok(child.id())
    }
}

/// Result of executing a rule
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// An invoke rule started a process
    Launched { command: String, pid: Option<u32> },
    /// A mutate rule assigned an attribute
    Mutated { attribute: String },
}

/// Executes rule definitions on request
#[derive(Clone)]
pub struct ActionExecutor {
    launcher: Arc<dyn Launcher>,
}

impl ActionExecutor {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self { launcher }
    }

    /// Execute a rule.
    ///
    /// Invoke rules launch their command with every non-empty argument; a
    /// launch failure is returned to the caller and leaves `env` untouched.
    /// Mutate rules write their value into `env`.
    pub async fn execute(
        &self,
        definition: &RuleDefinition,
        env: &mut Environment,
    ) -> Result<ExecutionOutcome> {
        match &definition.action {
            RuleAction::Invoke { command, args } => {
                let args: Vec<String> = args.iter().filter(|a| !a.is_empty()).cloned().collect();
                let pid = self.launcher.launch(command, &args).await?;
                Ok(ExecutionOutcome::Launched {
                    command: command.clone(),
                    pid,
                })
            }
            RuleAction::Mutate { attribute, value } => {
                log::info!("Setting {} = {}", attribute, value);
                env.set_text(attribute.clone(), value);
                Ok(ExecutionOutcome::Mutated {
                    attribute: attribute.clone(),
                })
            }
        }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(Arc::new(ProcessLauncher))
    }
}
