//! Deploy Steps and Runner
//!
//! Each step deploys and configures a slice of the system and declares the
//! tags it provides and the tags it depends on. The runner picks the steps
//! for the requested tags, pulls in their dependencies and runs them in
//! dependency order against one [`DeployEnv`]:
//!
//! ```text
//!   --tags PolygonLandTunnel
//!     → TRUSTED_FORWARDER → FXCHILD → PolygonLand → PolygonLandTunnel
//! ```
//!
//! Every step is idempotent, so running the same tags again only performs the
//! writes that are still missing.

pub mod steps;

use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

use crate::errors::DeployError;
use crate::network::{DeployEnv, NetworkConfig};
use crate::output;
use crate::wiring::PendingCall;

/// One deployment script.
#[async_trait]
pub trait DeployStep: Send + Sync {
    /// Unique step name, used in reports
    fn id(&self) -> &str;

    /// Tags this step provides
    fn tags(&self) -> &[&'static str];

    /// Tags that must run before this step
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Whether the step does not apply to the network
    fn skip(&self, _config: &NetworkConfig) -> bool {
        false
    }

    async fn run(&self, env: &DeployEnv) -> Result<(), DeployError>;
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Step ids that ran, in order
    pub executed: Vec<String>,
    /// Step ids whose skip predicate matched
    pub skipped: Vec<String>,
    /// Calls this run left for signers it does not control, across all networks.
    /// Calls already logged before the run started are not repeated.
    pub deferred: Vec<PendingCall>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Ordered collection of deploy steps.
#[derive(Default)]
pub struct DeployRunner {
    steps: Vec<Box<dyn DeployStep>>,
}

impl DeployRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner with every shipped step registered
    pub fn with_default_steps() -> Self {
        let mut runner = Self::new();
        for step in steps::default_steps() {
            runner.register_boxed(step);
        }
        runner
    }

    pub fn register(&mut self, step: impl DeployStep + 'static) {
        self.register_boxed(Box::new(step));
    }

    pub fn register_boxed(&mut self, step: Box<dyn DeployStep>) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> impl Iterator<Item = &dyn DeployStep> {
        self.steps.iter().map(|s| s.as_ref())
    }

    fn providers<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.steps
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.tags().iter().any(|t| *t == tag))
            .map(|(i, _)| i)
    }

    /// Steps to run for `tags` (every step when empty), dependencies first.
    ///
    /// Registration order breaks ties. Dependency tags nobody provides are ignored.
    pub fn plan(&self, tags: &[String]) -> Result<Vec<&dyn DeployStep>, DeployError> {
        let mut selected: BTreeSet<usize> = if tags.is_empty() {
            (0..self.steps.len()).collect()
        } else {
            tags.iter().flat_map(|tag| self.providers(tag)).collect()
        };

        let mut queue: Vec<usize> = selected.iter().copied().collect();
        while let Some(index) = queue.pop() {
            for dep in self.steps[index].dependencies() {
                for provider in self.providers(dep) {
                    if selected.insert(provider) {
                        queue.push(provider);
                    }
                }
            }
        }

        let mut marks = vec![Mark::Unvisited; self.steps.len()];
        let mut order = Vec::with_capacity(selected.len());
        for &index in &selected {
            self.visit(index, &mut marks, &mut order)?;
        }
        Ok(order.into_iter().map(|i| self.steps[i].as_ref()).collect())
    }

    fn visit(&self, index: usize, marks: &mut [Mark], order: &mut Vec<usize>) -> Result<(), DeployError> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::Visiting => return Err(DeployError::DependencyCycle(self.steps[index].id().to_string())),
            Mark::Unvisited => {}
        }
        marks[index] = Mark::Visiting;
        for dep in self.steps[index].dependencies() {
            for provider in self.providers(dep).filter(|&p| p != index) {
                self.visit(provider, marks, order)?;
            }
        }
        marks[index] = Mark::Done;
        order.push(index);
        Ok(())
    }

    /// Run the plan for `tags` sequentially, stopping at the first failure.
    pub async fn run(&self, env: &DeployEnv, tags: &[String]) -> Result<RunReport, DeployError> {
        let mut report = RunReport::default();
        let config = env.network().config();
        let logged: BTreeSet<Uuid> = env.deferred_calls().await.into_iter().map(|call| call.id).collect();

        for step in self.plan(tags)? {
            if step.skip(config) {
                info!(step = step.id(), network = %config.name, "Skipping step");
                output::print_step_skipped(step.id());
                report.skipped.push(step.id().to_string());
                continue;
            }
            info!(step = step.id(), network = %config.name, "Running step");
            output::print_step(step.id());
            step.run(env).await?;
            report.executed.push(step.id().to_string());
        }

        report.deferred = env
            .deferred_calls()
            .await
            .into_iter()
            .filter(|call| !logged.contains(&call.id))
            .collect();
        Ok(report)
    }
}
