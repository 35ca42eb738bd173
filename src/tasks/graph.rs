// src/tasks/graph.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::errors::{PipelineError, Result};
use crate::tasks::{TaskName, TaskRegistry};

/// Dependency view over a [`TaskRegistry`].
///
/// Edge direction is "must finish before": a prerequisite points at the task
/// that needs it, a series member points at its series.
#[derive(Debug)]
pub struct TaskGraph<'a> {
    registry: &'a TaskRegistry,
}

impl<'a> TaskGraph<'a> {
    pub fn from_registry(registry: &'a TaskRegistry) -> Self {
        Self { registry }
    }

    /// Every referenced name must be registered and the graph must be acyclic.
    pub fn check(&self) -> Result<()> {
        for name in self.registry.names() {
            for dep in self.references(name) {
                if !self.registry.contains(dep) {
                    warn!(task = name, missing = %dep, "task refers to an unknown task");
                    return Err(PipelineError::UnknownTask(dep.clone()));
                }
            }
        }

        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.registry.names() {
            graph.add_node(name);
        }
        for name in self.registry.names() {
            for dep in self.references(name) {
                graph.add_edge(dep.as_str(), name, ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(PipelineError::TaskCycle(format!(
                "cycle detected involving task '{}'",
                cycle.node_id()
            ))),
        }
    }

    /// Plain tasks in the order a run of `name` executes them.
    ///
    /// Assumes a validated registry; unknown names are skipped.
    pub fn execution_order(&self, name: &str) -> Vec<TaskName> {
        let mut order = Vec::new();
        self.collect(name, &mut order);
        order
    }

    fn collect(&self, name: &str, order: &mut Vec<TaskName>) {
        if !self.registry.contains(name) {
            return;
        }
        for prerequisite in self.registry.prerequisites_of(name) {
            self.collect(prerequisite, order);
        }
        match self.registry.series_of(name) {
            Some(members) => {
                for member in members {
                    self.collect(member, order);
                }
            }
            None => order.push(name.to_string()),
        }
    }

    fn references(&self, name: &str) -> impl Iterator<Item = &'a TaskName> {
        let registry = self.registry;
        registry
            .prerequisites_of(name)
            .iter()
            .chain(registry.series_of(name).unwrap_or(&[]).iter())
    }
}
