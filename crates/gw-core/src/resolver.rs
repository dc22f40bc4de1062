//! Dependency resolution: one total execution order for the catalog.
//!
//! Default ordering is filename sequence. Declared dependencies add edges on
//! top; a depth-first traversal with a "currently visiting" marker detects
//! cycles mid-walk and reports the filenames involved.

use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationDefinition;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// A directed graph of migration dependencies
#[derive(Debug)]
pub struct MigrationDag {
    /// The underlying graph; an edge `a -> b` means `a` must run before `b`
    graph: DiGraph<String, ()>,

    /// Map from filename to node index
    node_map: HashMap<String, NodeIndex>,

    /// Node indices in catalog (sequence) order
    sequence_order: Vec<NodeIndex>,
}

/// DFS visitation state
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

impl MigrationDag {
    /// Build the DAG from a sequence-sorted catalog.
    ///
    /// A declared dependency naming a filename not present in the catalog is
    /// logged and dropped — the affected migration falls back to pure
    /// sequence order. One malformed annotation must never block an entire
    /// deployment.
    pub fn build(catalog: &[MigrationDefinition]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut sequence_order = Vec::with_capacity(catalog.len());

        for m in catalog {
            let idx = graph.add_node(m.filename.clone());
            node_map.insert(m.filename.clone(), idx);
            sequence_order.push(idx);
        }

        for m in catalog {
            let Some(&to) = node_map.get(&m.filename) else {
                continue;
            };
            for dep in &m.depends_on {
                match node_map.get(dep) {
                    Some(&from) => {
                        graph.add_edge(from, to, ());
                    }
                    None => {
                        log::warn!(
                            "{} declares dependency on unknown migration '{}'; \
                             falling back to sequence order",
                            m.filename,
                            dep
                        );
                    }
                }
            }
        }

        Self {
            graph,
            node_map,
            sequence_order,
        }
    }

    /// Produce the total execution order: dependencies first, otherwise
    /// ascending sequence.
    pub fn execution_order(&self) -> CoreResult<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut path = Vec::new();

        for &idx in &self.sequence_order {
            self.visit(idx, &mut marks, &mut order, &mut path)?;
        }

        Ok(order)
    }

    /// Direct dependencies of a migration, for status reporting
    pub fn dependencies(&self, filename: &str) -> Vec<String> {
        if let Some(&idx) = self.node_map.get(filename) {
            let mut deps: Vec<String> = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .map(|n| self.graph[n].clone())
                .collect();
            deps.sort();
            deps
        } else {
            Vec::new()
        }
    }

    fn visit(
        &self,
        idx: NodeIndex,
        marks: &mut [Mark],
        order: &mut Vec<String>,
        path: &mut Vec<NodeIndex>,
    ) -> CoreResult<()> {
        match marks[idx.index()] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                return Err(CoreError::CircularDependency {
                    cycle: self.cycle_path(idx, path),
                });
            }
            Mark::Unvisited => {}
        }

        marks[idx.index()] = Mark::Visiting;
        path.push(idx);

        // Visit dependencies in sequence order for a deterministic result
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        deps.sort_by_key(|n| self.graph[*n].clone());
        for dep in deps {
            self.visit(dep, marks, order, path)?;
        }

        path.pop();
        marks[idx.index()] = Mark::Done;
        order.push(self.graph[idx].clone());
        Ok(())
    }

    /// Format the cycle for the error message: the segment of the DFS path
    /// from the first occurrence of `repeat` back around to it.
    fn cycle_path(&self, repeat: NodeIndex, path: &[NodeIndex]) -> String {
        let start = path.iter().position(|&n| n == repeat).unwrap_or(0);
        let mut names: Vec<String> = path[start..]
            .iter()
            .map(|&n| self.graph[n].clone())
            .collect();
        names.push(self.graph[repeat].clone());
        names.join(" -> ")
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
