//! Dependency graph ordering and cycle detection.
//!
//! The graph holds one node per declared target with edges from dependency
//! to dependent. Ordering works by repeatedly extracting an *independent*
//! vertex (one no remaining vertex depends on), so the pop sequence lists
//! dependents before their dependencies; the planner reverses its filtered
//! walk to obtain the execution order.

use std::collections::HashSet;

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::plan::PlanError;
use crate::target::Target;

pub(crate) struct TargetGraph {
  graph: DiGraph<usize, ()>,
}

impl TargetGraph {
  /// Build the graph from resolved targets. Node `i` is the target declared
  /// at index `i`; edges run dependency -> dependent.
  pub fn new(targets: &[Target]) -> Self {
    let mut graph = DiGraph::with_capacity(targets.len(), targets.len());
    for i in 0..targets.len() {
      graph.add_node(i);
    }
    for (dependent, target) in targets.iter().enumerate() {
      for &dep in &target.dep_indices {
        graph.add_edge(NodeIndex::new(dep), NodeIndex::new(dependent), ());
      }
    }
    Self { graph }
  }

  /// Pop vertices in dependents-first order.
  ///
  /// In strict mode, more than one simultaneously independent vertex means
  /// the build author has not declared a total order, and planning fails.
  /// In non-strict mode the tie is broken deterministically by popping the
  /// highest declaration index first, which makes the final (reversed)
  /// execution order follow declaration order.
  pub fn pop_order(&self, names: &[String], strict: bool) -> Result<Vec<usize>, PlanError> {
    let n = self.graph.node_count();
    let mut remaining = vec![true; n];
    let mut left = n;
    let mut order = Vec::with_capacity(n);

    while left > 0 {
      let independent: Vec<usize> = (0..n)
        .filter(|&i| {
          remaining[i]
            && self
              .graph
              .neighbors_directed(NodeIndex::new(i), Direction::Outgoing)
              .all(|dependent| !remaining[dependent.index()])
        })
        .collect();

      if independent.is_empty() {
        return Err(self.cycle_error(names));
      }
      if strict && independent.len() > 1 {
        return Err(PlanError::AmbiguousOrder {
          targets: independent.iter().map(|&i| names[i].clone()).collect(),
        });
      }

      let chosen = *independent.iter().max().expect("non-empty independent set");
      remaining[chosen] = false;
      left -= 1;
      order.push(chosen);
    }

    Ok(order)
  }

  /// Extract every cycle and format it as `A -> B -> C -> A`.
  fn cycle_error(&self, names: &[String]) -> PlanError {
    let mut cycles = Vec::new();

    for scc in tarjan_scc(&self.graph) {
      let is_cycle = scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some();
      if !is_cycle {
        continue;
      }

      let set: HashSet<NodeIndex> = scc.iter().copied().collect();
      let start = *scc.iter().min_by_key(|n| n.index()).expect("non-empty component");
      let mut path = vec![start];
      let mut visited = HashSet::from([start]);
      self.close_cycle(start, start, &set, &mut visited, &mut path);

      let mut rendered: Vec<&str> = path.iter().map(|n| names[self.graph[*n]].as_str()).collect();
      rendered.push(names[self.graph[start]].as_str());
      cycles.push(rendered.join(" -> "));
    }

    cycles.sort();
    PlanError::CircularDependencies { cycles }
  }

  /// Depth-first walk within one strongly connected component until an edge
  /// back to `start` closes the cycle. Always terminates: the component is
  /// strongly connected, so `start` is reachable from every member.
  fn close_cycle(
    &self,
    current: NodeIndex,
    start: NodeIndex,
    component: &HashSet<NodeIndex>,
    visited: &mut HashSet<NodeIndex>,
    path: &mut Vec<NodeIndex>,
  ) -> bool {
    let mut neighbors: Vec<NodeIndex> = self
      .graph
      .neighbors_directed(current, Direction::Outgoing)
      .filter(|n| component.contains(n))
      .collect();
    neighbors.sort_by_key(|n| n.index());
    neighbors.dedup();

    for next in neighbors {
      if next == start && path.len() > 1 {
        return true;
      }
      if next != start && visited.insert(next) {
        path.push(next);
        if self.close_cycle(next, start, component, visited, path) {
          return true;
        }
        path.pop();
      }
    }
    false
  }
}
