//! The planner: from invoked names to a totally ordered execution list.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::build::{BuildDefinition, DEFAULT_TARGET_NAME};
use crate::graph::TargetGraph;
use crate::registry::ConfigError;
use crate::run::RunError;

/// Errors raised while planning. Fatal; the message enumerates the offending
/// items.
#[derive(Debug, Error)]
pub enum PlanError {
  #[error("unknown target '{name}'; available targets: {}", .available.join(", "))]
  UnknownTarget { name: String, available: Vec<String> },

  #[error("circular dependencies: {}", .cycles.join("; "))]
  CircularDependencies { cycles: Vec<String> },

  #[error("incomplete target definition order; simultaneously independent targets: {}", .targets.join(", "))]
  AmbiguousOrder { targets: Vec<String> },
}

/// The planner's output: the exact order the executor will visit, including
/// targets that will surface as `Skipped`.
#[derive(Debug)]
pub struct ExecutionPlan {
  /// Target indices in execution order.
  pub order: Vec<usize>,
  /// Targets the skip set suppressed; kept in the order but never executed.
  pub(crate) skip_candidates: HashSet<usize>,
}

/// Compute the execution list and publish the derived name lists back to the
/// build.
///
/// `invoked` empty means the default target. `skip` follows the CLI
/// contract: `None` disables skipping, `Some(&[])` skips every non-invoked
/// target, `Some(names)` skips exactly those names (case-insensitive).
pub(crate) fn plan(
  build: &mut BuildDefinition,
  invoked: &[String],
  skip: Option<&[String]>,
  strict: bool,
) -> Result<ExecutionPlan, RunError> {
  // 1. Resolve invoked names.
  let mut invoked_indices: Vec<usize> = Vec::new();
  if invoked.is_empty() {
    let default = build.default_index().ok_or(ConfigError::NoDefaultTarget)?;
    invoked_indices.push(default);
  } else {
    for name in invoked {
      let idx = if name.eq_ignore_ascii_case(DEFAULT_TARGET_NAME) {
        build.default_index().ok_or(ConfigError::NoDefaultTarget)?
      } else {
        build.index_of(name).ok_or_else(|| PlanError::UnknownTarget {
          name: name.clone(),
          available: build.target_names(),
        })?
      };
      if !invoked_indices.contains(&idx) {
        invoked_indices.push(idx);
      }
    }
  }
  let invoked_set: HashSet<usize> = invoked_indices.iter().copied().collect();

  // 2. Order the whole graph, dependents first.
  let names = build.target_names();
  let popped = TargetGraph::new(&build.targets).pop_order(&names, strict)?;

  // 3. Keep invoked targets and the dependencies of anything kept. The pop
  // order lists every dependent before its dependencies, so checking direct
  // dependencies of already-kept targets closes the walk transitively.
  let mut kept: HashSet<usize> = HashSet::new();
  let mut order: Vec<usize> = Vec::new();
  for idx in popped {
    let needed = invoked_set.contains(&idx) || kept.iter().any(|&k| build.targets[k].dep_indices.contains(&idx));
    if needed {
      kept.insert(idx);
      order.push(idx);
    }
  }
  order.reverse();

  // 4. Apply skips by forcing the candidates' conditions false.
  let mut skip_candidates: HashSet<usize> = HashSet::new();
  if let Some(skip_names) = skip {
    for &idx in &order {
      if invoked_set.contains(&idx) {
        continue;
      }
      let name = &build.targets[idx].name;
      if skip_names.is_empty() || skip_names.iter().any(|s| s.eq_ignore_ascii_case(name)) {
        debug!(name = %name, "target will be skipped");
        skip_candidates.insert(idx);
      }
    }
  }
  for &idx in &skip_candidates {
    build.targets[idx].conditions.push(Box::new(|_| false));
  }

  // 5. Publish the derived name lists.
  build.invoked = invoked_indices.iter().map(|&i| build.targets[i].name.clone()).collect();
  build.skipped = order
    .iter()
    .filter(|i| skip_candidates.contains(i))
    .map(|&i| build.targets[i].name.clone())
    .collect();
  build.executing = order
    .iter()
    .filter(|i| !skip_candidates.contains(i))
    .map(|&i| build.targets[i].name.clone())
    .collect();

  info!(
    invoked = ?build.invoked,
    executing = ?build.executing,
    skipped = ?build.skipped,
    "planned execution list"
  );

  Ok(ExecutionPlan { order, skip_candidates })
}
