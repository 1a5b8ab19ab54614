//! Declaration validation and cross-reference resolution.
//!
//! The registry materializes the fluent declarations into a runnable model:
//! it enforces the naming invariants and resolves dependency names to
//! indices before any planning begins. Every violation is a [`ConfigError`]
//! and fatal.

use thiserror::Error;
use tracing::debug;

use crate::build::{BuildDefinition, DEFAULT_TARGET_NAME};

/// Engine-level option names a parameter may not shadow.
const RESERVED_OPTIONS: &[&str] = &["target", "targets", "skip", "strict", "help", "graph", "summary-path"];

/// Errors in the build declaration itself. Fatal, surfaced before planning.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("target name must not be empty")]
  EmptyName,

  #[error("duplicate target name '{name}' (names are case-insensitive)")]
  DuplicateName { name: String },

  #[error("'{name}' is reserved and cannot be used as a target name")]
  ReservedName { name: String },

  #[error("target '{target}' depends on unknown target '{dependency}'")]
  UnknownDependency { target: String, dependency: String },

  #[error("more than one default target: '{first}' and '{second}'")]
  MultipleDefaults { first: String, second: String },

  #[error("no target is marked as the default target")]
  NoDefaultTarget,

  #[error("duplicate parameter '{name}'")]
  DuplicateParameter { name: String },

  #[error("parameter '{name}' shadows an engine option")]
  ReservedParameter { name: String },
}

/// Validate the declaration set and resolve dependency names to indices.
pub(crate) fn resolve(build: &mut BuildDefinition) -> Result<(), ConfigError> {
  for (i, target) in build.targets.iter().enumerate() {
    if target.name.trim().is_empty() {
      return Err(ConfigError::EmptyName);
    }
    if target.name.eq_ignore_ascii_case(DEFAULT_TARGET_NAME) {
      return Err(ConfigError::ReservedName {
        name: target.name.clone(),
      });
    }
    if build.targets[..i].iter().any(|t| t.name.eq_ignore_ascii_case(&target.name)) {
      return Err(ConfigError::DuplicateName {
        name: target.name.clone(),
      });
    }
  }

  if let Some(first) = build.targets.iter().position(|t| t.is_default)
    && let Some(second) = build.targets.iter().skip(first + 1).position(|t| t.is_default)
  {
    return Err(ConfigError::MultipleDefaults {
      first: build.targets[first].name.clone(),
      second: build.targets[first + 1 + second].name.clone(),
    });
  }

  for (i, param) in build.params.iter().enumerate() {
    if RESERVED_OPTIONS.iter().any(|r| r.eq_ignore_ascii_case(&param.name)) {
      return Err(ConfigError::ReservedParameter {
        name: param.name.clone(),
      });
    }
    if build.params[..i].iter().any(|p| p.name.eq_ignore_ascii_case(&param.name)) {
      return Err(ConfigError::DuplicateParameter {
        name: param.name.clone(),
      });
    }
  }

  // Resolve dependency names to declaration indices.
  let mut resolved: Vec<Vec<usize>> = Vec::with_capacity(build.targets.len());
  for target in &build.targets {
    let mut indices = Vec::with_capacity(target.dependencies.len());
    for dep in &target.dependencies {
      let idx = build.index_of(dep).ok_or_else(|| ConfigError::UnknownDependency {
        target: target.name.clone(),
        dependency: dep.clone(),
      })?;
      if !indices.contains(&idx) {
        indices.push(idx);
      }
    }
    resolved.push(indices);
  }
  for (target, indices) in build.targets.iter_mut().zip(resolved) {
    target.dep_indices = indices;
  }

  debug!(targets = build.targets.len(), parameters = build.params.len(), "build registered");
  Ok(())
}
