//! The build aggregate: owns the target set and declared parameters.

use crate::params::ParamSpec;
use crate::target::{Target, TargetBuilder};

/// Reserved name resolving to the default target. Never a real target name.
pub const DEFAULT_TARGET_NAME: &str = "default";

/// A complete build description: targets, parameters, and the derived name
/// lists the planner publishes for one run.
///
/// Constructed once per process invocation; targets are immutable after
/// construction except for their status/duration fields and the skip
/// conditions the planner appends.
pub struct BuildDefinition {
  pub name: String,
  pub(crate) targets: Vec<Target>,
  pub(crate) params: Vec<ParamSpec>,

  /// Names of the targets the user invoked (or the default), planner-written.
  pub invoked: Vec<String>,
  /// Names of the targets the skip set suppressed, planner-written.
  pub skipped: Vec<String>,
  /// Execution list minus skipped targets, planner-written.
  pub executing: Vec<String>,
}

impl BuildDefinition {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      targets: Vec::new(),
      params: Vec::new(),
      invoked: Vec::new(),
      skipped: Vec::new(),
      executing: Vec::new(),
    }
  }

  /// Declare a parameter consumed by requirements and actions.
  pub fn parameter(mut self, spec: ParamSpec) -> Self {
    self.params.push(spec);
    self
  }

  /// Register a target declaration.
  pub fn target(mut self, builder: TargetBuilder) -> Self {
    self.targets.push(builder.build());
    self
  }

  pub fn targets(&self) -> &[Target] {
    &self.targets
  }

  pub fn parameters(&self) -> &[ParamSpec] {
    &self.params
  }

  /// Look up a target by case-insensitive name.
  pub fn target_named(&self, name: &str) -> Option<&Target> {
    self.index_of(name).map(|i| &self.targets[i])
  }

  pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
    self.targets.iter().position(|t| t.name.eq_ignore_ascii_case(name))
  }

  pub(crate) fn default_index(&self) -> Option<usize> {
    self.targets.iter().position(|t| t.is_default)
  }

  /// Target names in declaration order.
  pub fn target_names(&self) -> Vec<String> {
    self.targets.iter().map(|t| t.name.clone()).collect()
  }
}
