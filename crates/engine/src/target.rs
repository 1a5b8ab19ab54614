//! Target model: the unit of build work and its fluent builder.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::context::RunContext;

/// Boxed future returned by a target action.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A target action: an async side-effecting operation, the body of a target.
pub type Action = Box<dyn Fn(Arc<RunContext>) -> ActionFuture + Send + Sync>;

/// A target condition: a pure predicate evaluated just before the target runs.
pub type Condition = Box<dyn Fn(&RunContext) -> bool + Send + Sync>;

/// Execution status of a target within one run.
///
/// `NotRun` is the initial value; the executor moves each visited target to
/// exactly one of the others, and a target never reached (because an earlier
/// target failed) keeps `NotRun`. All five are terminal for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TargetStatus {
  /// Never reached in this run.
  #[default]
  NotRun,
  /// The target has no actions.
  Absent,
  /// A condition returned false; the action body did not run.
  Skipped,
  /// All actions completed.
  Executed,
  /// An action returned an error, panicked, or was interrupted.
  Failed,
}

impl TargetStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      TargetStatus::NotRun => "NotRun",
      TargetStatus::Absent => "Absent",
      TargetStatus::Skipped => "Skipped",
      TargetStatus::Executed => "Executed",
      TargetStatus::Failed => "Failed",
    }
  }
}

impl fmt::Display for TargetStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A named, addressable unit of build work.
///
/// Targets are declared through [`Target::named`] and owned by a
/// [`BuildDefinition`](crate::BuildDefinition); dependencies are held as
/// names and resolved to indices by the registry, so a target never owns
/// another. `status` and `duration` are written only by the executor.
pub struct Target {
  pub name: String,
  pub description: Option<String>,
  pub is_default: bool,
  /// Dependency names as declared.
  pub dependencies: Vec<String>,
  /// Dependency indices into the owning build, resolved by the registry.
  pub(crate) dep_indices: Vec<usize>,
  pub(crate) conditions: Vec<Condition>,
  /// Parameter names that must carry a usable value before execution starts.
  pub(crate) requirements: Vec<String>,
  pub(crate) actions: Vec<Action>,
  pub status: TargetStatus,
  /// Elapsed wall time of the last action run; zero until the executor sets it.
  pub duration: Duration,
}

impl Target {
  /// Start declaring a target with the given name.
  pub fn named(name: impl Into<String>) -> TargetBuilder {
    TargetBuilder {
      name: name.into(),
      description: None,
      is_default: false,
      dependencies: Vec::new(),
      conditions: Vec::new(),
      requirements: Vec::new(),
      actions: Vec::new(),
    }
  }

  pub fn has_actions(&self) -> bool {
    !self.actions.is_empty()
  }

  pub fn requirements(&self) -> &[String] {
    &self.requirements
  }
}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Target")
      .field("name", &self.name)
      .field("is_default", &self.is_default)
      .field("dependencies", &self.dependencies)
      .field("conditions", &self.conditions.len())
      .field("requirements", &self.requirements)
      .field("actions", &self.actions.len())
      .field("status", &self.status)
      .field("duration", &self.duration)
      .finish()
  }
}

/// Fluent accumulator for one target declaration.
///
/// Collects dependencies, conditions, requirements and actions, then freezes
/// into a [`Target`] when handed to
/// [`BuildDefinition::target`](crate::BuildDefinition::target).
pub struct TargetBuilder {
  name: String,
  description: Option<String>,
  is_default: bool,
  dependencies: Vec<String>,
  conditions: Vec<Condition>,
  requirements: Vec<String>,
  actions: Vec<Action>,
}

impl TargetBuilder {
  /// One-line description shown in `--help` and the graph listing.
  pub fn describe(mut self, text: impl Into<String>) -> Self {
    self.description = Some(text.into());
    self
  }

  /// Mark this target as the build's default target.
  pub fn default(mut self) -> Self {
    self.is_default = true;
    self
  }

  /// Declare dependencies on other targets of the same build, by name.
  pub fn depends_on<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.dependencies.extend(names.into_iter().map(Into::into));
    self
  }

  /// Gate execution on a predicate, evaluated lazily just before the target
  /// would run. A false result marks the target `Skipped`.
  pub fn only_when<F>(mut self, predicate: F) -> Self
  where
    F: Fn(&RunContext) -> bool + Send + Sync + 'static,
  {
    self.conditions.push(Box::new(predicate));
    self
  }

  /// Require a parameter to carry a non-empty, non-zero value before any
  /// target of the run executes.
  pub fn requires(mut self, parameter: impl Into<String>) -> Self {
    self.requirements.push(parameter.into());
    self
  }

  /// Append an action to the target body. Actions run sequentially in
  /// declaration order.
  pub fn executes<F, Fut>(mut self, action: F) -> Self
  where
    F: Fn(Arc<RunContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
  {
    self.actions.push(Box::new(move |ctx| Box::pin(action(ctx))));
    self
  }

  pub(crate) fn build(self) -> Target {
    Target {
      name: self.name,
      description: self.description,
      is_default: self.is_default,
      dependencies: self.dependencies,
      dep_indices: Vec::new(),
      conditions: self.conditions,
      requirements: self.requirements,
      actions: self.actions,
      status: TargetStatus::default(),
      duration: Duration::ZERO,
    }
  }
}
