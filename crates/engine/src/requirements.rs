//! Pre-execution requirement validation.
//!
//! Every executing target's declared requirements are evaluated against the
//! bound parameters before the executor starts. Failures are collected and
//! reported as one aggregate error listing every unmet requirement, so a
//! single run surfaces everything that is missing.

use thiserror::Error;
use tracing::debug;

use crate::build::BuildDefinition;
use crate::params::Params;
use crate::plan::ExecutionPlan;

/// One requirement that evaluated as unmet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetRequirement {
  pub target: String,
  pub parameter: String,
}

/// Aggregate of every unmet requirement in a run. Fatal before execution.
#[derive(Debug, Error)]
#[error("{}", self.render())]
pub struct RequirementsError {
  pub unmet: Vec<UnmetRequirement>,
}

impl RequirementsError {
  fn render(&self) -> String {
    let items: Vec<String> = self
      .unmet
      .iter()
      .map(|u| format!("target '{}' requires a value for '{}'", u.target, u.parameter))
      .collect();
    format!("unmet requirements: {}", items.join("; "))
  }
}

/// Evaluate every requirement of every target that will execute (the plan
/// minus skip candidates). A requirement is satisfied iff the named
/// parameter is bound to a non-empty value, non-zero for integer kinds.
pub(crate) fn validate(build: &BuildDefinition, plan: &ExecutionPlan, params: &Params) -> Result<(), RequirementsError> {
  let mut unmet = Vec::new();

  for &idx in plan.order.iter().filter(|i| !plan.skip_candidates.contains(i)) {
    let target = &build.targets()[idx];
    for parameter in target.requirements() {
      if params.satisfies(parameter) {
        debug!(name = %target.name, parameter = %parameter, "requirement satisfied");
      } else {
        unmet.push(UnmetRequirement {
          target: target.name.clone(),
          parameter: parameter.clone(),
        });
      }
    }
  }

  if unmet.is_empty() { Ok(()) } else { Err(RequirementsError { unmet }) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::build::BuildDefinition;
  use crate::params::{self, ParamSpec};
  use crate::plan;
  use crate::registry;
  use crate::target::Target;

  fn build_with_requirements() -> (BuildDefinition, ExecutionPlan) {
    let mut build = BuildDefinition::new("demo")
      .parameter(ParamSpec::string("configuration"))
      .parameter(ParamSpec::integer("jobs"))
      .target(
        Target::named("Compile")
          .requires("configuration")
          .executes(|_| async { Ok(()) }),
      )
      .target(
        Target::named("Test")
          .depends_on(["Compile"])
          .requires("jobs")
          .default()
          .executes(|_| async { Ok(()) }),
      );
    registry::resolve(&mut build).unwrap();
    let plan = plan::plan(&mut build, &[], None, false).unwrap();
    (build, plan)
  }

  #[test]
  fn all_failures_are_aggregated() {
    let (build, plan) = build_with_requirements();
    let params = temp_env::with_vars([("CONFIGURATION", None::<&str>), ("JOBS", None)], || {
      params::bind(build.parameters(), &[]).unwrap()
    });

    let err = validate(&build, &plan, &params).unwrap_err();
    assert_eq!(err.unmet.len(), 2);
    assert_eq!(err.unmet[0].parameter, "configuration");
    assert_eq!(err.unmet[1].parameter, "jobs");

    let message = err.to_string();
    assert!(message.contains("target 'Compile' requires a value for 'configuration'"));
    assert!(message.contains("target 'Test' requires a value for 'jobs'"));
  }

  #[test]
  fn satisfied_requirements_pass() {
    let (build, plan) = build_with_requirements();
    let params = params::bind(
      build.parameters(),
      &[("configuration".into(), "debug".into()), ("jobs".into(), "4".into())],
    )
    .unwrap();

    validate(&build, &plan, &params).unwrap();
  }

  #[test]
  fn skipped_targets_are_not_validated() {
    let mut build = BuildDefinition::new("demo")
      .parameter(ParamSpec::string("configuration"))
      .target(
        Target::named("Compile")
          .requires("configuration")
          .executes(|_| async { Ok(()) }),
      )
      .target(
        Target::named("Test")
          .depends_on(["Compile"])
          .default()
          .executes(|_| async { Ok(()) }),
      );
    registry::resolve(&mut build).unwrap();
    let plan = plan::plan(&mut build, &["Test".into()], Some(&[]), false).unwrap();

    let params = temp_env::with_var_unset("CONFIGURATION", || params::bind(build.parameters(), &[]).unwrap());
    validate(&build, &plan, &params).unwrap();
  }
}
