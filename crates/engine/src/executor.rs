//! The executor: sequential walk of the planned execution list.
//!
//! Targets run one at a time, actions within a target in declaration order;
//! the engine spawns no worker threads. The first failing target stops the
//! walk, leaving unreached targets `NotRun`. An interrupt delivered while
//! an action runs fails the current target the same way.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::build::BuildDefinition;
use crate::context::RunContext;
use crate::plan::ExecutionPlan;
use crate::run::RunError;
use crate::sink::BlockGuard;
use crate::sink::summary::format_duration;
use crate::target::{Target, TargetStatus};

enum ConditionOutcome {
  Proceed,
  Skip,
  Panicked(String),
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "opaque panic payload".to_string()
  }
}

/// Conditions are pure predicates and must not panic; a panicking condition
/// is treated as a failure of its target.
fn evaluate_conditions(target: &Target, ctx: &RunContext) -> ConditionOutcome {
  for condition in &target.conditions {
    match catch_unwind(AssertUnwindSafe(|| condition(ctx))) {
      Ok(true) => {}
      Ok(false) => return ConditionOutcome::Skip,
      Err(payload) => return ConditionOutcome::Panicked(panic_message(payload)),
    }
  }
  ConditionOutcome::Proceed
}

pub(crate) async fn run(
  build: &mut BuildDefinition,
  plan: &ExecutionPlan,
  ctx: Arc<RunContext>,
) -> Result<(), RunError> {
  for &idx in &plan.order {
    let name = build.targets[idx].name.clone();

    if build.targets[idx].actions.is_empty() {
      build.targets[idx].status = TargetStatus::Absent;
      debug!(name = %name, "target has no actions");
      continue;
    }

    match evaluate_conditions(&build.targets[idx], &ctx) {
      ConditionOutcome::Proceed => {}
      ConditionOutcome::Skip => {
        build.targets[idx].status = TargetStatus::Skipped;
        debug!(name = %name, "condition false, target skipped");
        continue;
      }
      ConditionOutcome::Panicked(message) => {
        build.targets[idx].status = TargetStatus::Failed;
        return Err(RunError::Target {
          target: name,
          source: anyhow::anyhow!("condition panicked: {message}"),
        });
      }
    }

    info!(name = %name, "executing target");
    let sink = ctx.sink().clone();
    let guard = BlockGuard::open(sink.as_ref(), name.as_str());
    let started = Instant::now();

    let mut failure: Option<RunError> = None;
    for action in &build.targets[idx].actions {
      let action_future = action(ctx.clone());
      tokio::select! {
        result = action_future => {
          if let Err(source) = result {
            failure = Some(RunError::Target { target: name.clone(), source });
            break;
          }
        }
        _ = tokio::signal::ctrl_c() => {
          warn!(name = %name, "interrupt received, aborting current action");
          failure = Some(RunError::Interrupted { target: name.clone() });
          break;
        }
      }
    }

    let elapsed = started.elapsed();
    drop(guard);
    build.targets[idx].duration = elapsed;

    match failure {
      None => {
        build.targets[idx].status = TargetStatus::Executed;
        sink.success(&format!("{} finished in {}", name, format_duration(elapsed)));
      }
      Some(error) => {
        build.targets[idx].status = TargetStatus::Failed;
        return Err(error);
      }
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params;
  use crate::plan;
  use crate::registry;
  use crate::sink::Sink;
  use crate::sink::summary::RunSummary;
  use crate::target::Target;
  use std::sync::Mutex;
  use trestle_host::Host;

  #[derive(Default)]
  struct NullSink;

  impl Sink for NullSink {
    fn write(&self, _text: &str) {}
    fn trace(&self, _text: &str) {}
    fn info(&self, _text: &str) {}
    fn warn(&self, _text: &str, _details: Option<&str>) {}
    fn error(&self, _text: &str, _details: Option<&str>) {}
    fn success(&self, _text: &str) {}
    fn block_opened(&self, _name: &str) {}
    fn block_closed(&self, _name: &str) {}
    fn write_summary(&self, _summary: &RunSummary) {}
  }

  fn context() -> Arc<RunContext> {
    let params = params::bind(&[], &[]).unwrap();
    Arc::new(RunContext::new(
      "test".to_string(),
      Host::Console,
      false,
      params,
      Arc::new(NullSink),
    ))
  }

  fn execute(build: &mut BuildDefinition, invoked: &[&str]) -> Result<(), RunError> {
    registry::resolve(build).unwrap();
    let invoked: Vec<String> = invoked.iter().map(|s| s.to_string()).collect();
    let plan = plan::plan(build, &invoked, None, false).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .unwrap();
    runtime.block_on(run(build, &plan, context()))
  }

  fn status_of(build: &BuildDefinition, name: &str) -> TargetStatus {
    build.target_named(name).unwrap().status
  }

  #[test]
  fn records_order_and_statuses() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let log_a = log.clone();
    let log_b = log.clone();

    let mut build = BuildDefinition::new("demo")
      .target(Target::named("A").executes(move |_| {
        let log = log_a.clone();
        async move {
          log.lock().unwrap().push("A");
          Ok(())
        }
      }))
      .target(Target::named("B").depends_on(["A"]).default().executes(move |_| {
        let log = log_b.clone();
        async move {
          tokio::time::sleep(std::time::Duration::from_millis(5)).await;
          log.lock().unwrap().push("B");
          Ok(())
        }
      }));

    execute(&mut build, &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["A", "B"]);
    assert_eq!(status_of(&build, "A"), TargetStatus::Executed);
    assert_eq!(status_of(&build, "B"), TargetStatus::Executed);
    assert!(build.target_named("B").unwrap().duration.as_nanos() > 0);
  }

  #[test]
  fn target_without_actions_is_absent() {
    let mut build = BuildDefinition::new("demo")
      .target(Target::named("Prepare"))
      .target(
        Target::named("Compile")
          .depends_on(["Prepare"])
          .default()
          .executes(|_| async { Ok(()) }),
      );

    execute(&mut build, &[]).unwrap();

    assert_eq!(status_of(&build, "Prepare"), TargetStatus::Absent);
    assert_eq!(status_of(&build, "Compile"), TargetStatus::Executed);
  }

  #[test]
  fn false_condition_skips_the_body() {
    let ran = Arc::new(Mutex::new(false));
    let ran_clone = ran.clone();

    let mut build = BuildDefinition::new("demo").target(
      Target::named("Deploy")
        .default()
        .only_when(|_| false)
        .executes(move |_| {
          let ran = ran_clone.clone();
          async move {
            *ran.lock().unwrap() = true;
            Ok(())
          }
        }),
    );

    execute(&mut build, &[]).unwrap();

    assert_eq!(status_of(&build, "Deploy"), TargetStatus::Skipped);
    assert!(!*ran.lock().unwrap());
  }

  #[test]
  fn failing_action_stops_the_walk() {
    let mut build = BuildDefinition::new("demo")
      .target(Target::named("Clean").executes(|_| async { Ok(()) }))
      .target(
        Target::named("Restore")
          .depends_on(["Clean"])
          .executes(|_| async { anyhow::bail!("restore blew up") }),
      )
      .target(Target::named("Compile").depends_on(["Restore"]).executes(|_| async { Ok(()) }))
      .target(
        Target::named("Test")
          .depends_on(["Compile"])
          .default()
          .executes(|_| async { Ok(()) }),
      );

    let err = execute(&mut build, &["Test"]).unwrap_err();

    assert!(matches!(err, RunError::Target { ref target, .. } if target == "Restore"));
    assert_eq!(status_of(&build, "Clean"), TargetStatus::Executed);
    assert_eq!(status_of(&build, "Restore"), TargetStatus::Failed);
    assert_eq!(status_of(&build, "Compile"), TargetStatus::NotRun);
    assert_eq!(status_of(&build, "Test"), TargetStatus::NotRun);
  }

  #[test]
  fn second_action_runs_after_the_first() {
    let log: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let first = log.clone();
    let second = log.clone();

    let mut build = BuildDefinition::new("demo").target(
      Target::named("Compile")
        .default()
        .executes(move |_| {
          let log = first.clone();
          async move {
            log.lock().unwrap().push(1);
            Ok(())
          }
        })
        .executes(move |_| {
          let log = second.clone();
          async move {
            log.lock().unwrap().push(2);
            Ok(())
          }
        }),
    );

    execute(&mut build, &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn panicking_condition_fails_the_target() {
    let mut build = BuildDefinition::new("demo").target(
      Target::named("Deploy")
        .default()
        .only_when(|_| panic!("bad predicate"))
        .executes(|_| async { Ok(()) }),
    );

    let err = execute(&mut build, &[]).unwrap_err();

    assert!(matches!(err, RunError::Target { ref target, .. } if target == "Deploy"));
    assert_eq!(status_of(&build, "Deploy"), TargetStatus::Failed);
    let message = err.to_string();
    assert!(message.contains("condition panicked"));
  }
}
