//! Run orchestration: arguments to exit code.
//!
//! `execute` is the entry point a build binary calls from `main`. The
//! phases mirror the engine's data flow: parse arguments, classify the
//! host, pick a sink, register the build, plan, validate requirements,
//! execute, and report the summary. Early exits (`--help`, `--graph`)
//! happen before planning.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use trestle_host::Host;

use crate::build::BuildDefinition;
use crate::cli;
use crate::context::RunContext;
use crate::executor;
use crate::params::{self, ParamError};
use crate::plan::{self, PlanError};
use crate::registry::{self, ConfigError};
use crate::requirements::{self, RequirementsError};
use crate::sink::summary::RunSummary;
use crate::sink::{self, Sink};

/// Everything that can end a run unsuccessfully.
#[derive(Debug, Error)]
pub enum RunError {
  #[error(transparent)]
  Configuration(#[from] ConfigError),

  #[error(transparent)]
  Planning(#[from] PlanError),

  #[error(transparent)]
  Parameter(#[from] ParamError),

  #[error(transparent)]
  Requirements(#[from] RequirementsError),

  #[error("target '{target}' failed: {source}")]
  Target { target: String, source: anyhow::Error },

  #[error("interrupted while running target '{target}'")]
  Interrupted { target: String },

  #[error("failed to start the runtime: {0}")]
  Runtime(#[source] std::io::Error),
}

/// Inputs for one run, independent of how they were collected.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// Targets to invoke; empty means the default target.
  pub targets: Vec<String>,
  /// `None`: no skipping. `Some(empty)`: skip every non-invoked target.
  /// `Some(names)`: skip exactly those (case-insensitive).
  pub skip: Option<Vec<String>>,
  /// Strict planner mode: fail unless the graph admits exactly one order.
  pub strict: bool,
  /// CLI-provided parameter values, raw.
  pub parameters: Vec<(String, String)>,
}

/// Outcome of one run.
pub struct RunReport {
  /// Present whenever the executor was entered (even on failure). Absent
  /// when a configuration, planning, parameter or requirements error ended
  /// the run first.
  pub summary: Option<RunSummary>,
  pub error: Option<RunError>,
}

impl RunReport {
  pub fn succeeded(&self) -> bool {
    self.error.is_none() && self.summary.as_ref().is_some_and(|s| s.succeeded)
  }

  /// Exit-code law: zero iff no target in the execution list ended
  /// `Failed` or `NotRun` and no earlier phase failed.
  pub fn exit_code(&self) -> ExitCode {
    if self.succeeded() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
  }
}

fn report_error(sink: &dyn Sink, error: &RunError) {
  match error {
    RunError::Target { source, .. } => {
      let chain: Vec<String> = source.chain().skip(1).map(|cause| cause.to_string()).collect();
      let details = if chain.is_empty() { None } else { Some(chain.join("\n")) };
      sink.error(&error.to_string(), details.as_deref());
    }
    _ => sink.error(&error.to_string(), None),
  }
}

/// Run the build with explicit options and sink.
///
/// This is the library seam `execute` wraps: everything after argument
/// parsing and before process exit. The summary is always written once the
/// executor has been entered, on success and failure alike.
pub fn run(build: &mut BuildDefinition, options: &RunOptions, sink: Arc<dyn Sink>) -> RunReport {
  let host = Host::detect();
  info!(build = %build.name, host = %host, "starting run");

  if let Err(e) = registry::resolve(build) {
    let error = RunError::from(e);
    report_error(sink.as_ref(), &error);
    return RunReport {
      summary: None,
      error: Some(error),
    };
  }

  let params = match params::bind(&build.params, &options.parameters) {
    Ok(params) => params,
    Err(e) => {
      let error = RunError::from(e);
      report_error(sink.as_ref(), &error);
      return RunReport {
        summary: None,
        error: Some(error),
      };
    }
  };

  let plan = match plan::plan(build, &options.targets, options.skip.as_deref(), options.strict) {
    Ok(plan) => plan,
    Err(error) => {
      report_error(sink.as_ref(), &error);
      return RunReport {
        summary: None,
        error: Some(error),
      };
    }
  };

  let ctx = Arc::new(RunContext::new(
    build.name.clone(),
    host,
    options.strict,
    params,
    sink.clone(),
  ));

  if let Err(e) = requirements::validate(build, &plan, ctx.params()) {
    let error = RunError::from(e);
    report_error(sink.as_ref(), &error);
    return RunReport {
      summary: None,
      error: Some(error),
    };
  }

  let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
    Ok(runtime) => runtime,
    Err(e) => {
      let error = RunError::Runtime(e);
      report_error(sink.as_ref(), &error);
      return RunReport {
        summary: None,
        error: Some(error),
      };
    }
  };

  let result = runtime.block_on(executor::run(build, &plan, ctx));

  // The summary path is taken on every outcome of execution.
  let summary = RunSummary::from_run(build, &plan.order);
  if let Err(ref e) = result {
    error!(error = %e, "run failed");
  }
  sink.write_summary(&summary);
  if let Err(ref e) = result {
    report_error(sink.as_ref(), e);
  }

  RunReport {
    summary: Some(summary),
    error: result.err(),
  }
}

/// Parse the given arguments and run, returning the process exit code.
pub fn execute_with_args(mut build: BuildDefinition, args: &[String]) -> ExitCode {
  let sink = sink::for_host(Host::detect());

  // Validate declarations before the argument parser is assembled from
  // them; `run` re-resolves, which is idempotent.
  if let Err(e) = registry::resolve(&mut build) {
    report_error(sink.as_ref(), &RunError::from(e));
    return ExitCode::FAILURE;
  }

  let invocation = match cli::parse(&build, args) {
    Ok(invocation) => invocation,
    Err(e) => {
      let _ = e.print();
      return ExitCode::from(2);
    }
  };

  if invocation.help {
    cli::print_help(&build);
    return ExitCode::SUCCESS;
  }
  if invocation.graph {
    cli::print_graph(&build);
    return ExitCode::SUCCESS;
  }

  let report = run(&mut build, &invocation.options, sink);

  if let Some(path) = &invocation.summary_path
    && let Some(summary) = &report.summary
  {
    match serde_json::to_string_pretty(summary) {
      Ok(json) => {
        if let Err(e) = std::fs::write(path, json) {
          error!(path = %path.display(), error = %e, "failed to write summary file");
        }
      }
      Err(e) => error!(error = %e, "failed to serialize summary"),
    }
  }

  report.exit_code()
}

/// Entry point for build binaries: parse the real process arguments and run.
pub fn execute(build: BuildDefinition) -> ExitCode {
  let args: Vec<String> = std::env::args().skip(1).collect();
  execute_with_args(build, &args)
}
