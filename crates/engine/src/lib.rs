//! trestle-engine: a target-graph build automation engine.
//!
//! A build is described as a set of named targets with declared dependencies,
//! conditions, requirements and actions. The engine turns a user-invoked set
//! of targets into a totally ordered execution list (dependency closure,
//! topological ordering, cycle detection, skip application), validates the
//! declared requirements, then executes the list sequentially with
//! per-target timing and status tracking, reporting structured progress and
//! a final summary through an output sink chosen from the host environment.
//!
//! The typical entry point is [`execute`], called from a build binary's
//! `main`:
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! use trestle_engine::{BuildDefinition, Target};
//!
//! fn main() -> ExitCode {
//!   let build = BuildDefinition::new("example")
//!     .target(Target::named("Compile").default().executes(|_ctx| async { Ok(()) }));
//!   trestle_engine::execute(build)
//! }
//! ```

pub mod build;
mod cli;
pub mod context;
mod executor;
mod graph;
pub mod params;
pub mod plan;
pub mod process;
pub mod registry;
pub mod requirements;
pub mod run;
pub mod sink;
pub mod target;

pub use build::{BuildDefinition, DEFAULT_TARGET_NAME};
pub use context::RunContext;
pub use params::{ParamError, ParamKind, ParamSpec};
pub use plan::{ExecutionPlan, PlanError};
pub use process::{ProcessCommand, ProcessError, ProcessExit};
pub use registry::ConfigError;
pub use requirements::{RequirementsError, UnmetRequirement};
pub use run::{RunError, RunOptions, RunReport, execute, execute_with_args, run};
pub use sink::summary::{RunSummary, SummaryRow};
pub use sink::{BlockGuard, Sink};
pub use target::{Target, TargetBuilder, TargetStatus};

pub use trestle_host::Host;
