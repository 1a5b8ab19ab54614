//! trestle: the reference pipeline.
//!
//! A small but complete build definition exercising the engine end to end:
//! the classic Clean -> Restore -> Compile -> Test -> Pack chain with typed
//! parameters, a condition, a requirement and a subprocess call. It doubles
//! as the executable example for embedding the engine in a build binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use trestle_engine::{BuildDefinition, ParamSpec, ProcessCommand, RunContext, Target};

fn main() -> ExitCode {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_target(false)
    .without_time()
    .try_init();

  trestle_engine::execute(pipeline())
}

fn artifacts_dir(ctx: &RunContext) -> anyhow::Result<PathBuf> {
  Ok(PathBuf::from(ctx.string("artifacts")?))
}

#[cfg(unix)]
fn test_runner() -> ProcessCommand {
  ProcessCommand::new("/bin/sh").arg("-c").arg("echo running unit tests")
}

#[cfg(windows)]
fn test_runner() -> ProcessCommand {
  ProcessCommand::new("cmd").arg("/C").arg("echo running unit tests")
}

fn pipeline() -> BuildDefinition {
  BuildDefinition::new("trestle")
    .parameter(
      ParamSpec::choice("configuration", ["debug", "release"])
        .help("Build configuration")
        .default_value("debug"),
    )
    .parameter(
      ParamSpec::string("artifacts")
        .help("Directory build outputs are written to")
        .default_value("target/dist"),
    )
    .parameter(
      ParamSpec::boolean("skip-slow")
        .help("Skip the slow test suite")
        .default_value("false"),
    )
    .target(
      Target::named("Clean")
        .describe("Remove previous build outputs")
        .executes(|ctx| async move {
          let dir = artifacts_dir(&ctx)?;
          match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => ctx.sink().info(&format!("removed {}", dir.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("failed to remove the artifacts directory"),
          }
          Ok(())
        }),
    )
    .target(
      Target::named("Restore")
        .describe("Resolve and pin tool dependencies")
        .depends_on(["Clean"])
        .executes(|ctx| async move {
          let dir = artifacts_dir(&ctx)?;
          tokio::fs::create_dir_all(&dir).await?;
          tokio::fs::write(dir.join("packages.lock"), "tooling 1.0\n")
            .await
            .context("failed to write the lock file")?;
          ctx.sink().info("dependencies restored");
          Ok(())
        }),
    )
    .target(
      Target::named("Compile")
        .describe("Compile the sources")
        .depends_on(["Restore"])
        .requires("configuration")
        .default()
        .executes(|ctx| async move {
          let configuration = ctx.choice("configuration")?;
          let dir = artifacts_dir(&ctx)?;
          tokio::fs::create_dir_all(&dir).await?;
          let binary = dir.join(format!("app-{configuration}.bin"));
          tokio::fs::write(&binary, format!("compiled with configuration={configuration}\n"))
            .await
            .context("failed to write the compiled binary")?;
          ctx.sink().write(&format!("compiled {}", binary.display()));
          Ok(())
        }),
    )
    .target(
      Target::named("Test")
        .describe("Run the test suite")
        .depends_on(["Compile"])
        .only_when(|ctx| !ctx.boolean("skip-slow").unwrap_or(false))
        .executes(|ctx| async move {
          test_runner().run(&ctx).await?.ensure_success()?;
          let dir = artifacts_dir(&ctx)?;
          tokio::fs::create_dir_all(&dir).await?;
          tokio::fs::write(dir.join("test-report.txt"), "all tests passed\n").await?;
          Ok(())
        }),
    )
    .target(
      Target::named("Pack")
        .describe("Package the compiled output")
        .depends_on(["Test"])
        .requires("configuration")
        .executes(|ctx| async move {
          let configuration = ctx.choice("configuration")?;
          let dir = artifacts_dir(&ctx)?;
          tokio::fs::create_dir_all(&dir).await?;
          let package = dir.join(format!("app-{configuration}.pkg"));
          tokio::fs::write(&package, format!("payload: app-{configuration}.bin\n"))
            .await
            .context("failed to write the package")?;
          ctx.sink().info(&format!("packaged {}", package.display()));
          Ok(())
        }),
    )
}
